pub mod binary;
pub mod outcome;
pub mod params;
pub mod region;

pub use binary::BinaryImage;
pub use outcome::{DecodeOutcome, LogRecord, ResultLog, ResultLogEntry};
pub use params::{AdaptiveMethod, ParameterSet, Thresholding};
pub use region::Region;
