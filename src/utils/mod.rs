//! Image filters used by the transform pipeline
//!
//! All filters work on flat row-major `u8` buffers with explicit width and
//! height:
//! - Grayscale conversion (RGB to luminance)
//! - Non-local-means denoising and Laplacian sharpening
//! - CLAHE contrast equalization
//! - Binarization (global cutoff and adaptive mean / Gaussian)
//! - Rectangular morphology (erode, dilate, close, open)

pub mod binarization;
pub mod border;
pub mod clahe;
pub mod denoise;
pub mod grayscale;
pub mod morphology;
pub mod sharpen;
