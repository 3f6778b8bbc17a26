//! Last-used session parameters and timeouts, persisted between runs.
//!
//! Unlike presets, a bad settings value never discards the whole file: each
//! key falls back to its default on its own and leaves a note behind.

use ini::{Ini, Properties};
use log::{debug, info, warn};

use crate::error::{PresetError, StorageError};
use crate::models::params::domain;
use crate::models::ParameterSet;
use crate::presets::format::{
    format_bool, keys, parse_document, read_bool, read_int, read_method, render_document,
};
use crate::storage::TextStorage;

pub const MORPHOLOGY: &str = "Morphology";
pub const THRESHOLD: &str = "Threshold";
pub const SHARPENING: &str = "Sharpening";
pub const DENOISING: &str = "Denoising";
pub const TIMEOUTS: &str = "Timeouts";
pub const ADAPTIVE: &str = "AdaptiveThreshold";

pub const DEFAULT_MANUAL_TIMEOUT_MS: i64 = 2000;
pub const DEFAULT_SWEEP_TIMEOUT_MS: i64 = 1000;

const TIMEOUT_RANGE: (i64, i64) = (i64::MIN, i64::MAX);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub params: ParameterSet,
    /// Budget for a manual decode, in milliseconds
    pub manual_timeout_ms: i64,
    /// Budget for each preset of a sweep, in milliseconds
    pub sweep_timeout_ms: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            params: ParameterSet::default(),
            manual_timeout_ms: DEFAULT_MANUAL_TIMEOUT_MS,
            sweep_timeout_ms: DEFAULT_SWEEP_TIMEOUT_MS,
        }
    }
}

#[derive(Debug)]
pub struct SettingsLoad {
    pub settings: SessionSettings,
    pub notes: Vec<String>,
}

/// Collects per-key fallbacks while reading one document.
struct Reader<'a> {
    doc: &'a Ini,
    notes: Vec<String>,
}

impl<'a> Reader<'a> {
    fn section(&self, name: &str) -> Option<&'a Properties> {
        self.doc.section(Some(name))
    }

    fn recover<T>(&mut self, section: &str, result: Result<T, PresetError>, default: T) -> T {
        match result {
            Ok(value) => value,
            Err(PresetError::MissingKey(_)) => default,
            Err(err) => {
                warn!("settings [{section}]: {err}; using default");
                self.notes.push(format!("Setting in [{section}] ignored: {err}"));
                default
            }
        }
    }

    fn int(&mut self, section: &str, key: &'static str, range: (i64, i64), default: i64) -> i64 {
        let Some(props) = self.section(section) else {
            return default;
        };
        let result = read_int(props, key, None, range);
        self.recover(section, result, default)
    }

    fn flag(&mut self, section: &str, key: &'static str, default: bool) -> bool {
        let Some(props) = self.section(section) else {
            return default;
        };
        let result = read_bool(props, key, None);
        self.recover(section, result, default)
    }
}

impl SessionSettings {
    /// Read settings; never fails. Missing or unreadable storage yields defaults.
    pub fn load<S: TextStorage + ?Sized>(storage: &S) -> SettingsLoad {
        let text = match storage.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("no settings at {}; using defaults", storage.describe());
                return SettingsLoad {
                    settings: Self::default(),
                    notes: vec![format!("No settings at {}; using defaults", storage.describe())],
                };
            }
            Err(err) => return Self::fallback(storage, err),
        };
        match parse_document(&text) {
            Ok(doc) => Self::from_ini(&doc),
            Err(err) => Self::fallback(storage, err),
        }
    }

    fn fallback<S: TextStorage + ?Sized>(storage: &S, err: StorageError) -> SettingsLoad {
        warn!("cannot read settings from {}: {err}", storage.describe());
        SettingsLoad {
            settings: Self::default(),
            notes: vec![format!("Error reading settings: {err}; using defaults")],
        }
    }

    fn from_ini(doc: &Ini) -> SettingsLoad {
        let d = Self::default();
        let p = d.params;
        let mut r = Reader {
            doc,
            notes: Vec::new(),
        };

        let method = match r.section(ADAPTIVE) {
            Some(props) => {
                let result = read_method(props, keys::ADAPTIVE_METHOD, p.adaptive_method);
                r.recover(ADAPTIVE, result, p.adaptive_method)
            }
            None => p.adaptive_method,
        };

        let params = ParameterSet {
            erode_size: r.int(MORPHOLOGY, keys::ERODE_SIZE, domain::ERODE_SIZE, p.erode_size as i64) as u32,
            erode_iter: r.int(MORPHOLOGY, keys::ERODE_ITER, domain::ERODE_ITER, p.erode_iter as i64) as u32,
            close_size: r.int(MORPHOLOGY, keys::CLOSE_SIZE, domain::CLOSE_SIZE, p.close_size as i64) as u32,
            open_size: r.int(MORPHOLOGY, keys::OPEN_SIZE, domain::OPEN_SIZE, p.open_size as i64) as u32,
            threshold_value: r.int(THRESHOLD, keys::THRESH_VAL, domain::THRESHOLD, p.threshold_value as i64)
                as u8,
            inverse: r.flag(THRESHOLD, keys::INVERSE, p.inverse),
            sharpness: r.int(SHARPENING, keys::SHARPNESS, domain::SHARPNESS, p.sharpness as i64) as u32,
            denoise_strength: r.int(DENOISING, keys::DENOISE, domain::DENOISE, p.denoise_strength as i64)
                as u32,
            use_adaptive_threshold: r.flag(ADAPTIVE, keys::USE_ADAPTIVE, p.use_adaptive_threshold),
            adaptive_method: method,
            adaptive_block_raw: r.int(
                ADAPTIVE,
                keys::ADAPTIVE_BLOCK_RAW,
                domain::ADAPTIVE_BLOCK_RAW,
                p.adaptive_block_raw as i64,
            ) as u32,
            adaptive_c: r.int(ADAPTIVE, keys::ADAPTIVE_C, domain::ADAPTIVE_C, p.adaptive_c as i64) as i32,
        };
        let settings = SessionSettings {
            params,
            manual_timeout_ms: r.int(TIMEOUTS, keys::MANUAL_TIMEOUT, TIMEOUT_RANGE, d.manual_timeout_ms),
            sweep_timeout_ms: r.int(TIMEOUTS, keys::SWEEP_TIMEOUT, TIMEOUT_RANGE, d.sweep_timeout_ms),
        };
        SettingsLoad {
            settings,
            notes: r.notes,
        }
    }

    /// Render all six sections
    pub fn to_document(&self) -> Result<String, StorageError> {
        let p = &self.params;
        let mut doc = Ini::new();
        doc.with_section(Some(MORPHOLOGY))
            .set(keys::ERODE_SIZE, p.erode_size.to_string())
            .set(keys::ERODE_ITER, p.erode_iter.to_string())
            .set(keys::CLOSE_SIZE, p.close_size.to_string())
            .set(keys::OPEN_SIZE, p.open_size.to_string());
        doc.with_section(Some(THRESHOLD))
            .set(keys::THRESH_VAL, p.threshold_value.to_string())
            .set(keys::INVERSE, format_bool(p.inverse));
        doc.with_section(Some(SHARPENING))
            .set(keys::SHARPNESS, p.sharpness.to_string());
        doc.with_section(Some(DENOISING))
            .set(keys::DENOISE, p.denoise_strength.to_string());
        doc.with_section(Some(TIMEOUTS))
            .set(keys::MANUAL_TIMEOUT, self.manual_timeout_ms.to_string())
            .set(keys::SWEEP_TIMEOUT, self.sweep_timeout_ms.to_string());
        doc.with_section(Some(ADAPTIVE))
            .set(keys::USE_ADAPTIVE, format_bool(p.use_adaptive_threshold))
            .set(keys::ADAPTIVE_METHOD, p.adaptive_method.as_str())
            .set(keys::ADAPTIVE_BLOCK_RAW, p.adaptive_block_raw.to_string())
            .set(keys::ADAPTIVE_C, p.adaptive_c.to_string());
        render_document(&doc)
    }

    pub fn save<S: TextStorage + ?Sized>(&self, storage: &mut S) -> Result<(), StorageError> {
        storage.write(&self.to_document()?)?;
        info!("settings saved to {}", storage.describe());
        Ok(())
    }
}
