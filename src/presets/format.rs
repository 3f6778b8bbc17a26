//! Key/value encoding of `ParameterSet` fields in INI sections.
//!
//! Preset sections and the settings file share key names and value syntax:
//! integers in decimal, booleans written as `True` / `False`, the adaptive
//! method by its literal name.

use ini::{Ini, Properties, WriteOption};

use crate::error::{PresetError, StorageError};
use crate::models::params::{check, domain};
use crate::models::{AdaptiveMethod, ParameterSet};

pub mod keys {
    pub const NAME: &str = "name";
    pub const THRESH_VAL: &str = "thresh_val";
    pub const INVERSE: &str = "inverse";
    pub const ERODE_SIZE: &str = "erode_size";
    pub const ERODE_ITER: &str = "erode_iter";
    pub const CLOSE_SIZE: &str = "close_size";
    pub const OPEN_SIZE: &str = "open_size";
    pub const SHARPNESS: &str = "sharpness_factor";
    pub const DENOISE: &str = "denoise_strength";
    pub const USE_ADAPTIVE: &str = "use_adaptive_thresh";
    pub const ADAPTIVE_METHOD: &str = "adaptive_method";
    pub const ADAPTIVE_BLOCK_RAW: &str = "adaptive_block_size_raw";
    pub const ADAPTIVE_C: &str = "adaptive_c_value";
    pub const MANUAL_TIMEOUT: &str = "manual_decode_timeout";
    pub const SWEEP_TIMEOUT: &str = "preset_iteration_timeout";
}

/// Accepts the usual INI spellings, case-insensitively
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn raw<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props.get(key).map(str::trim)
}

/// Integer value checked against `range`; `fallback` is used when the key is absent.
pub fn read_int(
    props: &Properties,
    key: &'static str,
    fallback: Option<i64>,
    range: (i64, i64),
) -> Result<i64, PresetError> {
    let value = match raw(props, key) {
        Some(text) => text.parse::<i64>().map_err(|_| PresetError::InvalidValue {
            key,
            value: text.to_string(),
        })?,
        None => fallback.ok_or(PresetError::MissingKey(key))?,
    };
    check(key, value, range)?;
    Ok(value)
}

pub fn read_bool(
    props: &Properties,
    key: &'static str,
    fallback: Option<bool>,
) -> Result<bool, PresetError> {
    match raw(props, key) {
        Some(text) => parse_bool(text).ok_or_else(|| PresetError::InvalidValue {
            key,
            value: text.to_string(),
        }),
        None => fallback.ok_or(PresetError::MissingKey(key)),
    }
}

pub fn read_method(
    props: &Properties,
    key: &'static str,
    fallback: AdaptiveMethod,
) -> Result<AdaptiveMethod, PresetError> {
    match raw(props, key) {
        Some(text) => text.parse().map_err(|_| PresetError::InvalidValue {
            key,
            value: text.to_string(),
        }),
        None => Ok(fallback),
    }
}

/// Decode a preset section. Morphology, threshold and inversion keys are
/// required; the rest fall back to the documented defaults.
pub fn params_from_section(props: &Properties) -> Result<ParameterSet, PresetError> {
    let d = ParameterSet::default();
    Ok(ParameterSet {
        threshold_value: read_int(props, keys::THRESH_VAL, None, domain::THRESHOLD)? as u8,
        inverse: read_bool(props, keys::INVERSE, None)?,
        erode_size: read_int(props, keys::ERODE_SIZE, None, domain::ERODE_SIZE)? as u32,
        erode_iter: read_int(props, keys::ERODE_ITER, None, domain::ERODE_ITER)? as u32,
        close_size: read_int(props, keys::CLOSE_SIZE, None, domain::CLOSE_SIZE)? as u32,
        open_size: read_int(props, keys::OPEN_SIZE, None, domain::OPEN_SIZE)? as u32,
        sharpness: read_int(props, keys::SHARPNESS, Some(0), domain::SHARPNESS)? as u32,
        denoise_strength: read_int(props, keys::DENOISE, Some(0), domain::DENOISE)? as u32,
        use_adaptive_threshold: read_bool(props, keys::USE_ADAPTIVE, Some(false))?,
        adaptive_method: read_method(props, keys::ADAPTIVE_METHOD, d.adaptive_method)?,
        adaptive_block_raw: read_int(
            props,
            keys::ADAPTIVE_BLOCK_RAW,
            Some(d.adaptive_block_raw as i64),
            domain::ADAPTIVE_BLOCK_RAW,
        )? as u32,
        adaptive_c: read_int(
            props,
            keys::ADAPTIVE_C,
            Some(d.adaptive_c as i64),
            domain::ADAPTIVE_C,
        )? as i32,
    })
}

/// Write `name` plus every field into `section`, in the stored key order
pub fn write_preset_section(doc: &mut Ini, section: &str, name: &str, params: &ParameterSet) {
    doc.with_section(Some(section))
        .set(keys::NAME, name)
        .set(keys::THRESH_VAL, params.threshold_value.to_string())
        .set(keys::INVERSE, format_bool(params.inverse))
        .set(keys::ERODE_SIZE, params.erode_size.to_string())
        .set(keys::ERODE_ITER, params.erode_iter.to_string())
        .set(keys::CLOSE_SIZE, params.close_size.to_string())
        .set(keys::OPEN_SIZE, params.open_size.to_string())
        .set(keys::SHARPNESS, params.sharpness.to_string())
        .set(keys::DENOISE, params.denoise_strength.to_string())
        .set(keys::USE_ADAPTIVE, format_bool(params.use_adaptive_threshold))
        .set(keys::ADAPTIVE_METHOD, params.adaptive_method.as_str())
        .set(keys::ADAPTIVE_BLOCK_RAW, params.adaptive_block_raw.to_string())
        .set(keys::ADAPTIVE_C, params.adaptive_c.to_string());
}

/// Parse a whole document
pub fn parse_document(text: &str) -> Result<Ini, StorageError> {
    Ini::load_from_str(text).map_err(|e| StorageError::Malformed(e.to_string()))
}

/// Render a whole document with `key = value` lines
pub fn render_document(doc: &Ini) -> Result<String, StorageError> {
    let mut buf = Vec::new();
    doc.write_to_opt(
        &mut buf,
        WriteOption {
            kv_separator: " = ",
            ..Default::default()
        },
    )?;
    String::from_utf8(buf).map_err(|e| StorageError::Malformed(e.to_string()))
}
