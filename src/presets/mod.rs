//! Named parameter presets persisted as `[PresetN]` INI sections.
//!
//! The catalog keeps the parsed document alongside the entries so an append
//! rewrites every section it read, including ones it could not interpret.

pub mod format;

use ini::Ini;
use log::{debug, info, warn};

use crate::error::{CatalogError, PresetError};
use crate::models::{AdaptiveMethod, ParameterSet};
use crate::storage::TextStorage;

use self::format::{keys, params_from_section, parse_document, render_document, write_preset_section};

/// Section names start with this prefix, followed by the numeric id.
pub const SECTION_PREFIX: &str = "Preset";

/// A named parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub params: ParameterSet,
}

impl Preset {
    pub fn new(name: impl Into<String>, params: ParameterSet) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// The three presets written when no preset store exists yet.
pub fn builtin_presets() -> Vec<Preset> {
    let global = ParameterSet::default();
    vec![
        Preset::new("Default Global", global),
        Preset::new(
            "Default Adaptive Gaussian",
            ParameterSet {
                denoise_strength: 5,
                use_adaptive_threshold: true,
                adaptive_method: AdaptiveMethod::Gaussian,
                ..global
            },
        ),
        Preset::new(
            "Adaptive Mean LowContrast",
            ParameterSet {
                erode_size: 1,
                close_size: 2,
                open_size: 2,
                sharpness: 10,
                denoise_strength: 3,
                use_adaptive_threshold: true,
                adaptive_method: AdaptiveMethod::Mean,
                adaptive_block_raw: 7,
                adaptive_c: 3,
                ..global
            },
        ),
    ]
}

/// Smallest id greater than every id in use; 1 for an empty catalog.
pub fn next_preset_id<I: IntoIterator<Item = u32>>(ids: I) -> u32 {
    ids.into_iter().max().map_or(1, |max| max.saturating_add(1))
}

/// Numeric suffix of a `PresetN` section name
pub fn section_id(section: &str) -> Option<u32> {
    section.strip_prefix(SECTION_PREFIX)?.parse().ok()
}

/// One preset section as read from the store.
///
/// Sections that fail to parse are still listed so a sweep can report them.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetEntry {
    pub section: String,
    /// `None` when the section suffix is not a number
    pub id: Option<u32>,
    pub name: String,
    pub params: Result<ParameterSet, PresetError>,
}

impl PresetEntry {
    pub fn is_valid(&self) -> bool {
        self.params.is_ok()
    }
}

/// Where the catalog contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Parsed from an existing store
    Stored,
    /// Store was absent; the built-in presets were written to it
    Seeded,
    /// Store was unreadable; built-in presets are used in memory only
    Fallback,
}

/// Result of loading the catalog: never fails, but may carry notes for the user.
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: PresetCatalog,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PresetCatalog {
    document: Ini,
    entries: Vec<PresetEntry>,
    origin: CatalogOrigin,
}

impl PresetCatalog {
    /// Read the catalog from `storage`, seeding it with the built-in presets
    /// when absent and falling back to them in memory when unreadable.
    pub fn load<S: TextStorage + ?Sized>(storage: &mut S) -> CatalogLoad {
        let mut notes = Vec::new();
        let text = match storage.read() {
            Ok(text) => text,
            Err(err) => {
                warn!("cannot read presets from {}: {err}", storage.describe());
                notes.push(format!("Error reading presets: {err}; using defaults"));
                return CatalogLoad {
                    catalog: Self::builtin(CatalogOrigin::Fallback),
                    notes,
                };
            }
        };

        let catalog = match text {
            None => {
                let catalog = Self::builtin(CatalogOrigin::Seeded);
                match render_document(&catalog.document).and_then(|doc| storage.write(&doc)) {
                    Ok(()) => {
                        info!("seeded default presets at {}", storage.describe());
                        notes.push(format!("Generated default presets at {}", storage.describe()));
                    }
                    Err(err) => {
                        warn!("cannot write default presets: {err}");
                        notes.push(format!("Could not write default presets: {err}"));
                    }
                }
                catalog
            }
            Some(text) => match Self::from_document(&text) {
                Ok(catalog) => catalog,
                Err(err) => {
                    warn!("preset store {} is malformed: {err}", storage.describe());
                    notes.push(format!("Error reading presets: {err}; using defaults"));
                    Self::builtin(CatalogOrigin::Fallback)
                }
            },
        };

        for entry in &catalog.entries {
            if let Err(err) = &entry.params {
                notes.push(format!("Preset '{}' ({}) is unusable: {err}", entry.name, entry.section));
            }
        }
        CatalogLoad { catalog, notes }
    }

    /// Parse a stored document. Only sections named `Preset*` become entries.
    pub fn from_document(text: &str) -> Result<Self, crate::error::StorageError> {
        let document = parse_document(text)?;
        Ok(Self::from_ini(document, CatalogOrigin::Stored))
    }

    fn from_ini(document: Ini, origin: CatalogOrigin) -> Self {
        let entries = document
            .iter()
            .filter_map(|(section, props)| {
                let section = section?;
                if !section.starts_with(SECTION_PREFIX) {
                    return None;
                }
                let name = props
                    .get(keys::NAME)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(section)
                    .to_string();
                Some(PresetEntry {
                    section: section.to_string(),
                    id: section_id(section),
                    name,
                    params: params_from_section(props),
                })
            })
            .collect::<Vec<_>>();
        debug!("preset catalog holds {} entries", entries.len());
        Self {
            document,
            entries,
            origin,
        }
    }

    fn builtin(origin: CatalogOrigin) -> Self {
        let mut document = Ini::new();
        for (i, preset) in builtin_presets().iter().enumerate() {
            let section = format!("{SECTION_PREFIX}{}", i + 1);
            write_preset_section(&mut document, &section, &preset.name, &preset.params);
        }
        Self::from_ini(document, origin)
    }

    /// Empty catalog that lives only in memory
    pub fn empty() -> Self {
        Self::from_ini(Ini::new(), CatalogOrigin::Stored)
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Entries in document order
    pub fn entries(&self) -> &[PresetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PresetEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Numeric ids in use
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().filter_map(|e| e.id)
    }

    pub fn next_id(&self) -> u32 {
        next_preset_id(self.ids())
    }

    /// Full document text as it would be persisted
    pub fn render(&self) -> Result<String, crate::error::StorageError> {
        render_document(&self.document)
    }

    /// Store `params` under `name` as section `Preset{next_id}` and persist
    /// the whole document. The catalog is unchanged if persisting fails.
    pub fn append<S: TextStorage + ?Sized>(
        &mut self,
        name: &str,
        params: ParameterSet,
        storage: &mut S,
    ) -> Result<u32, CatalogError> {
        if self.origin == CatalogOrigin::Fallback {
            return Err(CatalogError::ReadOnly);
        }
        params.validate()?;

        let id = self.next_id();
        let section = format!("{SECTION_PREFIX}{id}");
        let mut document = self.document.clone();
        write_preset_section(&mut document, &section, name, &params);
        storage.write(&render_document(&document)?)?;

        info!("saved preset '{name}' as {section} in {}", storage.describe());
        self.document = document;
        self.entries.push(PresetEntry {
            section,
            id: Some(id),
            name: name.to_string(),
            params: Ok(params),
        });
        Ok(id)
    }
}
