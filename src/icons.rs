//! # Weather Icon Mapping
//!
//! Translates the condition names reported by the weather API (`"rain"`,
//! `"partly-cloudy-day"`, ...) into glyphs of the open-iconic weather face.
//! The default table ships in `icons/icons.json` and is compiled into the
//! binary; a replacement file can be supplied through the configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

/// Glyph used for conditions the table does not know (sun).
pub const FALLBACK_GLYPH: char = 'E';

const DEFAULT_TABLE: &str = include_str!("../icons/icons.json");

#[derive(Error, Debug)]
pub enum IconError {
    #[error("failed to read icon map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid icon map JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("icon for {condition:?} must be exactly one glyph, got {value:?}")]
    InvalidGlyph { condition: String, value: String },
}

/// Condition name to glyph lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconMap {
    glyphs: HashMap<String, char>,
}

impl IconMap {
    /// Parse a JSON object of `condition -> single-character string`.
    pub fn from_json(json: &str) -> Result<Self, IconError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut glyphs = HashMap::with_capacity(raw.len());
        for (condition, value) in raw {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(glyph), None) => {
                    glyphs.insert(condition, glyph);
                }
                _ => return Err(IconError::InvalidGlyph { condition, value }),
            }
        }
        Ok(Self { glyphs })
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, IconError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| IconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json(&contents)?;
        debug!("loaded {} icon mappings from {}", map.len(), path.display());
        Ok(map)
    }

    /// Custom table when `path` is given and readable, the embedded table
    /// otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::load_from_path(path) {
                Ok(map) => return map,
                Err(e) => warn!("{}, using built-in icon map", e),
            }
        }
        Self::default()
    }

    /// Glyph for `condition`, or [`FALLBACK_GLYPH`].
    pub fn glyph_for(&self, condition: &str) -> char {
        self.glyphs
            .get(condition)
            .copied()
            .unwrap_or(FALLBACK_GLYPH)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl Default for IconMap {
    fn default() -> Self {
        match Self::from_json(DEFAULT_TABLE) {
            Ok(map) => map,
            Err(e) => {
                warn!("built-in icon map is invalid: {}", e);
                Self {
                    glyphs: HashMap::new(),
                }
            }
        }
    }
}
