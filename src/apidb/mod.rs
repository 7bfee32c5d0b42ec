//! API requirement database
//!
//! Maps method names to the API level that introduced them. Ships with a
//! built-in table of common platform methods; project-specific entries load
//! from a TOML overlay:
//!
//! ```toml
//! [api]
//! getDrawable = 21
//! myVendorCall = 28
//! ```
//!
//! Entries are keyed by simple method name. Overlay entries win over the
//! built-in table.

use crate::analysis::ApiLevel;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiDbError {
    #[error("failed to read api table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid api table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct OverlayFile {
    #[serde(default)]
    api: HashMap<String, i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiDatabase {
    apis: HashMap<String, ApiLevel>,
}

impl ApiDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table of commonly flagged platform methods.
    pub fn builtin() -> Self {
        let mut db = Self::new();
        for (name, level) in [
            ("getDrawable", 21),
            ("setElevation", 21),
            ("getOutlineProvider", 21),
            ("checkSelfPermission", 23),
            ("requestPermissions", 23),
            ("shouldShowRequestPermissionRationale", 23),
            ("isAttachedToWindow", 19),
            ("createNotificationChannel", 26),
            ("startForegroundService", 26),
            ("requireViewById", 28),
            ("isExternalStorageLegacy", 29),
            ("getDisplay", 30),
        ] {
            db.insert(name, ApiLevel::new(level));
        }
        db
    }

    pub fn insert(&mut self, name: impl Into<String>, level: ApiLevel) {
        self.apis.insert(name.into(), level);
    }

    pub fn lookup(&self, name: &str) -> Option<ApiLevel> {
        self.apis.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    /// Merge a TOML overlay into this table.
    pub fn load_overlay(&mut self, path: &Path) -> Result<(), ApiDbError> {
        let text = std::fs::read_to_string(path).map_err(|source| ApiDbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: OverlayFile = toml::from_str(&text).map_err(|source| ApiDbError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for (name, level) in overlay.api {
            self.insert(name, ApiLevel::new(level));
        }
        Ok(())
    }
}
