//! Source file discovery
//!
//! Walks the project tree with gitignore rules applied, collecting Kotlin
//! and Java files and filtering configured exclude patterns.

use crate::config::Config;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Kotlin,
    Java,
}

impl FileType {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("kt") | Some("kts") => Some(FileType::Kotlin),
            Some("java") => Some(FileType::Java),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_type: FileType,
}

/// Finds analyzable source files under a project root.
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>, DiscoveryError> {
        let roots: Vec<PathBuf> = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config.targets.iter().map(|t| root.join(t)).collect()
        };

        let mut files = Vec::new();
        for walk_root in &roots {
            for entry in WalkBuilder::new(walk_root).build() {
                let entry = entry.map_err(|source| DiscoveryError::Walk {
                    path: walk_root.clone(),
                    source,
                })?;
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let Some(file_type) = FileType::from_path(path) else {
                    continue;
                };
                if self.is_excluded(path) {
                    continue;
                }
                files.push(SourceFile {
                    path: path.to_path_buf(),
                    file_type,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        debug!(count = files.len(), "discovered source files");
        Ok(files)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.config.exclude.iter().any(|p| text.contains(p.as_str()))
    }
}
