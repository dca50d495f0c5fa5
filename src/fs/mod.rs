//! Filesystem tree provider
//!
//! `FsTree` exposes a directory as an ordered tree bounded at its root.
//! Entries are sorted by name, symlinks are skipped, and `NameFilter`
//! decides what is shown. The walker reads it synchronously through
//! `std::fs`; the reconciler lists it through `tokio::fs`, directories only.

mod config;
mod filter;

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::{Entry, EntryProvider, NodeKind, TreeProvider};

pub use config::FsConfig;
pub use filter::NameFilter;

pub struct FsTree {
    root: PathBuf,
    config: FsConfig,
    filter: NameFilter,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>, config: FsConfig) -> Self {
        let root = root.into();
        let filter = NameFilter::new(&root, &config);
        Self {
            root,
            config,
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Entry describing the root directory itself.
    pub fn root_entry(&self) -> Entry<PathBuf> {
        Entry::new(self.root.clone(), self.root.display().to_string())
    }

    /// Path of `path` relative to the root, `.` for the root itself.
    pub fn relative_label(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }

    fn kind_of(&self, name: &str) -> NodeKind {
        if self.config.group_names.iter().any(|g| g == name) {
            NodeKind::GrandRoot
        } else {
            NodeKind::Directory
        }
    }

    fn bounded_parent(&self, path: &Path) -> Option<PathBuf> {
        if path == self.root {
            return None;
        }
        path.parent()
            .filter(|p| p.starts_with(&self.root))
            .map(Path::to_path_buf)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl TreeProvider for FsTree {
    type Node = PathBuf;
    type Key = PathBuf;

    fn parent(&self, node: &PathBuf) -> Option<PathBuf> {
        self.bounded_parent(node)
    }

    fn children(&self, node: &PathBuf) -> Vec<PathBuf> {
        let entries = match fs::read_dir(node) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %node.display(), error = %err, "cannot read directory");
                return Vec::new();
            }
        };

        let mut children: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let file_type = entry.file_type().ok()?;
                if file_type.is_symlink() {
                    return None;
                }
                let is_dir = file_type.is_dir();
                if self.config.dirs_only && !is_dir {
                    return None;
                }
                let path = entry.path();
                self.filter.is_included(&path, is_dir).then_some(path)
            })
            .collect();
        children.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
        children
    }

    fn key(&self, node: &PathBuf) -> PathBuf {
        node.clone()
    }

    fn label(&self, node: &PathBuf) -> String {
        if *node == self.root {
            self.root.display().to_string()
        } else {
            file_name(node)
        }
    }
}

#[async_trait]
impl EntryProvider for FsTree {
    type Key = PathBuf;

    async fn list_children(&self, key: &PathBuf) -> Result<Vec<Entry<PathBuf>>, ProviderError> {
        let mut dir = tokio::fs::read_dir(key)
            .await
            .map_err(|e| ProviderError::io(key, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ProviderError::io(key, e))?
        {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if file_type.is_symlink() || !file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            if !self.filter.is_included(&path, true) {
                continue;
            }
            let name = file_name(&path);
            let kind = self.kind_of(&name);
            entries.push(Entry {
                key: path,
                label: name,
                kind,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn parent_key(&self, key: &PathBuf) -> Option<PathBuf> {
        self.bounded_parent(key)
    }
}
