//! Name filtering for filesystem trees

use std::path::Path;

use glob::Pattern;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

use super::config::FsConfig;

/// Decides which directory entries are shown.
///
/// `.git` is always hidden. Unless `show_all` is set, hidden entries and
/// entries matched by the root `.gitignore` are hidden too.
pub struct NameFilter {
    show_all: bool,
    patterns: Vec<(String, Option<Pattern>)>,
    gitignore: Option<Gitignore>,
}

impl NameFilter {
    pub fn new(root: &Path, config: &FsConfig) -> Self {
        let patterns = config
            .ignore_patterns
            .iter()
            .map(|raw| {
                let compiled = match Pattern::new(raw) {
                    Ok(p) => Some(p),
                    Err(err) => {
                        warn!(
                            pattern = %raw,
                            error = %err,
                            "invalid ignore pattern, matching literally"
                        );
                        None
                    }
                };
                (raw.clone(), compiled)
            })
            .collect();

        let gitignore = if config.show_all {
            None
        } else {
            load_gitignore(root)
        };

        Self {
            show_all: config.show_all,
            patterns,
            gitignore,
        }
    }

    pub fn is_included(&self, path: &Path, is_dir: bool) -> bool {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if name == ".git" {
            return false;
        }

        for (raw, pattern) in &self.patterns {
            if name == *raw || pattern.as_ref().is_some_and(|p| p.matches(&name)) {
                return false;
            }
        }

        if self.show_all {
            return true;
        }
        if name.starts_with('.') {
            return false;
        }
        match &self.gitignore {
            Some(gitignore) => !gitignore.matched(path, is_dir).is_ignore(),
            None => true,
        }
    }
}

fn load_gitignore(root: &Path) -> Option<Gitignore> {
    let file = root.join(".gitignore");
    if !file.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&file) {
        warn!(path = %file.display(), error = %err, "failed to read .gitignore");
    }
    match builder.build() {
        Ok(gitignore) => Some(gitignore),
        Err(err) => {
            warn!(path = %file.display(), error = %err, "failed to build .gitignore matcher");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;

    #[test]
    fn test_git_dir_always_hidden() {
        let dir = TestDir::new();
        let config = FsConfig {
            show_all: true,
            ..FsConfig::default()
        };
        let filter = NameFilter::new(dir.path(), &config);
        assert!(!filter.is_included(&dir.join(".git"), true));
        assert!(filter.is_included(&dir.join(".hidden"), true));
    }

    #[test]
    fn test_hidden_and_gitignored_entries() {
        let dir = TestDir::new();
        dir.add_file(".gitignore", "target/\n*.log\n");
        let filter = NameFilter::new(dir.path(), &FsConfig::default());
        assert!(!filter.is_included(&dir.join(".cache"), true));
        assert!(!filter.is_included(&dir.join("target"), true));
        assert!(!filter.is_included(&dir.join("out.log"), false));
        assert!(filter.is_included(&dir.join("src"), true));
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = TestDir::new();
        let config = FsConfig {
            ignore_patterns: vec!["node_modules".to_string(), "*.tmp".to_string()],
            ..FsConfig::default()
        };
        let filter = NameFilter::new(dir.path(), &config);
        assert!(!filter.is_included(&dir.join("node_modules"), true));
        assert!(!filter.is_included(&dir.join("a.tmp"), false));
        assert!(filter.is_included(&dir.join("a.txt"), false));
    }
}
