//! Configuration for the filesystem provider

/// Which entries of a directory tree are shown.
#[derive(Debug, Clone, Default)]
pub struct FsConfig {
    /// Show hidden and gitignored entries.
    pub show_all: bool,
    /// Hide files. The entry listing used for reconciliation is always
    /// directories only.
    pub dirs_only: bool,
    /// Names or globs to hide, matched against the file name.
    pub ignore_patterns: Vec<String>,
    /// Directory names listed as grand roots.
    pub group_names: Vec<String>,
}
