//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Print the walker phase next to each visited node.
    pub show_phase: bool,
}

impl OutputConfig {
    pub fn plain() -> Self {
        Self {
            use_color: false,
            show_phase: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_phase: false,
        }
    }
}
