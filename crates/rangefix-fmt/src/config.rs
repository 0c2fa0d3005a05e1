// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// Printer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Indent with tabs (the gofmt default) instead of spaces
    pub use_tabs: bool,
    /// Spaces per level when `use_tabs` is off
    pub indent_width: usize,
    /// Longest function header plus body kept on a single line
    pub max_line_width: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            use_tabs: true,
            indent_width: 8,
            max_line_width: 100,
        }
    }
}
