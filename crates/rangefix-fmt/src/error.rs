// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// A tree the printer cannot render as valid Go.
///
/// The parser never produces these shapes; they only arise from a broken
/// rewrite.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrintError {
    #[error("empty identifier at byte {offset}")]
    EmptyIdent { offset: usize },
    #[error("assignment at byte {offset} has no {side}-hand side")]
    EmptyAssign { offset: usize, side: &'static str },
    #[error("range clause at byte {offset} is malformed")]
    MalformedRange { offset: usize },
    #[error("{clause} of the loop at byte {offset} is not a simple statement")]
    NotSimpleStmt { clause: &'static str, offset: usize },
    #[error("key-value pair at byte {offset} outside a composite literal")]
    StrayKeyValue { offset: usize },
}
