// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Machine-readable run report for `--json`.

use std::path::Path;

use serde::Serialize;

use rangefix_fix::{ErrorKind, FileOutcome, FixError};

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub files: usize,
    pub changed: usize,
    pub failed: usize,
    pub rewrites: usize,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrites: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unchanged,
    WouldUpdate,
    Updated,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Report {
    pub fn record_outcome(&mut self, path: &Path, outcome: FileOutcome) {
        let (status, rewrites) = match outcome {
            FileOutcome::Unchanged => (Status::Unchanged, None),
            FileOutcome::WouldUpdate { rewrites } => (Status::WouldUpdate, Some(rewrites)),
            FileOutcome::Updated { rewrites } => (Status::Updated, Some(rewrites)),
        };
        self.summary.files += 1;
        if let Some(n) = rewrites {
            self.summary.changed += 1;
            self.summary.rewrites += n;
        }
        self.files.push(FileReport {
            path: path.display().to_string(),
            status,
            rewrites,
            error: None,
        });
    }

    pub fn record_error(&mut self, path: &Path, error: &FixError) {
        self.summary.files += 1;
        self.summary.failed += 1;
        self.files.push(FileReport {
            path: path.display().to_string(),
            status: Status::Error,
            rewrites: None,
            error: Some(ErrorReport::from(error)),
        });
    }

    /// A walk failure that has no single Go file behind it.
    pub fn record_walk_error(&mut self, path: &Path, message: String) {
        self.summary.failed += 1;
        self.files.push(FileReport {
            path: path.display().to_string(),
            status: Status::Error,
            rewrites: None,
            error: Some(ErrorReport { kind: "io", message, diagnostics: Vec::new() }),
        });
    }
}

impl From<&FixError> for ErrorReport {
    fn from(error: &FixError) -> Self {
        let kind = match error.kind() {
            ErrorKind::Parse => "parse",
            ErrorKind::Print => "print",
            ErrorKind::Io => "io",
        };
        let diagnostics = match error {
            FixError::Parse { errors } => errors
                .iter()
                .map(|e| Diagnostic {
                    line: e.line,
                    column: e.column,
                    message: e.message.clone(),
                    hint: e.hint.clone(),
                })
                .collect(),
            _ => Vec::new(),
        };
        ErrorReport { kind, message: error.to_string(), diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn serializes_outcomes_and_errors() {
        let mut report = Report::default();
        report.record_outcome(Path::new("a.go"), FileOutcome::Updated { rewrites: 2 });
        report.record_outcome(Path::new("b.go"), FileOutcome::Unchanged);
        report.record_error(
            Path::new("c.go"),
            &FixError::Io { path: "c.go".into(), source: io::Error::new(io::ErrorKind::NotFound, "missing") },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "updated");
        assert_eq!(json["files"][0]["rewrites"], 2);
        assert!(json["files"][1].get("rewrites").is_none());
        assert_eq!(json["files"][2]["error"]["kind"], "io");
        assert_eq!(json["summary"]["files"], 3);
        assert_eq!(json["summary"]["changed"], 1);
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["summary"]["rewrites"], 2);
    }
}
