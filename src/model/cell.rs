//! Cells and deduction results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid position index of a puzzle cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(v: u32) -> Self {
        CellId(v)
    }
}

/// What the solver concluded about a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultKind {
    /// Initial or revealed number hint. Any `HINT…` spelling folds here.
    Hint,
    Safe,
    Mine,
    /// Anything the trace writer emitted that is none of the above.
    Unknown,
}

impl ResultKind {
    /// Parse a `Result` column value. `HINT(3)`, `HINT3` and `HINT` all fold
    /// to `Hint`; matching is case-sensitive like the trace writer.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("HINT") {
            return ResultKind::Hint;
        }
        match raw {
            "SAFE" => ResultKind::Safe,
            "MINE" => ResultKind::Mine,
            _ => ResultKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Hint => "HINT",
            ResultKind::Safe => "SAFE",
            ResultKind::Mine => "MINE",
            ResultKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
