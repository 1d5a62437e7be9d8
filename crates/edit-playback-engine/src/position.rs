use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A line/column location in a document.
///
/// Both fields are 1-based, matching what editors show to users. Ordering is
/// line-major: every position on line 2 sorts after every position on line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in bytes from the start of the line.
    pub column: usize,
}

impl Position {
    /// The first position of every document.
    pub const START: Position = Position { line: 1, column: 1 };

    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns a position on the same line moved right by `delta` columns.
    #[must_use]
    pub fn with_column_offset(self, delta: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + delta,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected LINE:COLUMN with 1-based numbers, got {0:?}")]
pub struct ParsePositionError(String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePositionError(s.to_string());
        let (line, column) = s.split_once(':').ok_or_else(invalid)?;
        let line: usize = line.trim().parse().map_err(|_| invalid())?;
        let column: usize = column.trim().parse().map_err(|_| invalid())?;
        if line == 0 || column == 0 {
            return Err(invalid());
        }
        Ok(Position::new(line, column))
    }
}
