//! Call-position tokens.
//!
//! Generated code tracks the current slot in a local (`idx` by default). How
//! that local is advanced depends on the callable kind, which is always passed
//! in explicitly rather than guessed from context.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A function's implicit return value is always slot 1.
pub const RETURN_SLOT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    Procedure,
    Function,
}

/// One rendered position argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// `idx++`
    PostIncrement(String),
    /// `++idx`
    PreIncrement(String),
    /// `idx`
    Bare(String),
    /// `idx - n`
    Behind { var: String, offset: usize },
    /// A literal slot number.
    Slot(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostIncrement(var) => write!(f, "{var}++"),
            Self::PreIncrement(var) => write!(f, "++{var}"),
            Self::Bare(var) => f.write_str(var),
            Self::Behind { var, offset } => write!(f, "{var} - {offset}"),
            Self::Slot(n) => write!(f, "{n}"),
        }
    }
}

impl CallableKind {
    /// Position of the next bind. Procedures post-increment from 1; functions
    /// pre-increment so the first parameter lands after the return slot.
    pub fn bind_position(self, var: &str) -> Position {
        match self {
            Self::Procedure => Position::PostIncrement(var.to_string()),
            Self::Function => Position::PreIncrement(var.to_string()),
        }
    }

    /// Registration slot for output `index` of `count`, in declaration order.
    /// The last procedure output leaves the counter where it is.
    pub fn registration_position(self, var: &str, index: usize, count: usize) -> Position {
        match self {
            Self::Function => Position::Slot(RETURN_SLOT),
            Self::Procedure if index + 1 == count => Position::Bare(var.to_string()),
            Self::Procedure => Position::PostIncrement(var.to_string()),
        }
    }

    /// Extraction slot for the output `from_end` places before the last one.
    pub fn extraction_position(self, var: &str, from_end: usize) -> Position {
        match self {
            Self::Function => Position::Slot(RETURN_SLOT),
            Self::Procedure if from_end == 0 => Position::Bare(var.to_string()),
            Self::Procedure => Position::Behind { var: var.to_string(), offset: from_end },
        }
    }

    /// 1-based slot the `ordinal`-th bind occupies at the call site.
    pub fn call_site_slot(self, ordinal: usize) -> usize {
        match self {
            Self::Procedure => ordinal + 1,
            Self::Function => ordinal + 1 + RETURN_SLOT,
        }
    }
}
