use alloc::string::String;
use core::error::Error;
use core::fmt;

/// Errors reported by the ordered maps in this crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TreeError {
    /// The requested key is not stored in the tree. Nothing was modified.
    KeyNotFound,
    /// A structural or balance invariant does not hold.
    ///
    /// Only produced by `check_invariants`; seeing it means a rebalancing bug.
    InvariantViolation(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::KeyNotFound => write!(f, "key not found"),
            TreeError::InvariantViolation(detail) => write!(f, "tree invariant violated: {detail}"),
        }
    }
}

impl Error for TreeError {}

/// Returns `InvariantViolation` with a formatted message unless `$cond` holds.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::TreeError::InvariantViolation(alloc::format!($($arg)+)));
        }
    };
}

pub(crate) use ensure;
