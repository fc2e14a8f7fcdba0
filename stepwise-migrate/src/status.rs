//! Script status codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Last known outcome of a script.
///
/// A script with no cache entry is treated as [`Status::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Never successfully applied.
    Pending = 1,
    /// Last apply attempt raised an error.
    Failed = 2,
    /// Last apply succeeded and has not been reversed since.
    Passed = 3,
}

impl Status {
    /// All statuses in code order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::Failed, Status::Passed];

    /// Numeric code used by persistent backends.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Inverse of [`Status::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Failed => "FAILED",
            Status::Passed => "PASSED",
        }
    }

    /// Whether `apply` may run from this status.
    pub fn can_apply(self) -> bool {
        !self.can_reverse()
    }

    /// Whether `reverse` may run from this status.
    pub fn can_reverse(self) -> bool {
        self == Status::Passed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Status::Pending),
            "FAILED" => Ok(Status::Failed),
            "PASSED" => Ok(Status::Passed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}
