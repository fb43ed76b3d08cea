use std::fmt;

use serde::{Deserialize, Serialize};

/// A transformer's decision for one transformation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
	/// Apply now.
	Yes,
	/// Skip for this attempt only.
	No,
	/// Ask again after every other transformer on the target has been resolved.
	///
	/// A transformer may defer at most once per attempt; a second deferral is
	/// resolved as [`Vote::No`].
	Defer,
}

impl Vote {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Yes => "yes",
			Self::No => "no",
			Self::Defer => "defer",
		}
	}
}

impl fmt::Display for Vote {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<bool> for Vote {
	fn from(apply: bool) -> Self {
		if apply { Self::Yes } else { Self::No }
	}
}
