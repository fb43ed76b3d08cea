//! Store configuration.
//!
//! Hosts embed [`StoreConfig`] in their own configuration files; every field
//! has a default so partial documents deserialize.

use serde::{Deserialize, Serialize};

/// Policy for registering the same transformer instance twice on one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
	/// Fail with [`ConfigurationError::DuplicateRegistration`](crate::ConfigurationError::DuplicateRegistration).
	#[default]
	Reject,
	/// Keep the existing registration and log the repeat.
	Ignore,
}

/// Construction-time settings for a [`TransformStore`](crate::TransformStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
	pub duplicate_policy: DuplicatePolicy,
	/// Seal the store once all services have been gathered.
	pub seal_after_gather: bool,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			duplicate_policy: DuplicatePolicy::Reject,
			seal_after_gather: true,
		}
	}
}
