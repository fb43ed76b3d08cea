//! Ordered per-kind index of transformers by target.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use weaver_primitives::{Target, TargetKind};

use crate::config::DuplicatePolicy;
use crate::error::{ConfigurationError, InsertAction};
use crate::transformer::{SharedTransformer, same_instance};

/// Insertion-ordered map keyed by target.
pub type TargetMap<V> = IndexMap<Target, V, FxBuildHasher>;

/// Every transformer of one kind, grouped by the target it was registered under.
///
/// Sequences are kept in registration order and never re-sorted; priority
/// between transformers on one target is expressed by voting, not by position.
pub struct TransformList<U> {
	kind: TargetKind,
	entries: TargetMap<Vec<SharedTransformer<U>>>,
}

impl<U> Clone for TransformList<U> {
	fn clone(&self) -> Self {
		Self {
			kind: self.kind,
			entries: self.entries.clone(),
		}
	}
}

impl<U> TransformList<U> {
	pub fn new(kind: TargetKind) -> Self {
		Self {
			kind,
			entries: TargetMap::default(),
		}
	}

	#[inline]
	pub fn kind(&self) -> TargetKind {
		self.kind
	}

	/// Appends `transformer` to the sequence for `target`, creating it if absent.
	pub fn register(
		&mut self,
		target: Target,
		transformer: SharedTransformer<U>,
		policy: DuplicatePolicy,
	) -> Result<InsertAction, ConfigurationError> {
		if target.kind() != self.kind {
			return Err(ConfigurationError::KindMismatch {
				transformer: transformer.label().to_owned(),
				expected: self.kind,
				target,
			});
		}

		let Some(sequence) = self.entries.get_mut(&target) else {
			self.entries.insert(target, vec![transformer]);
			return Ok(InsertAction::Appended);
		};

		if !sequence.iter().any(|t| same_instance(t, &transformer)) {
			sequence.push(transformer);
			return Ok(InsertAction::Appended);
		}

		match policy {
			DuplicatePolicy::Reject => Err(ConfigurationError::DuplicateRegistration {
				transformer: transformer.label().to_owned(),
				target,
			}),
			DuplicatePolicy::Ignore => {
				tracing::warn!(
					transformer = transformer.label(),
					unit = %target,
					"ignoring repeated registration"
				);
				Ok(InsertAction::KeptExisting)
			}
		}
	}

	/// Read-only view of every target and its ordered sequence.
	#[inline]
	pub fn transformers(&self) -> &TargetMap<Vec<SharedTransformer<U>>> {
		&self.entries
	}

	/// Ordered sequence for `target`; empty if nothing is registered.
	#[inline]
	pub fn transformers_for(&self, target: &Target) -> &[SharedTransformer<U>] {
		self.entries.get(target).map_or(&[], Vec::as_slice)
	}

	#[inline]
	pub fn contains(&self, target: &Target) -> bool {
		self.entries.contains_key(target)
	}

	/// Targets in first-registration order.
	pub fn targets(&self) -> impl Iterator<Item = &Target> + '_ {
		self.entries.keys()
	}

	/// Number of distinct targets.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
