//! Ambient state handed to transformers during application.

use std::any::Any;

use serde::Serialize;
use weaver_primitives::Target;

use crate::audit::{Activity, AuditTrail, Outcome};

/// Why the host is processing a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadReason {
	/// The unit is about to be defined and executed.
	#[default]
	ClassLoading,
	/// The unit is being inspected (e.g. for frame computation) and will not be defined.
	Analysis,
}

/// Which vote round a transformer is being asked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VotePass {
	/// First vote in this attempt.
	Initial,
	/// Retry after the transformer voted [`Vote::Defer`](weaver_primitives::Vote::Defer).
	Deferred,
}

/// Per-attempt context the loader passes to `apply`.
#[derive(Clone, Copy, Default)]
pub struct ApplyContext<'a> {
	reason: LoadReason,
	audit: Option<&'a AuditTrail>,
	extensions: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> ApplyContext<'a> {
	pub fn new(reason: LoadReason) -> Self {
		Self {
			reason,
			audit: None,
			extensions: None,
		}
	}

	/// Records every vote and application of this attempt into `audit`.
	pub fn with_audit(mut self, audit: &'a AuditTrail) -> Self {
		self.audit = Some(audit);
		self
	}

	/// Attaches host state transformers can downcast via [`VotingContext::extensions`].
	pub fn with_extensions(mut self, extensions: &'a (dyn Any + Send + Sync)) -> Self {
		self.extensions = Some(extensions);
		self
	}

	pub fn reason(&self) -> LoadReason {
		self.reason
	}

	pub fn audit(&self) -> Option<&'a AuditTrail> {
		self.audit
	}
}

/// Context passed to [`Transformer::cast_vote`](crate::Transformer::cast_vote) and
/// [`Transformer::transform`](crate::Transformer::transform).
///
/// Built fresh for every call; carries what has happened so far in the
/// current attempt so a transformer can yield to others.
#[derive(Clone, Copy)]
pub struct VotingContext<'a> {
	target: &'a Target,
	reason: LoadReason,
	pass: VotePass,
	history: &'a [Activity],
	extensions: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> VotingContext<'a> {
	/// A first-pass context with no history, for driving a transformer outside a store.
	pub fn new(target: &'a Target, reason: LoadReason) -> Self {
		Self {
			target,
			reason,
			pass: VotePass::Initial,
			history: &[],
			extensions: None,
		}
	}

	pub(crate) fn for_attempt(
		target: &'a Target,
		apply: &ApplyContext<'a>,
		pass: VotePass,
		history: &'a [Activity],
	) -> Self {
		Self {
			target,
			reason: apply.reason,
			pass,
			history,
			extensions: apply.extensions,
		}
	}

	pub fn target(&self) -> &'a Target {
		self.target
	}

	pub fn reason(&self) -> LoadReason {
		self.reason
	}

	pub fn pass(&self) -> VotePass {
		self.pass
	}

	/// Everything recorded so far in this attempt, in order.
	pub fn history(&self) -> &'a [Activity] {
		self.history
	}

	/// Labels of transformers that already transformed the unit in this attempt.
	pub fn applied(&self) -> impl Iterator<Item = &'a str> + 'a {
		self.history
			.iter()
			.filter(|a| a.outcome == Outcome::Applied)
			.map(|a| a.transformer.as_str())
	}

	pub fn has_applied(&self, label: &str) -> bool {
		self.applied().any(|l| l == label)
	}

	/// Attempts to downcast the host extensions to a concrete type.
	pub fn extensions<T: Any>(&self) -> Option<&'a T> {
		let ext: &'a dyn Any = self.extensions?;
		ext.downcast_ref::<T>()
	}
}
