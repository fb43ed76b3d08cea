//! Transformer capability and its kind-tagged handle.

use std::fmt;
use std::sync::Arc;

use weaver_primitives::{Target, TargetKind, Vote};

use crate::context::VotingContext;
use crate::error::BoxError;
use crate::units::UnitFamily;

/// A pluggable unit of work over units of type `U`.
///
/// Implementations must be stateless or internally synchronized: the same
/// instance may be voting and transforming on several threads at once.
pub trait Transformer<U>: Send + Sync {
	/// Stable identity used in logs, the audit trail and diagnostics.
	fn label(&self) -> &str {
		std::any::type_name::<Self>()
	}

	/// Targets this transformer applies to. Called once, at registration.
	///
	/// Must be non-empty.
	fn targets(&self) -> Vec<Target>;

	/// Decides whether to apply to `ctx.target()` in this attempt.
	fn cast_vote(&self, ctx: &VotingContext<'_>) -> Vote;

	/// Consumes the current unit and returns its replacement.
	///
	/// Only called after a [`Vote::Yes`]. An error aborts the unit's load.
	fn transform(&self, unit: U, ctx: &VotingContext<'_>) -> Result<U, BoxError>;
}

/// Shared, type-erased transformer over units of type `U`.
pub type SharedTransformer<U> = Arc<dyn Transformer<U>>;

/// Returns true if both handles point at the same transformer instance.
pub(crate) fn same_instance<U>(a: &SharedTransformer<U>, b: &SharedTransformer<U>) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A transformer tagged with the kind of unit it transforms.
pub enum AnyTransformer<F: UnitFamily> {
	Class(SharedTransformer<F::Class>),
	Method(SharedTransformer<F::Method>),
	Field(SharedTransformer<F::Field>),
}

impl<F: UnitFamily> AnyTransformer<F> {
	pub fn class(transformer: impl Transformer<F::Class> + 'static) -> Self {
		Self::Class(Arc::new(transformer))
	}

	pub fn method(transformer: impl Transformer<F::Method> + 'static) -> Self {
		Self::Method(Arc::new(transformer))
	}

	pub fn field(transformer: impl Transformer<F::Field> + 'static) -> Self {
		Self::Field(Arc::new(transformer))
	}

	/// Kind of unit this transformer accepts, and therefore of every target it may declare.
	pub fn kind(&self) -> TargetKind {
		match self {
			Self::Class(_) => TargetKind::Class,
			Self::Method(_) => TargetKind::Method,
			Self::Field(_) => TargetKind::Field,
		}
	}

	pub fn label(&self) -> &str {
		match self {
			Self::Class(t) => t.label(),
			Self::Method(t) => t.label(),
			Self::Field(t) => t.label(),
		}
	}

	pub fn targets(&self) -> Vec<Target> {
		match self {
			Self::Class(t) => t.targets(),
			Self::Method(t) => t.targets(),
			Self::Field(t) => t.targets(),
		}
	}

	/// Returns true if both handles wrap the same instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Class(a), Self::Class(b)) => same_instance(a, b),
			(Self::Method(a), Self::Method(b)) => same_instance(a, b),
			(Self::Field(a), Self::Field(b)) => same_instance(a, b),
			_ => false,
		}
	}
}

impl<F: UnitFamily> Clone for AnyTransformer<F> {
	fn clone(&self) -> Self {
		match self {
			Self::Class(t) => Self::Class(t.clone()),
			Self::Method(t) => Self::Method(t.clone()),
			Self::Field(t) => Self::Field(t.clone()),
		}
	}
}

impl<F: UnitFamily> fmt::Debug for AnyTransformer<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AnyTransformer")
			.field("kind", &self.kind())
			.field("label", &self.label())
			.finish()
	}
}
