//! The transform store: per-kind transform lists plus the "needs
//! transformation" sets, published as atomic snapshots.
//!
//! # Role
//!
//! Registration clones the current [`StoreSnapshot`], indexes the new
//! transformer into the clone, and publishes it with a CAS retry loop. A
//! rejected registration never publishes, so the store is unchanged.
//!
//! # Invariants
//!
//! - Readers observe either all or none of one transformer's targets.
//! - After [`TransformStore::seal`], no registration succeeds. The seal is
//!   part of the snapshot and published through the same CAS loop, so a
//!   registration racing the seal either lands before it or fails.

mod apply;
mod snapshot;

use std::sync::Arc;

pub(crate) use apply::run as apply_sequence;
use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;
pub use snapshot::{StoreDescription, StoreSnapshot, TargetDescription};
use weaver_primitives::{Target, TargetKind};

use crate::config::StoreConfig;
use crate::context::ApplyContext;
use crate::error::{ConfigurationError, InsertAction, TransformationError};
use crate::transformer::{AnyTransformer, SharedTransformer};
use crate::units::{AnyUnit, UnitFamily};

/// Registry of transformers indexed by kind and target.
///
/// Owned by the loader that uses it; there is no global instance.
pub struct TransformStore<F: UnitFamily> {
	snap: ArcSwap<StoreSnapshot<F>>,
	config: StoreConfig,
}

impl<F: UnitFamily> Default for TransformStore<F> {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: UnitFamily> TransformStore<F> {
	pub fn new() -> Self {
		Self::with_config(StoreConfig::default())
	}

	pub fn with_config(config: StoreConfig) -> Self {
		Self {
			snap: ArcSwap::from_pointee(StoreSnapshot::default()),
			config,
		}
	}

	pub fn config(&self) -> &StoreConfig {
		&self.config
	}

	/// Indexes `transformer` under every target it declares.
	///
	/// The whole declaration is validated before anything is published:
	/// an empty target list, a target of the wrong kind, or a duplicate
	/// (under [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject))
	/// leaves the store untouched. Targets repeated inside one declaration
	/// are indexed once.
	pub fn register_transformer(&self, transformer: AnyTransformer<F>) -> Result<Vec<InsertAction>, ConfigurationError> {
		if self.is_sealed() {
			return Err(ConfigurationError::Sealed {
				transformer: transformer.label().to_owned(),
			});
		}
		let targets = transformer.targets();
		self.register_declared(transformer, targets)
	}

	/// Registers `transformer` under targets already obtained from it.
	pub(crate) fn register_declared(
		&self,
		transformer: AnyTransformer<F>,
		mut targets: Vec<Target>,
	) -> Result<Vec<InsertAction>, ConfigurationError> {
		let label = transformer.label();
		let mut seen = FxHashSet::default();
		targets.retain(|t| seen.insert(t.clone()));
		if targets.is_empty() {
			return Err(ConfigurationError::NoTargets {
				transformer: label.to_owned(),
			});
		}
		if let Some(target) = targets.iter().find(|t| t.kind() != transformer.kind()) {
			return Err(ConfigurationError::KindMismatch {
				transformer: label.to_owned(),
				expected: transformer.kind(),
				target: target.clone(),
			});
		}

		loop {
			let cur = self.snap.load_full();
			if cur.is_sealed() {
				return Err(ConfigurationError::Sealed {
					transformer: label.to_owned(),
				});
			}
			let mut next = (*cur).clone();
			let actions = next.insert(&transformer, &targets, self.config.duplicate_policy)?;

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				tracing::debug!(
					transformer = label,
					kind = %transformer.kind(),
					targets = targets.len(),
					"registered transformer"
				);
				return Ok(actions);
			}
		}
	}

	/// Turns the store read-only. Idempotent.
	///
	/// Every registration that succeeded before this returns is visible in
	/// the sealed snapshot; every later one fails with
	/// [`ConfigurationError::Sealed`].
	pub fn seal(&self) {
		loop {
			let cur = self.snap.load_full();
			if cur.is_sealed() {
				return;
			}
			let prev = self.snap.compare_and_swap(&cur, Arc::new(cur.sealed()));
			if Arc::ptr_eq(&prev, &cur) {
				tracing::debug!(targets = cur.targets().count(), "transform store sealed");
				return;
			}
		}
	}

	pub fn is_sealed(&self) -> bool {
		self.snap.load().is_sealed()
	}

	/// Pins the current snapshot.
	pub fn snapshot(&self) -> Arc<StoreSnapshot<F>> {
		self.snap.load_full()
	}

	/// O(1) membership check the loader runs before any transformation work.
	#[inline]
	pub fn needs_transformation(&self, target: &Target) -> bool {
		self.snap.load().needs_transformation(target)
	}

	/// Returns true if any class, method or field of `owner` is targeted.
	#[inline]
	pub fn class_needs_transformation(&self, owner: &str) -> bool {
		self.snap.load().class_needs_transformation(owner)
	}

	/// Kinds with at least one registration.
	pub fn kinds(&self) -> Vec<TargetKind> {
		self.snap.load().kinds()
	}

	/// Ordered transformers for `target`; empty if none are registered.
	pub fn transformers_for(&self, target: &Target) -> Vec<AnyTransformer<F>> {
		self.snap.load().transformers_for(target)
	}

	pub fn class_transformers_for(&self, target: &Target) -> Vec<SharedTransformer<F::Class>> {
		self.snap.load().class_transformers_for(target).to_vec()
	}

	pub fn method_transformers_for(&self, target: &Target) -> Vec<SharedTransformer<F::Method>> {
		self.snap.load().method_transformers_for(target).to_vec()
	}

	pub fn field_transformers_for(&self, target: &Target) -> Vec<SharedTransformer<F::Field>> {
		self.snap.load().field_transformers_for(target).to_vec()
	}

	/// Diagnostics dump of the current snapshot.
	pub fn describe(&self) -> StoreDescription {
		self.snap.load().describe()
	}

	/// Applies the class sequence for `target`, which must be a class target.
	pub fn apply_class(&self, unit: F::Class, target: &Target, ctx: &ApplyContext<'_>) -> Result<F::Class, TransformationError> {
		expect_kind(target, TargetKind::Class)?;
		let snap = self.snap.load_full();
		apply::run(snap.class_transformers_for(target), unit, target, ctx)
	}

	pub fn apply_method(&self, unit: F::Method, target: &Target, ctx: &ApplyContext<'_>) -> Result<F::Method, TransformationError> {
		expect_kind(target, TargetKind::Method)?;
		let snap = self.snap.load_full();
		apply::run(snap.method_transformers_for(target), unit, target, ctx)
	}

	pub fn apply_field(&self, unit: F::Field, target: &Target, ctx: &ApplyContext<'_>) -> Result<F::Field, TransformationError> {
		expect_kind(target, TargetKind::Field)?;
		let snap = self.snap.load_full();
		apply::run(snap.field_transformers_for(target), unit, target, ctx)
	}

	/// Applies the sequence for `target` to a unit of matching kind.
	///
	/// The loader must load the returned unit, not the one it passed in.
	pub fn apply(&self, unit: AnyUnit<F>, target: &Target, ctx: &ApplyContext<'_>) -> Result<AnyUnit<F>, TransformationError> {
		expect_kind(target, unit.kind())?;
		match unit {
			AnyUnit::Class(c) => self.apply_class(c, target, ctx).map(AnyUnit::Class),
			AnyUnit::Method(m) => self.apply_method(m, target, ctx).map(AnyUnit::Method),
			AnyUnit::Field(f) => self.apply_field(f, target, ctx).map(AnyUnit::Field),
		}
	}
}

/// Rejects a unit of kind `unit` for `target` when the kinds differ.
fn expect_kind(target: &Target, unit: TargetKind) -> Result<(), TransformationError> {
	if target.kind() != unit {
		return Err(TransformationError::UnitKindMismatch {
			target: target.clone(),
			unit,
		});
	}
	Ok(())
}
