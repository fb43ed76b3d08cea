//! Immutable store views.
//!
//! # Role
//!
//! A [`StoreSnapshot`] is the unit of publication: registration clones the
//! current snapshot, extends it, and swaps it in whole. Lists and both target
//! sets therefore always agree.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;
use weaver_primitives::{Target, TargetKind};

use crate::config::DuplicatePolicy;
use crate::error::{ConfigurationError, InsertAction};
use crate::list::TransformList;
use crate::transformer::{AnyTransformer, SharedTransformer};
use crate::units::UnitFamily;

/// One published state of a [`TransformStore`](super::TransformStore).
pub struct StoreSnapshot<F: UnitFamily> {
	classes: Option<TransformList<F::Class>>,
	methods: Option<TransformList<F::Method>>,
	fields: Option<TransformList<F::Field>>,
	/// Union of every list's keys.
	needs: FxHashSet<Target>,
	/// Canonical owner names of every registered target.
	owners: FxHashSet<Box<str>>,
	/// Set once by [`TransformStore::seal`](super::TransformStore::seal); never cleared.
	sealed: bool,
}

impl<F: UnitFamily> Clone for StoreSnapshot<F> {
	fn clone(&self) -> Self {
		Self {
			classes: self.classes.clone(),
			methods: self.methods.clone(),
			fields: self.fields.clone(),
			needs: self.needs.clone(),
			owners: self.owners.clone(),
			sealed: self.sealed,
		}
	}
}

impl<F: UnitFamily> Default for StoreSnapshot<F> {
	fn default() -> Self {
		Self {
			classes: None,
			methods: None,
			fields: None,
			needs: FxHashSet::default(),
			owners: FxHashSet::default(),
			sealed: false,
		}
	}
}

impl<F: UnitFamily> StoreSnapshot<F> {
	/// Returns true if this snapshot is read-only.
	#[inline]
	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	/// Copy of this snapshot marked read-only.
	pub(super) fn sealed(&self) -> Self {
		Self {
			sealed: true,
			..self.clone()
		}
	}

	pub fn class_list(&self) -> Option<&TransformList<F::Class>> {
		self.classes.as_ref()
	}

	pub fn method_list(&self) -> Option<&TransformList<F::Method>> {
		self.methods.as_ref()
	}

	pub fn field_list(&self) -> Option<&TransformList<F::Field>> {
		self.fields.as_ref()
	}

	/// Kinds with at least one registration.
	pub fn kinds(&self) -> Vec<TargetKind> {
		TargetKind::ALL
			.into_iter()
			.filter(|kind| match kind {
				TargetKind::Class => self.classes.is_some(),
				TargetKind::Method => self.methods.is_some(),
				TargetKind::Field => self.fields.is_some(),
			})
			.collect()
	}

	#[inline]
	pub fn needs_transformation(&self, target: &Target) -> bool {
		self.needs.contains(target)
	}

	/// Returns true if any target owned by `owner` (slashed or dotted) is registered.
	#[inline]
	pub fn class_needs_transformation(&self, owner: &str) -> bool {
		if owner.contains('/') {
			self.owners.contains(owner.replace('/', ".").as_str())
		} else {
			self.owners.contains(owner)
		}
	}

	/// Every registered target, in no particular order.
	pub fn targets(&self) -> impl Iterator<Item = &Target> + '_ {
		self.needs.iter()
	}

	pub fn class_transformers_for(&self, target: &Target) -> &[SharedTransformer<F::Class>] {
		self.classes.as_ref().map_or(&[], |l| l.transformers_for(target))
	}

	pub fn method_transformers_for(&self, target: &Target) -> &[SharedTransformer<F::Method>] {
		self.methods.as_ref().map_or(&[], |l| l.transformers_for(target))
	}

	pub fn field_transformers_for(&self, target: &Target) -> &[SharedTransformer<F::Field>] {
		self.fields.as_ref().map_or(&[], |l| l.transformers_for(target))
	}

	/// Ordered sequence for `target`, dispatched on the target's kind.
	pub fn transformers_for(&self, target: &Target) -> Vec<AnyTransformer<F>> {
		match target.kind() {
			TargetKind::Class => self
				.class_transformers_for(target)
				.iter()
				.cloned()
				.map(AnyTransformer::Class)
				.collect(),
			TargetKind::Method => self
				.method_transformers_for(target)
				.iter()
				.cloned()
				.map(AnyTransformer::Method)
				.collect(),
			TargetKind::Field => self
				.field_transformers_for(target)
				.iter()
				.cloned()
				.map(AnyTransformer::Field)
				.collect(),
		}
	}

	/// Indexes `transformer` under every target in `targets`.
	///
	/// On error `self` may be partially updated; callers discard it.
	pub(super) fn insert(
		&mut self,
		transformer: &AnyTransformer<F>,
		targets: &[Target],
		policy: DuplicatePolicy,
	) -> Result<Vec<InsertAction>, ConfigurationError> {
		let mut actions = Vec::with_capacity(targets.len());
		for target in targets {
			let action = match transformer {
				AnyTransformer::Class(t) => self
					.classes
					.get_or_insert_with(|| TransformList::new(TargetKind::Class))
					.register(target.clone(), t.clone(), policy)?,
				AnyTransformer::Method(t) => self
					.methods
					.get_or_insert_with(|| TransformList::new(TargetKind::Method))
					.register(target.clone(), t.clone(), policy)?,
				AnyTransformer::Field(t) => self
					.fields
					.get_or_insert_with(|| TransformList::new(TargetKind::Field))
					.register(target.clone(), t.clone(), policy)?,
			};
			self.needs.insert(target.clone());
			if !self.owners.contains(target.owner()) {
				self.owners.insert(Box::from(target.owner()));
			}
			actions.push(action);
		}
		Ok(actions)
	}

	/// Serializable view of every list, for diagnostics.
	pub fn describe(&self) -> StoreDescription {
		let mut lists = BTreeMap::new();
		if let Some(l) = &self.classes {
			lists.insert(TargetKind::Class, describe_list(l));
		}
		if let Some(l) = &self.methods {
			lists.insert(TargetKind::Method, describe_list(l));
		}
		if let Some(l) = &self.fields {
			lists.insert(TargetKind::Field, describe_list(l));
		}
		let mut owners: Vec<String> = self.owners.iter().map(|o| o.to_string()).collect();
		owners.sort();
		StoreDescription { lists, owners }
	}
}

fn describe_list<U>(list: &TransformList<U>) -> Vec<TargetDescription> {
	list.transformers()
		.iter()
		.map(|(target, sequence)| TargetDescription {
			target: target.clone(),
			transformers: sequence.iter().map(|t| t.label().to_owned()).collect(),
		})
		.collect()
}

/// Diagnostics dump of a snapshot: kind → targets in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDescription {
	pub lists: BTreeMap<TargetKind, Vec<TargetDescription>>,
	/// Owner classes with at least one registered target, sorted.
	pub owners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescription {
	pub target: Target,
	/// Transformer labels in application order.
	pub transformers: Vec<String>,
}
