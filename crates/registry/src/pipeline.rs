//! Loader-facing driver that transforms a class and its members in one pass.

use std::sync::Arc;

use weaver_primitives::Target;

use crate::context::ApplyContext;
use crate::error::TransformationError;
use crate::store::{TransformStore, apply_sequence};
use crate::units::{ClassUnit, MemberUnit, UnitFamily};

/// Runs every applicable transformer over a class about to be loaded.
///
/// Fields go first, then methods, then the class itself, so class
/// transformers see fully transformed members. All three passes read the
/// same store snapshot.
pub struct ClassPipeline<F: UnitFamily> {
	store: Arc<TransformStore<F>>,
}

impl<F: UnitFamily> Clone for ClassPipeline<F> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
		}
	}
}

impl<F: UnitFamily> ClassPipeline<F> {
	pub fn new(store: Arc<TransformStore<F>>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &TransformStore<F> {
		&self.store
	}
}

impl<F> ClassPipeline<F>
where
	F: UnitFamily,
	F::Class: ClassUnit<Method = F::Method, Field = F::Field>,
	F::Method: MemberUnit,
	F::Field: MemberUnit,
{
	/// Returns the unit the loader must define in place of `class`.
	///
	/// Classes with no registered target come back untouched. The first
	/// [`TransformationError`] aborts the whole class.
	pub fn transform_class(&self, mut class: F::Class, ctx: &ApplyContext<'_>) -> Result<F::Class, TransformationError> {
		let snap = self.store.snapshot();
		let owner = class.name().replace('/', ".");
		if !snap.class_needs_transformation(&owner) {
			return Ok(class);
		}

		let fields = std::mem::take(class.fields_mut());
		let mut transformed = Vec::with_capacity(fields.len());
		for field in fields {
			let target = Target::field(&owner, field.name(), field.descriptor());
			transformed.push(apply_sequence(snap.field_transformers_for(&target), field, &target, ctx)?);
		}
		*class.fields_mut() = transformed;

		let methods = std::mem::take(class.methods_mut());
		let mut transformed = Vec::with_capacity(methods.len());
		for method in methods {
			let target = Target::method(&owner, method.name(), method.descriptor());
			transformed.push(apply_sequence(snap.method_transformers_for(&target), method, &target, ctx)?);
		}
		*class.methods_mut() = transformed;

		let target = Target::class(&owner);
		let class = apply_sequence(snap.class_transformers_for(&target), class, &target, ctx)?;
		tracing::trace!(class = %owner, "class pipeline complete");
		Ok(class)
	}
}
