//! Code-unit shapes the registry is generic over.
//!
//! The registry never looks inside a unit. [`UnitFamily`] only names the three
//! unit types a store transforms; [`ClassUnit`] and [`MemberUnit`] are the
//! extra surface the [`ClassPipeline`](crate::ClassPipeline) needs to walk a
//! class's members.

use std::fmt;

use weaver_primitives::TargetKind;

/// The three unit types one store works with.
pub trait UnitFamily: Send + Sync + 'static {
	type Class: Send + 'static;
	type Method: Send + 'static;
	type Field: Send + 'static;
}

/// A unit of any kind of the family `F`.
pub enum AnyUnit<F: UnitFamily> {
	Class(F::Class),
	Method(F::Method),
	Field(F::Field),
}

impl<F: UnitFamily> AnyUnit<F> {
	pub fn kind(&self) -> TargetKind {
		match self {
			Self::Class(_) => TargetKind::Class,
			Self::Method(_) => TargetKind::Method,
			Self::Field(_) => TargetKind::Field,
		}
	}

	pub fn into_class(self) -> Option<F::Class> {
		match self {
			Self::Class(c) => Some(c),
			_ => None,
		}
	}

	pub fn into_method(self) -> Option<F::Method> {
		match self {
			Self::Method(m) => Some(m),
			_ => None,
		}
	}

	pub fn into_field(self) -> Option<F::Field> {
		match self {
			Self::Field(f) => Some(f),
			_ => None,
		}
	}
}

impl<F: UnitFamily> fmt::Debug for AnyUnit<F>
where
	F::Class: fmt::Debug,
	F::Method: fmt::Debug,
	F::Field: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(c) => f.debug_tuple("Class").field(c).finish(),
			Self::Method(m) => f.debug_tuple("Method").field(m).finish(),
			Self::Field(x) => f.debug_tuple("Field").field(x).finish(),
		}
	}
}

/// A method or field as it appears inside a class.
pub trait MemberUnit {
	fn name(&self) -> &str;
	fn descriptor(&self) -> &str;
}

/// A class whose members can be taken out, transformed and put back.
pub trait ClassUnit {
	type Method: MemberUnit;
	type Field: MemberUnit;

	/// Class name, slashed or dotted.
	fn name(&self) -> &str;
	fn methods_mut(&mut self) -> &mut Vec<Self::Method>;
	fn fields_mut(&mut self) -> &mut Vec<Self::Field>;
}
