use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::{DescriptorError, validate_field_descriptor, validate_method_descriptor};

/// Kind of code unit a [`Target`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
	/// A whole class.
	Class,
	/// A method, qualified by owner, name and method descriptor.
	Method,
	/// A field, qualified by owner, name and field descriptor.
	Field,
}

impl TargetKind {
	/// Every kind, in registry order.
	pub const ALL: [TargetKind; 3] = [Self::Class, Self::Method, Self::Field];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Class => "class",
			Self::Method => "method",
			Self::Field => "field",
		}
	}

	/// Returns true for kinds that name a member of a class.
	pub const fn is_member(self) -> bool {
		!matches!(self, Self::Class)
	}
}

impl fmt::Display for TargetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors from the strict [`Target`] constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTargetError {
	#[error("empty owner name")]
	EmptyOwner,
	#[error("malformed owner name {owner:?}: {reason}")]
	MalformedOwner { owner: String, reason: &'static str },
	#[error("empty {kind} name on {owner}")]
	EmptyMemberName { kind: TargetKind, owner: String },
	#[error("malformed {kind} descriptor {descriptor:?}: {source}")]
	MalformedDescriptor {
		kind: TargetKind,
		descriptor: String,
		#[source]
		source: DescriptorError,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
struct Member {
	name: Box<str>,
	descriptor: Box<str>,
}

/// Immutable identifier of a transformable code unit.
///
/// Owner names are canonicalised to the dotted form, so `a/B` and `a.B` name
/// the same class. Equality, ordering and hashing are purely structural, which
/// makes targets suitable as registry keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Target {
	kind: TargetKind,
	owner: Box<str>,
	#[serde(flatten)]
	member: Option<Member>,
}

impl Target {
	/// Targets a whole class.
	pub fn class(owner: impl AsRef<str>) -> Self {
		Self {
			kind: TargetKind::Class,
			owner: canonical_owner(owner.as_ref()),
			member: None,
		}
	}

	/// Targets a method by owner, name and method descriptor.
	pub fn method(owner: impl AsRef<str>, name: impl Into<Box<str>>, descriptor: impl Into<Box<str>>) -> Self {
		Self::member(TargetKind::Method, owner.as_ref(), name.into(), descriptor.into())
	}

	/// Targets a field by owner, name and field descriptor.
	pub fn field(owner: impl AsRef<str>, name: impl Into<Box<str>>, descriptor: impl Into<Box<str>>) -> Self {
		Self::member(TargetKind::Field, owner.as_ref(), name.into(), descriptor.into())
	}

	/// Like [`Target::class`], rejecting malformed owner names.
	pub fn try_class(owner: impl AsRef<str>) -> Result<Self, InvalidTargetError> {
		validate_owner(owner.as_ref())?;
		Ok(Self::class(owner))
	}

	/// Like [`Target::method`], validating the owner, name and descriptor.
	pub fn try_method(owner: impl AsRef<str>, name: &str, descriptor: &str) -> Result<Self, InvalidTargetError> {
		let owner = owner.as_ref();
		validate_member(TargetKind::Method, owner, name, descriptor)?;
		Ok(Self::method(owner, name, descriptor))
	}

	/// Like [`Target::field`], validating the owner, name and descriptor.
	pub fn try_field(owner: impl AsRef<str>, name: &str, descriptor: &str) -> Result<Self, InvalidTargetError> {
		let owner = owner.as_ref();
		validate_member(TargetKind::Field, owner, name, descriptor)?;
		Ok(Self::field(owner, name, descriptor))
	}

	fn member(kind: TargetKind, owner: &str, name: Box<str>, descriptor: Box<str>) -> Self {
		Self {
			kind,
			owner: canonical_owner(owner),
			member: Some(Member { name, descriptor }),
		}
	}

	#[inline]
	pub fn kind(&self) -> TargetKind {
		self.kind
	}

	/// Canonical (dotted) owner class name.
	#[inline]
	pub fn owner(&self) -> &str {
		&self.owner
	}

	/// Member name for method and field targets.
	#[inline]
	pub fn member_name(&self) -> Option<&str> {
		self.member.as_ref().map(|m| &*m.name)
	}

	/// Member descriptor for method and field targets.
	#[inline]
	pub fn member_descriptor(&self) -> Option<&str> {
		self.member.as_ref().map(|m| &*m.descriptor)
	}

	/// Returns the class target of this target's owner.
	///
	/// For class targets this is a clone of `self`.
	pub fn owner_class(&self) -> Target {
		Self {
			kind: TargetKind::Class,
			owner: self.owner.clone(),
			member: None,
		}
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.member, self.kind) {
			(Some(m), TargetKind::Field) => write!(f, "{}::{}:{}", self.owner, m.name, m.descriptor),
			(Some(m), _) => write!(f, "{}::{}{}", self.owner, m.name, m.descriptor),
			(None, _) => f.write_str(&self.owner),
		}
	}
}

fn canonical_owner(owner: &str) -> Box<str> {
	if owner.contains('/') {
		owner.replace('/', ".").into_boxed_str()
	} else {
		owner.into()
	}
}

fn validate_owner(owner: &str) -> Result<(), InvalidTargetError> {
	if owner.is_empty() {
		return Err(InvalidTargetError::EmptyOwner);
	}
	let malformed = |reason| InvalidTargetError::MalformedOwner {
		owner: owner.to_owned(),
		reason,
	};
	if owner.contains([';', '[', '(', ')']) {
		return Err(malformed("owner contains a descriptor character"));
	}
	if owner.split(['.', '/']).any(str::is_empty) {
		return Err(malformed("owner contains an empty package segment"));
	}
	Ok(())
}

fn validate_member(kind: TargetKind, owner: &str, name: &str, descriptor: &str) -> Result<(), InvalidTargetError> {
	validate_owner(owner)?;
	if name.is_empty() {
		return Err(InvalidTargetError::EmptyMemberName {
			kind,
			owner: owner.to_owned(),
		});
	}
	let checked = match kind {
		TargetKind::Method => validate_method_descriptor(descriptor),
		_ => validate_field_descriptor(descriptor),
	};
	checked.map_err(|source| InvalidTargetError::MalformedDescriptor {
		kind,
		descriptor: descriptor.to_owned(),
		source,
	})
}
