//! Validation for JVM-style type descriptors.
//!
//! Field types are one of the base tags `B C D F I J S Z`, an object type
//! `L<binary name>;`, or an array `[<field type>`. Method descriptors are
//! `(<field type>*)<field type>` where the return type may also be `V`.

use thiserror::Error;

/// Maximum number of array dimensions a single field type may declare.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Position and reason of the first malformed byte in a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason} at byte {position}")]
pub struct DescriptorError {
	/// Byte offset into the descriptor.
	pub position: usize,
	/// Static description of what was expected.
	pub reason: &'static str,
}

const fn err(position: usize, reason: &'static str) -> DescriptorError {
	DescriptorError { position, reason }
}

/// Validates a field descriptor such as `I`, `[J` or `Ljava/lang/String;`.
pub fn validate_field_descriptor(desc: &str) -> Result<(), DescriptorError> {
	let bytes = desc.as_bytes();
	let end = parse_field_type(bytes, 0)?;
	if end != bytes.len() {
		return Err(err(end, "trailing characters after field type"));
	}
	Ok(())
}

/// Validates a method descriptor such as `()V` or `(ILjava/lang/Object;)[B`.
pub fn validate_method_descriptor(desc: &str) -> Result<(), DescriptorError> {
	let bytes = desc.as_bytes();
	if bytes.first() != Some(&b'(') {
		return Err(err(0, "method descriptor must start with '('"));
	}

	let mut pos = 1;
	loop {
		match bytes.get(pos) {
			Some(b')') => {
				pos += 1;
				break;
			}
			Some(_) => pos = parse_field_type(bytes, pos)?,
			None => return Err(err(pos, "unterminated parameter list")),
		}
	}

	let end = match bytes.get(pos) {
		Some(b'V') => pos + 1,
		Some(_) => parse_field_type(bytes, pos)?,
		None => return Err(err(pos, "missing return type")),
	};
	if end != bytes.len() {
		return Err(err(end, "trailing characters after return type"));
	}
	Ok(())
}

/// Parses one field type starting at `start`, returning the offset just past it.
fn parse_field_type(bytes: &[u8], start: usize) -> Result<usize, DescriptorError> {
	let mut pos = start;
	while bytes.get(pos) == Some(&b'[') {
		pos += 1;
	}
	if pos - start > MAX_ARRAY_DIMENSIONS {
		return Err(err(start, "too many array dimensions"));
	}

	match bytes.get(pos) {
		Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => Ok(pos + 1),
		Some(b'L') => {
			let name_start = pos + 1;
			let Some(len) = bytes[name_start..].iter().position(|&b| b == b';') else {
				return Err(err(pos, "unterminated object type"));
			};
			let name = &bytes[name_start..name_start + len];
			if name.is_empty() {
				return Err(err(name_start, "empty class name"));
			}
			if let Some(bad) = name.iter().position(|b| matches!(b, b'.' | b'[' | b'(' | b')')) {
				return Err(err(name_start + bad, "illegal character in class name"));
			}
			if name.split(|&b| b == b'/').any(<[u8]>::is_empty) {
				return Err(err(name_start, "empty package segment in class name"));
			}
			Ok(name_start + len + 1)
		}
		Some(b'V') => Err(err(pos, "void is only valid as a method return type")),
		Some(_) => Err(err(pos, "unknown type tag")),
		None => Err(err(pos, "missing field type")),
	}
}
