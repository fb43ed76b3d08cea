//! Core types for code-unit transformation: target descriptors and votes.

/// JVM-style member descriptor validation.
pub mod descriptor;
/// Target descriptors identifying classes, methods and fields.
pub mod target;
/// Three-valued vote a transformer casts per transformation attempt.
pub mod vote;

pub use descriptor::{DescriptorError, validate_field_descriptor, validate_method_descriptor};
pub use target::{InvalidTargetError, Target, TargetKind};
pub use vote::Vote;
