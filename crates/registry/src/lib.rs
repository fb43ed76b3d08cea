#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Transformer registry and voting protocol for code-unit transformation.
//!
//! # Purpose
//!
//! Independent transformation services contribute [`Transformer`]s that declare
//! interest in exact [`Target`]s (classes, methods, fields). A
//! [`TransformStore`] indexes them by kind and target, and applies them in a
//! fixed, vote-gated order when the host loads a unit.
//!
//! # Mental Model
//!
//! 1. **Gather:** each [`ServiceDecorator`] enumerates one service's transformers and
//!    registers them. [`TransformationServices`] drives every decorator and isolates
//!    failing services.
//! 2. **Index:** [`TransformStore::register_transformer`] appends the transformer to one
//!    [`TransformList`] per kind, under every declared target, and updates the
//!    "needs transformation" sets in the same snapshot publication.
//! 3. **Seal:** the store turns read-only; lookups never block.
//! 4. **Apply:** the loader asks [`TransformStore::needs_transformation`], then folds the
//!    unit through the ordered sequence. Each transformer casts a [`Vote`]; `Yes`
//!    transforms, `No` skips, `Defer` retries once at the end of the attempt.
//!
//! # Concurrency
//!
//! - **Reads:** wait-free (atomic load of the current [`StoreSnapshot`]).
//! - **Writes:** lock-free with linearizability (CAS retry loop on registration).
//! - `apply` never mutates the store.
//!
//! # Invariants
//!
//! - Every key of a [`TransformList`] has the list's kind.
//!   - Enforced in: [`TransformList::register`].
//! - The target sets are never stale relative to the lists.
//!   - Enforced in: `StoreSnapshot::insert` (one snapshot per registration).
//! - Sequences never reorder and never hold the same transformer twice for one target.
//!   - Enforced in: [`TransformList::register`] under [`DuplicatePolicy`].
//! - Application terminates: a transformer defers at most once per attempt.
//!   - Enforced in: `store::apply::run`.

mod audit;
mod config;
mod context;
mod error;
mod list;
mod pipeline;
mod service;
mod store;
mod transformer;
mod units;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use audit::{Activity, AuditTrail, Outcome};
pub use config::{DuplicatePolicy, StoreConfig};
pub use context::{ApplyContext, LoadReason, VotePass, VotingContext};
pub use error::{
	BoxError, ConfigurationError, GatherError, InsertAction, PolicyViolation, ServiceGatherError,
	TransformationError,
};
pub use list::{TargetMap, TransformList};
pub use pipeline::ClassPipeline;
pub use service::{GatherReport, ServiceDecorator, TransformationService, TransformationServices};
pub use store::{StoreDescription, StoreSnapshot, TargetDescription, TransformStore};
pub use transformer::{AnyTransformer, SharedTransformer, Transformer};
pub use units::{AnyUnit, ClassUnit, MemberUnit, UnitFamily};
pub use weaver_primitives::{InvalidTargetError, Target, TargetKind, Vote};
