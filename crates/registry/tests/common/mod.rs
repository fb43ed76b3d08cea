//! Common utilities for registry integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use weaver_registry::{
	AnyTransformer, BoxError, ClassUnit, MemberUnit, Target, TransformStore, TransformationService, Transformer,
	UnitFamily, Vote, VotingContext,
};

/// Minimal tree-shaped code units.
pub struct Tree;

impl UnitFamily for Tree {
	type Class = ClassNode;
	type Method = MethodNode;
	type Field = FieldNode;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassNode {
	pub name: String,
	pub methods: Vec<MethodNode>,
	pub fields: Vec<FieldNode>,
	pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodNode {
	pub name: String,
	pub desc: String,
	pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldNode {
	pub name: String,
	pub desc: String,
	pub trace: Vec<String>,
}

impl ClassNode {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			..Self::default()
		}
	}

	pub fn method(mut self, name: &str, desc: &str) -> Self {
		self.methods.push(MethodNode::new(name, desc));
		self
	}

	pub fn field(mut self, name: &str, desc: &str) -> Self {
		self.fields.push(FieldNode {
			name: name.to_owned(),
			desc: desc.to_owned(),
			trace: Vec::new(),
		});
		self
	}
}

impl MethodNode {
	pub fn new(name: &str, desc: &str) -> Self {
		Self {
			name: name.to_owned(),
			desc: desc.to_owned(),
			trace: Vec::new(),
		}
	}
}

impl MemberUnit for MethodNode {
	fn name(&self) -> &str {
		&self.name
	}

	fn descriptor(&self) -> &str {
		&self.desc
	}
}

impl MemberUnit for FieldNode {
	fn name(&self) -> &str {
		&self.name
	}

	fn descriptor(&self) -> &str {
		&self.desc
	}
}

impl ClassUnit for ClassNode {
	type Method = MethodNode;
	type Field = FieldNode;

	fn name(&self) -> &str {
		&self.name
	}

	fn methods_mut(&mut self) -> &mut Vec<MethodNode> {
		&mut self.methods
	}

	fn fields_mut(&mut self) -> &mut Vec<FieldNode> {
		&mut self.fields
	}
}

/// Units that keep a trace of the transformers applied to them.
pub trait Traced {
	fn trace_mut(&mut self) -> &mut Vec<String>;
}

impl Traced for ClassNode {
	fn trace_mut(&mut self) -> &mut Vec<String> {
		&mut self.trace
	}
}

impl Traced for MethodNode {
	fn trace_mut(&mut self) -> &mut Vec<String> {
		&mut self.trace
	}
}

impl Traced for FieldNode {
	fn trace_mut(&mut self) -> &mut Vec<String> {
		&mut self.trace
	}
}

type VoteFn = dyn Fn(&VotingContext<'_>) -> Vote + Send + Sync;

/// Transformer whose vote is a closure and whose transform appends its label.
pub struct Tracer {
	label: String,
	targets: Vec<Target>,
	vote: Box<VoteFn>,
}

impl Tracer {
	pub fn new(label: &str, targets: impl IntoIterator<Item = Target>) -> Self {
		Self {
			label: label.to_owned(),
			targets: targets.into_iter().collect(),
			vote: Box::new(|_| Vote::Yes),
		}
	}

	pub fn voting(mut self, vote: impl Fn(&VotingContext<'_>) -> Vote + Send + Sync + 'static) -> Self {
		self.vote = Box::new(vote);
		self
	}
}

impl<U: Traced> Transformer<U> for Tracer {
	fn label(&self) -> &str {
		&self.label
	}

	fn targets(&self) -> Vec<Target> {
		self.targets.clone()
	}

	fn cast_vote(&self, ctx: &VotingContext<'_>) -> Vote {
		(self.vote)(ctx)
	}

	fn transform(&self, mut unit: U, _ctx: &VotingContext<'_>) -> Result<U, BoxError> {
		unit.trace_mut().push(self.label.clone());
		Ok(unit)
	}
}

/// Returns its input unchanged.
pub struct Identity(pub Vec<Target>);

impl<U> Transformer<U> for Identity {
	fn label(&self) -> &str {
		"identity"
	}

	fn targets(&self) -> Vec<Target> {
		self.0.clone()
	}

	fn cast_vote(&self, _ctx: &VotingContext<'_>) -> Vote {
		Vote::Yes
	}

	fn transform(&self, unit: U, _ctx: &VotingContext<'_>) -> Result<U, BoxError> {
		Ok(unit)
	}
}

/// Service backed by a fixed transformer list, or a fixed failure.
pub struct FixedService {
	pub name: String,
	pub transformers: Result<Vec<AnyTransformer<Tree>>, String>,
}

impl FixedService {
	pub fn ok(name: &str, transformers: Vec<AnyTransformer<Tree>>) -> Self {
		Self {
			name: name.to_owned(),
			transformers: Ok(transformers),
		}
	}

	pub fn err(name: &str, message: &str) -> Self {
		Self {
			name: name.to_owned(),
			transformers: Err(message.to_owned()),
		}
	}
}

impl TransformationService<Tree> for FixedService {
	fn name(&self) -> &str {
		&self.name
	}

	fn transformers(&self) -> Result<Vec<AnyTransformer<Tree>>, BoxError> {
		self.transformers.clone().map_err(BoxError::from)
	}
}

/// Fresh store with tracing enabled.
pub fn store() -> Arc<TransformStore<Tree>> {
	let _ = tracing_subscriber::fmt::try_init();
	Arc::new(TransformStore::new())
}

/// Labels registered for `target`, in application order.
pub fn labels(store: &TransformStore<Tree>, target: &Target) -> Vec<String> {
	store
		.transformers_for(target)
		.iter()
		.map(|t| t.label().to_owned())
		.collect()
}
