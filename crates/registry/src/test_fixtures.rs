//! Unit family and scripted transformers shared by unit tests.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use weaver_primitives::{Target, Vote};

use crate::context::VotingContext;
use crate::error::BoxError;
use crate::transformer::Transformer;
use crate::units::{ClassUnit, MemberUnit, UnitFamily};

pub(crate) struct TestUnits;

impl UnitFamily for TestUnits {
	type Class = ClassNode;
	type Method = MethodNode;
	type Field = FieldNode;
}

/// Units that remember which transformers touched them.
pub(crate) trait Marked {
	fn marks_mut(&mut self) -> &mut Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ClassNode {
	pub name: String,
	pub methods: Vec<MethodNode>,
	pub fields: Vec<FieldNode>,
	pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct MethodNode {
	pub name: String,
	pub descriptor: String,
	pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct FieldNode {
	pub name: String,
	pub descriptor: String,
	pub marks: Vec<String>,
}

impl ClassNode {
	pub fn named(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			..Self::default()
		}
	}

	pub fn with_method(mut self, name: &str, descriptor: &str) -> Self {
		self.methods.push(MethodNode::new(name, descriptor));
		self
	}

	pub fn with_field(mut self, name: &str, descriptor: &str) -> Self {
		self.fields.push(FieldNode::new(name, descriptor));
		self
	}
}

impl MethodNode {
	pub fn new(name: &str, descriptor: &str) -> Self {
		Self {
			name: name.to_owned(),
			descriptor: descriptor.to_owned(),
			marks: Vec::new(),
		}
	}
}

impl FieldNode {
	pub fn new(name: &str, descriptor: &str) -> Self {
		Self {
			name: name.to_owned(),
			descriptor: descriptor.to_owned(),
			marks: Vec::new(),
		}
	}
}

impl Marked for ClassNode {
	fn marks_mut(&mut self) -> &mut Vec<String> {
		&mut self.marks
	}
}

impl Marked for MethodNode {
	fn marks_mut(&mut self) -> &mut Vec<String> {
		&mut self.marks
	}
}

impl Marked for FieldNode {
	fn marks_mut(&mut self) -> &mut Vec<String> {
		&mut self.marks
	}
}

impl MemberUnit for MethodNode {
	fn name(&self) -> &str {
		&self.name
	}

	fn descriptor(&self) -> &str {
		&self.descriptor
	}
}

impl MemberUnit for FieldNode {
	fn name(&self) -> &str {
		&self.name
	}

	fn descriptor(&self) -> &str {
		&self.descriptor
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

/// Transformer that votes from a script and appends its label to the unit.
///
/// The last scripted vote repeats once the script is exhausted.
pub(crate) struct Marker<U> {
	label: &'static str,
	targets: Vec<Target>,
	votes: Vec<Vote>,
	failure: Option<&'static str>,
	vote_calls: AtomicUsize,
	transform_calls: AtomicUsize,
	_unit: PhantomData<fn(U) -> U>,
}

impl<U> Marker<U> {
	pub fn new(label: &'static str, targets: impl IntoIterator<Item = Target>) -> Self {
		Self {
			label,
			targets: targets.into_iter().collect(),
			votes: vec![Vote::Yes],
			failure: None,
			vote_calls: AtomicUsize::new(0),
			transform_calls: AtomicUsize::new(0),
			_unit: PhantomData,
		}
	}

	pub fn votes(mut self, votes: impl IntoIterator<Item = Vote>) -> Self {
		self.votes = votes.into_iter().collect();
		self
	}

	pub fn failing(mut self, message: &'static str) -> Self {
		self.failure = Some(message);
		self
	}

	pub fn vote_calls(&self) -> usize {
		self.vote_calls.load(Ordering::SeqCst)
	}

	pub fn transform_calls(&self) -> usize {
		self.transform_calls.load(Ordering::SeqCst)
	}
}

impl<U: Marked> Transformer<U> for Marker<U> {
	fn label(&self) -> &str {
		self.label
	}

	fn targets(&self) -> Vec<Target> {
		self.targets.clone()
	}

	fn cast_vote(&self, _ctx: &VotingContext<'_>) -> Vote {
		let n = self.vote_calls.fetch_add(1, Ordering::SeqCst);
		self.votes
			.get(n)
			.or(self.votes.last())
			.copied()
			.unwrap_or(Vote::Yes)
	}

	fn transform(&self, mut unit: U, _ctx: &VotingContext<'_>) -> Result<U, BoxError> {
		self.transform_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(message) = self.failure {
			return Err(message.into());
		}
		unit.marks_mut().push(self.label.to_owned());
		Ok(unit)
	}
}
