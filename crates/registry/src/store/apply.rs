//! Vote-gated left fold of a unit through a transformer sequence.

use std::collections::VecDeque;

use weaver_primitives::{Target, Vote};

use crate::audit::{Activity, Outcome};
use crate::context::{ApplyContext, VotePass, VotingContext};
use crate::error::{PolicyViolation, TransformationError};
use crate::transformer::SharedTransformer;

/// Folds `unit` through `sequence` for `target`.
///
/// Each transformer is asked in order. `Yes` transforms and feeds the result
/// onward, `No` skips, `Defer` re-queues the transformer once at the back of
/// the remaining work. A second `Defer` is a policy violation resolved as `No`.
/// The attempt's history is flushed to the context's audit trail, including
/// on failure.
pub(crate) fn run<U>(
	sequence: &[SharedTransformer<U>],
	unit: U,
	target: &Target,
	ctx: &ApplyContext<'_>,
) -> Result<U, TransformationError> {
	if sequence.is_empty() {
		return Ok(unit);
	}

	let mut history = Vec::with_capacity(sequence.len());
	let result = fold(sequence, unit, target, ctx, &mut history);
	if let Some(audit) = ctx.audit() {
		audit.record(target, history);
	}
	result
}

fn fold<U>(
	sequence: &[SharedTransformer<U>],
	mut unit: U,
	target: &Target,
	ctx: &ApplyContext<'_>,
	history: &mut Vec<Activity>,
) -> Result<U, TransformationError> {
	let mut queue: VecDeque<(usize, VotePass)> = (0..sequence.len()).map(|idx| (idx, VotePass::Initial)).collect();

	while let Some((idx, pass)) = queue.pop_front() {
		let transformer = &sequence[idx];
		let label = transformer.label();
		let vote = transformer.cast_vote(&VotingContext::for_attempt(target, ctx, pass, history));
		tracing::trace!(unit = %target, transformer = label, %vote, ?pass, "vote cast");

		match (vote, pass) {
			(Vote::Yes, _) => {
				let vctx = VotingContext::for_attempt(target, ctx, pass, history);
				unit = match transformer.transform(unit, &vctx) {
					Ok(next) => next,
					Err(source) => {
						history.push(Activity::new(label, Outcome::Failed));
						return Err(TransformationError::Failed {
							target: target.clone(),
							transformer: label.to_owned(),
							source,
						});
					}
				};
				history.push(Activity::new(label, Outcome::Applied));
			}
			(Vote::No, _) => history.push(Activity::new(label, Outcome::Declined)),
			(Vote::Defer, VotePass::Initial) => {
				queue.push_back((idx, VotePass::Deferred));
				history.push(Activity::new(label, Outcome::Deferred));
			}
			(Vote::Defer, VotePass::Deferred) => {
				let violation = PolicyViolation::DeferredTwice {
					target: target.clone(),
					transformer: label.to_owned(),
				};
				tracing::warn!(%violation, "voting policy violation");
				history.push(Activity::new(label, Outcome::DeferredTwice));
			}
		}
	}

	Ok(unit)
}
