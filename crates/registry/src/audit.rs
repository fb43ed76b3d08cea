//! Record of what happened to each target during application.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use weaver_primitives::Target;

/// How one transformer was resolved within one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
	/// Voted yes and transformed the unit.
	Applied,
	/// Voted no.
	Declined,
	/// Voted defer; re-queued to the end of the attempt.
	Deferred,
	/// Voted defer on its retry; resolved as no.
	DeferredTwice,
	/// Voted yes but the transformation failed.
	Failed,
}

/// One entry of an attempt's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
	pub transformer: String,
	pub outcome: Outcome,
}

impl Activity {
	pub fn new(transformer: impl Into<String>, outcome: Outcome) -> Self {
		Self {
			transformer: transformer.into(),
			outcome,
		}
	}
}

/// Thread-safe log of activities per target, shared across loads.
///
/// Attempts on the same target append in completion order. The trail never
/// evicts: entries live until [`take`](Self::take) or [`clear`](Self::clear).
/// The host that passes a trail to [`ApplyContext::with_audit`] owns it, and
/// should either drain each class once its load completes or scope one trail
/// per load.
///
/// [`ApplyContext::with_audit`]: crate::ApplyContext::with_audit
#[derive(Debug, Default)]
pub struct AuditTrail {
	entries: Mutex<FxHashMap<Target, Vec<Activity>>>,
}

impl AuditTrail {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn record(&self, target: &Target, activities: Vec<Activity>) {
		if activities.is_empty() {
			return;
		}
		let mut entries = self.entries.lock();
		match entries.get_mut(target) {
			Some(existing) => existing.extend(activities),
			None => {
				entries.insert(target.clone(), activities);
			}
		}
	}

	/// All activities recorded for `target`.
	pub fn activities(&self, target: &Target) -> Vec<Activity> {
		self.entries.lock().get(target).cloned().unwrap_or_default()
	}

	/// Labels of transformers that transformed `target`, in application order.
	pub fn applied(&self, target: &Target) -> Vec<String> {
		self.entries
			.lock()
			.get(target)
			.map(|log| {
				log.iter()
					.filter(|a| a.outcome == Outcome::Applied)
					.map(|a| a.transformer.clone())
					.collect()
			})
			.unwrap_or_default()
	}

	/// Removes and returns the activities recorded for `target`.
	pub fn take(&self, target: &Target) -> Vec<Activity> {
		self.entries.lock().remove(target).unwrap_or_default()
	}

	/// Audited targets, sorted.
	pub fn targets(&self) -> Vec<Target> {
		let mut targets: Vec<_> = self.entries.lock().keys().cloned().collect();
		targets.sort();
		targets
	}

	/// Compact one-line rendering, e.g. `a.B: widen=applied, log=declined`.
	pub fn summary(&self, target: &Target) -> String {
		let entries = self.entries.lock();
		let Some(log) = entries.get(target) else {
			return format!("{target}: <none>");
		};
		let parts: Vec<String> = log
			.iter()
			.map(|a| {
				let outcome = match a.outcome {
					Outcome::Applied => "applied",
					Outcome::Declined => "declined",
					Outcome::Deferred => "deferred",
					Outcome::DeferredTwice => "deferred_twice",
					Outcome::Failed => "failed",
				};
				format!("{}={outcome}", a.transformer)
			})
			.collect();
		format!("{target}: {}", parts.join(", "))
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}
}
