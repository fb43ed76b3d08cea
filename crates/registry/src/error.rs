use thiserror::Error;
use weaver_primitives::{Target, TargetKind};

/// Boxed cause carried by transformer and service failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a successful transformer insertion for one target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
	/// Transformer appended to the target's sequence.
	Appended,
	/// Same transformer already present for the target; kept as is.
	KeptExisting,
}

/// Registration-time errors. Any of these leaves the registry ambiguous, so
/// startup must abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
	/// A transformer declared an empty target set.
	#[error("transformer {transformer} declares no targets")]
	NoTargets { transformer: String },
	/// A transformer declared a target of another kind than the units it transforms.
	#[error("{expected} transformer {transformer} declares {} target {target}", .target.kind())]
	KindMismatch {
		transformer: String,
		expected: TargetKind,
		target: Target,
	},
	/// The same transformer instance was registered twice for one target.
	#[error("transformer {transformer} is already registered for {target}")]
	DuplicateRegistration { transformer: String, target: Target },
	/// Two services share a name.
	#[error("duplicate transformation service {service:?}")]
	DuplicateService { service: String },
	/// Registration attempted after the store was sealed.
	#[error("store is sealed; cannot register {transformer}")]
	Sealed { transformer: String },
}

/// One service failed to enumerate its transformers.
///
/// Isolated per service: the remaining services still register.
#[derive(Debug, Error)]
pub enum ServiceGatherError {
	#[error("service {service:?} failed to enumerate transformers: {source}")]
	Enumeration {
		service: String,
		#[source]
		source: BoxError,
	},
	#[error("service {service:?} panicked while enumerating transformers: {message}")]
	Panicked { service: String, message: String },
}

impl ServiceGatherError {
	/// Name of the service that failed.
	pub fn service(&self) -> &str {
		match self {
			Self::Enumeration { service, .. } | Self::Panicked { service, .. } => service,
		}
	}
}

/// Failure while gathering one service into a store.
#[derive(Debug, Error)]
pub enum GatherError {
	#[error(transparent)]
	Service(#[from] ServiceGatherError),
	#[error("service {service:?} contributed an invalid transformer: {source}")]
	Configuration {
		service: String,
		#[source]
		source: ConfigurationError,
	},
}

/// A transformer could not produce a unit. Fatal for that unit's load only.
#[derive(Debug, Error)]
pub enum TransformationError {
	#[error("transformer {transformer} failed on {target}: {source}")]
	Failed {
		target: Target,
		transformer: String,
		#[source]
		source: BoxError,
	},
	#[error("cannot transform {target} with a {unit} unit")]
	UnitKindMismatch { target: Target, unit: TargetKind },
}

impl TransformationError {
	/// Target whose load must be aborted.
	pub fn target(&self) -> &Target {
		match self {
			Self::Failed { target, .. } | Self::UnitKindMismatch { target, .. } => target,
		}
	}
}

/// Voting policy breach. Logged and downgraded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
	#[error("transformer {transformer} deferred twice on {target}; resolved as no")]
	DeferredTwice { target: Target, transformer: String },
}
