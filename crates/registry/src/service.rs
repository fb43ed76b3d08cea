//! Transformation services and the handler that gathers them into a store.
//!
//! # Role
//!
//! A [`TransformationService`] is a third-party contributor of transformers.
//! Its [`ServiceDecorator`] enumerates and registers them, catching enumeration
//! failures and panics so one broken service cannot take the others down.
//! [`TransformationServices`] drives every decorator in insertion order.
//!
//! # Failure isolation
//!
//! - Enumeration errors and panics become [`ServiceGatherError`]s. They are
//!   logged, collected into the [`GatherReport`], and the next service runs.
//!   Panics from a transformer's `label` or `targets` count as enumeration
//!   panics: every declaration is resolved before the first registration, so
//!   such a service contributes nothing.
//! - Registration errors are [`ConfigurationError`]s: the store would be
//!   ambiguous, so gathering stops and the error is returned.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;

use crate::error::{BoxError, ConfigurationError, GatherError, ServiceGatherError};
use weaver_primitives::Target;

use crate::store::TransformStore;
use crate::transformer::AnyTransformer;
use crate::units::UnitFamily;

/// A named source of transformers.
pub trait TransformationService<F: UnitFamily>: Send + Sync {
	/// Unique name, used in logs and error reports.
	fn name(&self) -> &str;

	/// Enumerates the transformers this service contributes.
	fn transformers(&self) -> Result<Vec<AnyTransformer<F>>, BoxError>;
}

/// Wraps one service and registers its transformers.
pub struct ServiceDecorator<F: UnitFamily> {
	service: Box<dyn TransformationService<F>>,
}

impl<F: UnitFamily> ServiceDecorator<F> {
	pub fn new(service: impl TransformationService<F> + 'static) -> Self {
		Self::from_boxed(Box::new(service))
	}

	pub fn from_boxed(service: Box<dyn TransformationService<F>>) -> Self {
		Self { service }
	}

	pub fn name(&self) -> &str {
		self.service.name()
	}

	/// Enumerates the service's transformers and registers each into `store`.
	///
	/// Returns how many transformers were registered.
	pub fn gather_transformers(&self, store: &TransformStore<F>) -> Result<usize, GatherError> {
		let name = self.name();
		let declared = self.enumerate()?;
		let count = declared.len();

		for (transformer, targets) in declared {
			store
				.register_declared(transformer, targets)
				.map_err(|source| GatherError::Configuration {
					service: name.to_owned(),
					source,
				})?;
		}

		tracing::debug!(service = name, transformers = count, "gathered service");
		Ok(count)
	}

	/// Runs all service-provided code up front: enumeration plus each
	/// transformer's declaration.
	fn enumerate(&self) -> Result<Vec<(AnyTransformer<F>, Vec<Target>)>, ServiceGatherError> {
		let service = self.name().to_owned();
		let resolve = || {
			self.service.transformers().map(|transformers| {
				transformers
					.into_iter()
					.map(|transformer| {
						let _ = transformer.label();
						let targets = transformer.targets();
						(transformer, targets)
					})
					.collect::<Vec<_>>()
			})
		};
		match panic::catch_unwind(AssertUnwindSafe(resolve)) {
			Ok(Ok(declared)) => Ok(declared),
			Ok(Err(source)) => Err(ServiceGatherError::Enumeration { service, source }),
			Err(payload) => Err(ServiceGatherError::Panicked {
				service,
				message: panic_message(payload.as_ref()),
			}),
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_owned()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_owned()
	}
}

/// Outcome of [`TransformationServices::gather_all`].
#[derive(Debug, Default)]
pub struct GatherReport {
	/// `(service, transformers registered)` in gather order.
	pub gathered: Vec<(String, usize)>,
	/// Services that failed to enumerate and were skipped.
	pub failures: Vec<ServiceGatherError>,
}

impl GatherReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}

	/// Total transformers registered across all services.
	pub fn transformer_count(&self) -> usize {
		self.gathered.iter().map(|(_, n)| n).sum()
	}
}

/// Handler over every known service.
pub struct TransformationServices<F: UnitFamily> {
	decorators: Vec<ServiceDecorator<F>>,
	seen: FxHashSet<String>,
}

impl<F: UnitFamily> Default for TransformationServices<F> {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: UnitFamily> TransformationServices<F> {
	pub fn new() -> Self {
		Self {
			decorators: Vec::new(),
			seen: FxHashSet::default(),
		}
	}

	/// Adds a service. Names must be unique.
	pub fn add(&mut self, service: impl TransformationService<F> + 'static) -> Result<(), ConfigurationError> {
		self.add_boxed(Box::new(service))
	}

	pub fn add_boxed(&mut self, service: Box<dyn TransformationService<F>>) -> Result<(), ConfigurationError> {
		let decorator = ServiceDecorator::from_boxed(service);
		if !self.seen.insert(decorator.name().to_owned()) {
			return Err(ConfigurationError::DuplicateService {
				service: decorator.name().to_owned(),
			});
		}
		self.decorators.push(decorator);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.decorators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decorators.is_empty()
	}

	/// Service names in gather order.
	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.decorators.iter().map(ServiceDecorator::name)
	}

	/// Gathers every service into `store`, then seals it if configured to.
	///
	/// The store is left unsealed when a configuration error aborts gathering.
	pub fn gather_all(&self, store: &TransformStore<F>) -> Result<GatherReport, GatherError> {
		let mut report = GatherReport::default();

		for decorator in &self.decorators {
			match decorator.gather_transformers(store) {
				Ok(count) => report.gathered.push((decorator.name().to_owned(), count)),
				Err(GatherError::Service(err)) => {
					tracing::error!(service = err.service(), error = %err, "transformation service skipped");
					report.failures.push(err);
				}
				Err(err @ GatherError::Configuration { .. }) => return Err(err),
			}
		}

		if store.config().seal_after_gather {
			store.seal();
		}

		tracing::info!(
			services = report.gathered.len(),
			failed = report.failures.len(),
			transformers = report.transformer_count(),
			"transformation services gathered"
		);
		Ok(report)
	}
}
