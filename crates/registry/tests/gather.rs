//! Service gathering end to end.

#![allow(unused_crate_dependencies)]

mod common;

use common::{ClassNode, FixedService, Identity, MethodNode, Tracer, Tree, labels, store};
use pretty_assertions::assert_eq;
use weaver_registry::{
	AnyTransformer, ApplyContext, ConfigurationError, GatherError, ServiceDecorator, Target, TargetKind,
	TransformationServices,
};

#[test]
fn gathers_class_and_method_transformers() {
	let store = store();
	let class_transformer = AnyTransformer::<Tree>::class(Identity(vec![Target::class("cheese.Puffs")]));
	let method_transformer =
		AnyTransformer::<Tree>::method(Identity(vec![Target::method("cheesy.PuffMethod", "fish", "()V")]));
	let decorator = ServiceDecorator::new(FixedService::ok(
		"mock",
		vec![class_transformer.clone(), method_transformer.clone()],
	));

	decorator.gather_transformers(&store).unwrap();

	let snap = store.snapshot();
	assert_eq!(snap.kinds(), [TargetKind::Class, TargetKind::Method]);
	let classes = snap.class_list().unwrap();
	assert!(
		classes
			.transformers()
			.values()
			.flatten()
			.all(|t| AnyTransformer::<Tree>::Class(t.clone()).ptr_eq(&class_transformer))
	);
	let methods = snap.method_list().unwrap();
	assert!(
		methods
			.transformers()
			.values()
			.flatten()
			.all(|t| AnyTransformer::<Tree>::Method(t.clone()).ptr_eq(&method_transformer))
	);
	assert!(store.class_needs_transformation("cheese.Puffs"));
	assert!(store.class_needs_transformation("cheesy.PuffMethod"));
}

#[test]
fn services_contribute_in_order_and_failures_are_isolated() {
	let store = store();
	let m = Target::method("a.B", "m", "()V");
	let mut services = TransformationServices::new();
	services
		.add(FixedService::ok(
			"s1",
			vec![
				AnyTransformer::class(Identity(vec![Target::class("a.B")])),
				AnyTransformer::method(Tracer::new("s1.m", [m.clone()])),
			],
		))
		.unwrap();
	services.add(FixedService::err("s3", "missing resources")).unwrap();
	services
		.add(FixedService::ok("s2", vec![AnyTransformer::method(Tracer::new("s2.m", [m.clone()]))]))
		.unwrap();

	let report = services.gather_all(&store).unwrap();

	assert_eq!(report.transformer_count(), 3);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].service(), "s3");
	assert_eq!(labels(&store, &Target::class("a.B")), ["identity"]);
	assert_eq!(labels(&store, &m), ["s1.m", "s2.m"]);
	assert!(store.is_sealed());

	let class = ClassNode::new("a.B").method("m", "()V");
	let out = store
		.apply_class(class.clone(), &Target::class("a.B"), &ApplyContext::default())
		.unwrap();
	assert_eq!(out, class);

	let out = store
		.apply_method(MethodNode::new("m", "()V"), &m, &ApplyContext::default())
		.unwrap();
	assert_eq!(out.trace, ["s1.m", "s2.m"]);
}

#[test]
fn service_contributing_a_duplicate_aborts_startup() {
	let store = store();
	let shared = AnyTransformer::<Tree>::method(Tracer::new("shared", [Target::method("a.B", "m", "()V")]));
	let mut services = TransformationServices::new();
	services.add(FixedService::ok("first", vec![shared.clone()])).unwrap();
	services.add(FixedService::ok("second", vec![shared])).unwrap();

	match services.gather_all(&store).unwrap_err() {
		GatherError::Configuration { service, source } => {
			assert_eq!(service, "second");
			assert!(matches!(source, ConfigurationError::DuplicateRegistration { .. }));
		}
		other => panic!("unexpected error: {other}"),
	}
	assert_eq!(labels(&store, &Target::method("a.B", "m", "()V")), ["shared"]);
}

#[test]
fn registration_after_gathering_is_refused() {
	let store = store();
	TransformationServices::new()
		.gather_all(&store)
		.unwrap();

	let err = store
		.register_transformer(AnyTransformer::class(Identity(vec![Target::class("a.B")])))
		.unwrap_err();
	assert_eq!(
		err,
		ConfigurationError::Sealed {
			transformer: "identity".to_owned()
		}
	);
}
