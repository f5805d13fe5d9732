//! End-to-end compilation of offices loaded from TOML.
//!
//! These tests only use the public API: a catalog of sources, a team catalog,
//! a type hierarchy and a monitor factory wired into an [`OfficeCompiler`].

use std::any::Any;
use std::time::Duration;

use mooring_compiler::{
	CompileError, DependencyRef, IssueCode, OfficeCompiler, OfficeConfig, OfficeEnvironment, Scope, SequentialMonitors, SourceCatalog,
	SourceDescriptor, TeamCatalog, TypeHierarchy,
};

fn transactional(object: &(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>> {
	object.downcast_ref::<u32>().map(|id| Box::new(*id) as Box<dyn Any + Send + Sync>)
}

fn catalog() -> SourceCatalog {
	SourceCatalog::new()
		.with(SourceDescriptor::new("POOL", "ConnectionPool").with_timeout(Duration::from_secs(30)))
		.with(
			SourceDescriptor::new("REPOSITORY", "Repository")
				.with_dependency("Pool")
				.with_capability("Transactional", transactional),
		)
		.with(
			SourceDescriptor::new("CACHED_REPOSITORY", "Repository")
				.with_keyed_dependency(0, "Pool", "POOL")
				.with_capability("Transactional", transactional),
		)
		.with(SourceDescriptor::new("REQUEST", "Request").with_dependency("Repository"))
		.with(SourceDescriptor::new("HTTP_SERVER", "Server").with_managing_office("http", true))
}

fn types() -> TypeHierarchy {
	TypeHierarchy::new().with("ConnectionPool", ["Pool"])
}

const ORDERS: &str = r#"
	name = "orders"
	governances = ["transaction", "audit"]

	[[managed_sources]]
	source = "HTTP_SERVER"

	[[function]]
	name = "request"
	source = "REQUEST"
	dependencies = [{ target = "repository" }]

	[[thread]]
	name = "repository"
	source = "REPOSITORY"
	dependencies = [{ target = "pool" }]

	[[thread.alternates]]
	source = "CACHED_REPOSITORY"
	dependencies = [{ key = 0, target = "pool" }]

	[[process]]
	name = "pool"
	source = "POOL"

	[[administrations]]
	name = "tx"
	factory = "TransactionAdministration"
	capability = "Transactional"
	administers = ["repository"]
	governance = [{ index = 0, name = "audit" }, { index = 1, name = "transaction" }]
	team = "workers"
	timeout_ms = 500
"#;

#[test]
fn orders_office_compiles_cleanly() {
	let sources = catalog();
	let teams = TeamCatalog::new().with("workers");
	let types = types();
	let monitors = SequentialMonitors::new();
	let env = OfficeEnvironment {
		sources: &sources,
		teams: &teams,
		types: &types,
		monitors: &monitors,
	};

	let config = OfficeConfig::from_toml_str(ORDERS).unwrap();
	let graph = OfficeCompiler::new(env).compile_checked(&config).unwrap();

	assert_eq!(graph.name(), "orders");
	assert_eq!(graph.object_count(), 4);

	let http = graph.table(Scope::Process).get_by_name("http").unwrap();
	assert_eq!(http.slot(), DependencyRef::new(Scope::Process, 1));

	let request = graph.lookup(Scope::Function, "request").unwrap();
	let repository = graph.resolve(request.dependencies()[0]).unwrap();
	assert_eq!(repository.name(), "repository");
	assert_eq!(repository.instances().len(), 2);
	for instance in repository.instances() {
		assert_eq!(&*instance.metadata.dependencies, &[DependencyRef::new(Scope::Process, 0)]);
	}
	assert!(graph.lookup(Scope::Process, "repository").is_none());

	let tx = graph.administration("tx").unwrap();
	assert_eq!(&*tx.governance, &[Some(1), Some(0)]);
	assert_eq!(tx.timeout, Duration::from_millis(500));
	let extracted = (tx.administered[0].extractors[0])(&7u32).unwrap();
	assert_eq!(extracted.downcast_ref::<u32>(), Some(&7));

	// pool timeout plus administration timeout
	assert_eq!(monitors.created(), 2);
}

#[test]
fn broken_office_reports_every_problem() {
	let sources = catalog();
	let teams = TeamCatalog::new();
	let types = types();
	let monitors = SequentialMonitors::new();
	let env = OfficeEnvironment {
		sources: &sources,
		teams: &teams,
		types: &types,
		monitors: &monitors,
	};

	let config = OfficeConfig::from_toml_str(&ORDERS.replace(r#"target = "repository""#, r#"target = "NOT AVAILABLE""#)).unwrap();
	let err = OfficeCompiler::new(env).compile_checked(&config).unwrap_err();

	let CompileError::Issues { office, issues } = &err;
	assert_eq!(office, "orders");
	let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
	assert_eq!(codes, vec![IssueCode::UnknownDependencyTarget, IssueCode::UnknownTeam]);
	assert!(err.to_string().contains("2 issue(s)"));
}
