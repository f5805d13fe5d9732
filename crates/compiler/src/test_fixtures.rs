//! Shared sources, types and a compile harness for unit tests.

use std::any::Any;
use std::time::Duration;

use crate::error::ConstructionError;
use crate::graph::OfficeGraph;
use crate::issues::IssueLog;
use crate::metadata::{BuildContext, ManagedObjectMetadata, MetadataBuilder};
use crate::registry::{SequentialMonitors, SourceCatalog, TeamCatalog};
use crate::source::SourceDescriptor;
use crate::types::TypeHierarchy;
use crate::{OfficeCompiler, OfficeConfig, OfficeEnvironment};

pub struct FailingBuilder;

impl MetadataBuilder for FailingBuilder {
	fn build(&self, _ctx: &mut BuildContext<'_>) -> Result<ManagedObjectMetadata, ConstructionError> {
		Err(ConstructionError::Failed("pool exhausted".into()))
	}
}

pub struct PanickingBuilder;

impl MetadataBuilder for PanickingBuilder {
	fn build(&self, _ctx: &mut BuildContext<'_>) -> Result<ManagedObjectMetadata, ConstructionError> {
		panic!("descriptor exploded")
	}
}

/// Drops the resolved dependencies, violating the build contract.
pub struct LossyBuilder;

impl MetadataBuilder for LossyBuilder {
	fn build(&self, ctx: &mut BuildContext<'_>) -> Result<ManagedObjectMetadata, ConstructionError> {
		let mut metadata = ctx.metadata();
		metadata.dependencies = Box::default();
		Ok(metadata)
	}
}

fn extract(_object: &(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>> {
	Some(Box::new(()))
}

pub fn types() -> TypeHierarchy {
	TypeHierarchy::new()
		.with("PooledConnection", ["Connection"])
		.with("Connection", ["Resource"])
		.with("Integer", ["Number"])
		.with("Transactional", ["Administrable"])
}

/// Sources used across tests:
///
/// | name | exposes | dependencies | capabilities |
/// |------|---------|--------------|--------------|
/// | `OFFICE_MO` | `Object` | none | none |
/// | `CONNECTION` | `Connection` | none | `Transactional` |
/// | `POOLED_CONNECTION` | `PooledConnection` | none | `Transactional` |
/// | `INTEGER` | `Integer` | none | none |
/// | `REPOSITORY` | `Repository` | `Connection` | `Transactional` |
/// | `KEYED_SERVICE` | `Service` | key 1 `Connection`, key 0 `Number` | none |
/// | `TIMED` | `Timer` | none | none, 5s timeout |
/// | `FAILING` / `PANICKING` | `Object` | none | none |
/// | `LOSSY` | `Object` | `Object` | none |
/// | `CALLBACK` | `Callback` | none | managed in process as `callback` |
/// | `CALLBACK_WITH_DEPS` | `Callback` | `Connection` | managed in process as `callback-deps` |
/// | `PASSIVE` | `Passive` | none | managed, no callback flows |
pub fn sources() -> SourceCatalog {
	SourceCatalog::new()
		.with(SourceDescriptor::new("OFFICE_MO", "Object"))
		.with(SourceDescriptor::new("CONNECTION", "Connection").with_capability("Transactional", extract))
		.with(SourceDescriptor::new("POOLED_CONNECTION", "PooledConnection").with_capability("Transactional", extract))
		.with(SourceDescriptor::new("INTEGER", "Integer"))
		.with(
			SourceDescriptor::new("REPOSITORY", "Repository")
				.with_dependency("Connection")
				.with_capability("Transactional", extract),
		)
		.with(
			SourceDescriptor::new("KEYED_SERVICE", "Service")
				.with_keyed_dependency(1, "Connection", "CONNECTION")
				.with_keyed_dependency(0, "Number", "LIMIT"),
		)
		.with(SourceDescriptor::new("TIMED", "Timer").with_timeout(Duration::from_secs(5)))
		.with(SourceDescriptor::new("FAILING", "Object").with_builder(FailingBuilder))
		.with(SourceDescriptor::new("PANICKING", "Object").with_builder(PanickingBuilder))
		.with(SourceDescriptor::new("LOSSY", "Object").with_dependency("Object").with_builder(LossyBuilder))
		.with(SourceDescriptor::new("CALLBACK", "Callback").with_managing_office("callback", true))
		.with(
			SourceDescriptor::new("CALLBACK_WITH_DEPS", "Callback")
				.with_dependency("Connection")
				.with_managing_office("callback-deps", true),
		)
		.with(SourceDescriptor::new("PASSIVE", "Passive").with_managing_office("passive", false))
}

pub fn teams() -> TeamCatalog {
	TeamCatalog::new().with("admin-team").with("escalation-team")
}

/// Owns every collaborator of a compile pass.
pub struct Harness {
	pub sources: SourceCatalog,
	pub teams: TeamCatalog,
	pub types: TypeHierarchy,
	pub monitors: SequentialMonitors,
}

impl Default for Harness {
	fn default() -> Self {
		Self {
			sources: sources(),
			teams: teams(),
			types: types(),
			monitors: SequentialMonitors::new(),
		}
	}
}

impl Harness {
	pub fn env(&self) -> OfficeEnvironment<'_> {
		OfficeEnvironment {
			sources: &self.sources,
			teams: &self.teams,
			types: &self.types,
			monitors: &self.monitors,
		}
	}

	pub fn compile(&self, config: &OfficeConfig) -> (OfficeGraph, IssueLog) {
		let mut log = IssueLog::new();
		let graph = OfficeCompiler::new(self.env()).compile(config, &mut log);
		(graph, log)
	}
}
