//! Managed-object binding and dependency-resolution compiler.
//!
//! Turns an [`OfficeConfig`] into an immutable [`OfficeGraph`]: managed objects
//! bound into process, thread and function scopes with every dependency
//! resolved to a `(scope, index)` slot, plus administrations and governance
//! resolved to indices.
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Register placeholders per scope | `bind::scope_binder` |
//! | Affix managed sources into process scope | `bind::affix` |
//! | Resolve dependency slots | `bind::linker` |
//! | Run source build steps | `bind::factory` |
//! | Bind administrations and governance | `admin` |
//!
//! Problems are reported through an [`IssueSink`] and the failing entity is
//! skipped, so one pass reports as much as possible. A graph is only fit for
//! runtime when the pass reported nothing; [`OfficeCompiler::compile_checked`]
//! enforces that.

mod admin;
mod bind;
pub mod config;
mod compiler;
mod error;
pub mod graph;
pub mod issues;
pub mod metadata;
pub mod registry;
mod scope;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use compiler::{OfficeCompiler, OfficeEnvironment};
pub use config::{AdministrationConfig, BindingConfig, DependencyMapping, InstanceConfig, ManagedSourceConfig, OfficeConfig};
pub use error::{CompileError, ConfigError, ConstructionError};
pub use graph::{AdministrationBinding, BoundObject, DependencyRef, GovernanceBinding, OfficeGraph, ScopeTable};
pub use issues::{AssetKind, Issue, IssueCategory, IssueCode, IssueLog, IssueSink};
pub use metadata::{BuildContext, ManagedObjectMetadata, MetadataBuilder, StandardBuilder};
pub use registry::{MonitorFactory, MonitorHandle, SequentialMonitors, SourceCatalog, SourceRegistry, Team, TeamCatalog, TeamRegistry};
pub use scope::Scope;
pub use source::{DependencyKey, SourceDescriptor};
pub use types::{TypeHierarchy, TypeName};
