//! Build step turning a linked placeholder instance into runtime metadata.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConstructionError;
use crate::graph::DependencyRef;
use crate::issues::{AssetKind, IssueSink};
use crate::registry::{MonitorFactory, MonitorHandle};
use crate::scope::Scope;
use crate::source::SourceDescriptor;
use crate::types::TypeName;

/// Immutable runtime metadata for one instance of a bound managed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObjectMetadata {
	pub bound_name: Arc<str>,
	pub scope: Scope,
	pub index: u32,
	pub instance: usize,
	pub source_name: Arc<str>,
	pub object_type: TypeName,
	pub dependencies: Box<[DependencyRef]>,
	pub timeout: Option<Duration>,
	pub monitor: Option<MonitorHandle>,
}

/// Inputs handed to a [`MetadataBuilder`].
pub struct BuildContext<'a> {
	bound_name: &'a Arc<str>,
	scope: Scope,
	index: u32,
	instance: usize,
	source: &'a SourceDescriptor,
	dependencies: &'a [DependencyRef],
	monitors: &'a dyn MonitorFactory,
	issues: &'a mut dyn IssueSink,
}

impl<'a> BuildContext<'a> {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn new(
		bound_name: &'a Arc<str>,
		scope: Scope,
		index: u32,
		instance: usize,
		source: &'a SourceDescriptor,
		dependencies: &'a [DependencyRef],
		monitors: &'a dyn MonitorFactory,
		issues: &'a mut dyn IssueSink,
	) -> Self {
		Self {
			bound_name,
			scope,
			index,
			instance,
			source,
			dependencies,
			monitors,
			issues,
		}
	}

	pub fn bound_name(&self) -> &str {
		self.bound_name
	}

	pub fn scope(&self) -> Scope {
		self.scope
	}

	pub fn index(&self) -> u32 {
		self.index
	}

	pub fn source(&self) -> &SourceDescriptor {
		self.source
	}

	pub fn dependencies(&self) -> &[DependencyRef] {
		self.dependencies
	}

	/// Creates a monitor attributed to this managed object.
	pub fn create_monitor(&mut self, suffix: &str) -> MonitorHandle {
		self.monitors.create(AssetKind::ManagedObject, self.bound_name, suffix, &mut *self.issues)
	}

	/// Metadata with every field derived from the context and no monitor.
	pub fn metadata(&self) -> ManagedObjectMetadata {
		ManagedObjectMetadata {
			bound_name: Arc::clone(self.bound_name),
			scope: self.scope,
			index: self.index,
			instance: self.instance,
			source_name: Arc::from(self.source.name()),
			object_type: self.source.object_type().clone(),
			dependencies: self.dependencies.into(),
			timeout: self.source.timeout(),
			monitor: None,
		}
	}
}

/// Build step of a source descriptor.
pub trait MetadataBuilder: Send + Sync {
	fn build(&self, ctx: &mut BuildContext<'_>) -> Result<ManagedObjectMetadata, ConstructionError>;
}

/// Default build step: context-derived metadata, plus a monitor when the
/// source declares a non-zero timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBuilder;

impl MetadataBuilder for StandardBuilder {
	fn build(&self, ctx: &mut BuildContext<'_>) -> Result<ManagedObjectMetadata, ConstructionError> {
		let mut metadata = ctx.metadata();
		if metadata.timeout.is_some_and(|t| !t.is_zero()) {
			metadata.monitor = Some(ctx.create_monitor("operations"));
		}
		Ok(metadata)
	}
}
