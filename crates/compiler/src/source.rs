//! Managed-object source descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::metadata::{MetadataBuilder, StandardBuilder};
use crate::types::{TypeHierarchy, TypeName};

/// Addressing of a dependency slot declared by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKey {
	/// Addressed by a key variant's ordinal.
	Keyed(u32),
	/// Addressed by sequence position.
	Indexed(usize),
}

impl fmt::Display for DependencyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Keyed(k) => write!(f, "key {k}"),
			Self::Indexed(i) => write!(f, "index {i}"),
		}
	}
}

/// A dependency slot declared by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
	pub key: DependencyKey,
	pub required_type: TypeName,
	pub label: Option<Arc<str>>,
}

/// Extracts a capability view from a runtime object instance.
pub type ExtensionFactory = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// A secondary type exposed by instances of a source.
#[derive(Clone)]
pub struct CapabilityDescriptor {
	pub capability: TypeName,
	pub extractor: ExtensionFactory,
}

impl fmt::Debug for CapabilityDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CapabilityDescriptor").field("capability", &self.capability).finish_non_exhaustive()
	}
}

/// Declares that a source must be managed by an office, optionally with
/// callback flows into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagingOfficeRequirement {
	pub needs_callback_flows: bool,
	pub process_bound_name: Arc<str>,
}

/// A validated managed-object source, registered under a stable name.
#[derive(Clone)]
pub struct SourceDescriptor {
	name: Arc<str>,
	object_type: TypeName,
	dependencies: Vec<DependencyDescriptor>,
	capabilities: Vec<CapabilityDescriptor>,
	managing_office: Option<ManagingOfficeRequirement>,
	timeout: Option<Duration>,
	builder: Arc<dyn MetadataBuilder>,
}

impl SourceDescriptor {
	/// Creates a descriptor for `name` exposing `object_type`, with no dependencies or
	/// capabilities and the [`StandardBuilder`] build step.
	pub fn new(name: impl AsRef<str>, object_type: impl Into<TypeName>) -> Self {
		Self {
			name: Arc::from(name.as_ref()),
			object_type: object_type.into(),
			dependencies: Vec::new(),
			capabilities: Vec::new(),
			managing_office: None,
			timeout: None,
			builder: Arc::new(StandardBuilder),
		}
	}

	/// Declares a dependency addressed by its sequence position.
	pub fn with_dependency(mut self, required_type: impl Into<TypeName>) -> Self {
		let key = DependencyKey::Indexed(self.dependencies.len());
		self.dependencies.push(DependencyDescriptor {
			key,
			required_type: required_type.into(),
			label: None,
		});
		self
	}

	/// Declares a dependency addressed by a key ordinal.
	pub fn with_keyed_dependency(mut self, ordinal: u32, required_type: impl Into<TypeName>, label: &str) -> Self {
		self.dependencies.push(DependencyDescriptor {
			key: DependencyKey::Keyed(ordinal),
			required_type: required_type.into(),
			label: Some(Arc::from(label)),
		});
		self
	}

	/// Adds a capability of type `capability`, extracted from instances by `extractor`.
	pub fn with_capability<F>(mut self, capability: impl Into<TypeName>, extractor: F) -> Self
	where
		F: Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync + 'static,
	{
		self.capabilities.push(CapabilityDescriptor {
			capability: capability.into(),
			extractor: Arc::new(extractor),
		});
		self
	}

	/// Requires a managing office; with callback flows the source is affixed into
	/// process scope as `process_bound_name`.
	pub fn with_managing_office(mut self, process_bound_name: &str, needs_callback_flows: bool) -> Self {
		self.managing_office = Some(ManagingOfficeRequirement {
			needs_callback_flows,
			process_bound_name: Arc::from(process_bound_name),
		});
		self
	}

	/// Sets the default timeout of the source's asynchronous operations.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Replaces the build step.
	pub fn with_builder(mut self, builder: impl MetadataBuilder + 'static) -> Self {
		self.builder = Arc::new(builder);
		self
	}

	/// Registered name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Type exposed by instances, checked against dependency requirements.
	pub fn object_type(&self) -> &TypeName {
		&self.object_type
	}

	/// Declared dependency slots, in slot order.
	pub fn dependencies(&self) -> &[DependencyDescriptor] {
		&self.dependencies
	}

	/// Declared capabilities, in match order.
	pub fn capabilities(&self) -> &[CapabilityDescriptor] {
		&self.capabilities
	}

	pub fn managing_office(&self) -> Option<&ManagingOfficeRequirement> {
		self.managing_office.as_ref()
	}

	/// Default timeout, if any.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	/// Build step run for every bound instance.
	pub fn builder(&self) -> &dyn MetadataBuilder {
		&*self.builder
	}

	/// First capability whose type is-a `requested`.
	pub fn capability_for(&self, requested: &TypeName, types: &TypeHierarchy) -> Option<&CapabilityDescriptor> {
		self.capabilities.iter().find(|c| types.is_assignable(&c.capability, requested))
	}
}

impl fmt::Debug for SourceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SourceDescriptor")
			.field("name", &self.name)
			.field("object_type", &self.object_type)
			.field("dependencies", &self.dependencies)
			.field("capabilities", &self.capabilities)
			.field("managing_office", &self.managing_office)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}
