//! The resolved office graph handed to the execution engine.
//!
//! Everything here is immutable once a pass completes and is shared behind
//! `Arc`, so worker threads can read it concurrently without locking. All
//! cross references are plain `(scope, index)` pairs into the scope tables.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::metadata::ManagedObjectMetadata;
use crate::registry::{MonitorHandle, Team};
use crate::scope::Scope;
use crate::source::{ExtensionFactory, SourceDescriptor};
use crate::types::TypeName;

/// Slot of a bound object: its scope table and index within that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyRef {
	pub scope: Scope,
	pub index: u32,
}

impl DependencyRef {
	pub const fn new(scope: Scope, index: u32) -> Self {
		Self { scope, index }
	}
}

impl fmt::Display for DependencyRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}[{}]", self.scope, self.index)
	}
}

/// One physical instance backing a bound name.
#[derive(Debug, Clone)]
pub struct BoundInstance {
	pub source: Arc<SourceDescriptor>,
	pub metadata: ManagedObjectMetadata,
}

/// A managed object bound into a scope with all dependencies resolved.
#[derive(Debug, Clone)]
pub struct BoundObject {
	name: Arc<str>,
	slot: DependencyRef,
	instances: Box<[BoundInstance]>,
}

impl BoundObject {
	/// `instances` must be non-empty.
	pub(crate) fn new(name: Arc<str>, slot: DependencyRef, instances: Box<[BoundInstance]>) -> Self {
		debug_assert!(!instances.is_empty(), "bound object '{name}' has no instances");
		Self { name, slot, instances }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn scope(&self) -> Scope {
		self.slot.scope
	}

	pub fn index(&self) -> u32 {
		self.slot.index
	}

	pub fn slot(&self) -> DependencyRef {
		self.slot
	}

	pub fn instances(&self) -> &[BoundInstance] {
		&self.instances
	}

	/// The primary instance.
	pub fn primary(&self) -> &BoundInstance {
		&self.instances[0]
	}

	pub fn source(&self) -> &SourceDescriptor {
		&self.primary().source
	}

	pub fn metadata(&self) -> &ManagedObjectMetadata {
		&self.primary().metadata
	}

	/// Resolved dependencies of the primary instance.
	pub fn dependencies(&self) -> &[DependencyRef] {
		&self.primary().metadata.dependencies
	}
}

/// Bound objects of one scope, addressable by index and by name.
#[derive(Debug, Clone)]
pub struct ScopeTable {
	scope: Scope,
	objects: Arc<[BoundObject]>,
	by_name: Arc<FxHashMap<Arc<str>, usize>>,
}

impl ScopeTable {
	pub(crate) fn new(scope: Scope, mut objects: Vec<BoundObject>) -> Self {
		objects.sort_by_key(BoundObject::index);
		let by_name = objects.iter().enumerate().map(|(pos, o)| (Arc::clone(&o.name), pos)).collect();
		Self {
			scope,
			objects: objects.into(),
			by_name: Arc::new(by_name),
		}
	}

	pub fn scope(&self) -> Scope {
		self.scope
	}

	/// Object bound at `index`.
	///
	/// O(1) for a clean pass, where indices are dense.
	pub fn get(&self, index: u32) -> Option<&BoundObject> {
		match self.objects.get(index as usize) {
			Some(o) if o.index() == index => Some(o),
			_ => self
				.objects
				.binary_search_by_key(&index, BoundObject::index)
				.ok()
				.map(|pos| &self.objects[pos]),
		}
	}

	pub fn get_by_name(&self, name: &str) -> Option<&BoundObject> {
		self.by_name.get(name).map(|&pos| &self.objects[pos])
	}

	pub fn objects(&self) -> &[BoundObject] {
		&self.objects
	}

	pub fn iter(&self) -> impl Iterator<Item = &BoundObject> + '_ {
		self.objects.iter()
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}
}

/// Office-wide governance and its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceBinding {
	pub name: Arc<str>,
	pub index: u32,
}

/// A bound object under administration, with one capability extractor per instance.
#[derive(Clone)]
pub struct AdministeredObject {
	pub bound_name: Arc<str>,
	pub slot: DependencyRef,
	pub extractors: Box<[ExtensionFactory]>,
}

impl fmt::Debug for AdministeredObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdministeredObject")
			.field("bound_name", &self.bound_name)
			.field("slot", &self.slot)
			.field("extractors", &self.extractors.len())
			.finish()
	}
}

/// Routes failures of a type to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
	pub handles: TypeName,
	pub team: Arc<Team>,
}

/// An administration attached to bound objects through a shared capability.
#[derive(Debug, Clone)]
pub struct AdministrationBinding {
	pub name: Arc<str>,
	pub factory: Arc<str>,
	pub capability: TypeName,
	pub administered: Box<[AdministeredObject]>,
	/// Dense, indexed by the administration's own governance index. `None`
	/// marks an index that failed to resolve.
	pub governance: Box<[Option<u32>]>,
	pub team: Option<Arc<Team>>,
	pub timeout: Duration,
	pub monitor: Option<MonitorHandle>,
	pub escalations: Box<[Escalation]>,
}

/// Resolved runtime graph of an office.
#[derive(Debug, Clone)]
pub struct OfficeGraph {
	pub(crate) name: Arc<str>,
	pub(crate) process: ScopeTable,
	pub(crate) thread: ScopeTable,
	pub(crate) function: ScopeTable,
	pub(crate) administrations: Arc<[AdministrationBinding]>,
	pub(crate) governances: Arc<[GovernanceBinding]>,
}

impl OfficeGraph {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn table(&self, scope: Scope) -> &ScopeTable {
		match scope {
			Scope::Process => &self.process,
			Scope::Thread => &self.thread,
			Scope::Function => &self.function,
		}
	}

	/// Dereferences a slot.
	pub fn resolve(&self, slot: DependencyRef) -> Option<&BoundObject> {
		self.table(slot.scope).get(slot.index)
	}

	/// Looks up `name` as seen from `scope`, innermost scope first.
	pub fn lookup(&self, scope: Scope, name: &str) -> Option<&BoundObject> {
		Scope::ALL
			.into_iter()
			.rev()
			.filter(|&s| scope.can_see(s))
			.find_map(|s| self.table(s).get_by_name(name))
	}

	pub fn administrations(&self) -> &[AdministrationBinding] {
		&self.administrations
	}

	pub fn administration(&self, name: &str) -> Option<&AdministrationBinding> {
		self.administrations.iter().find(|a| &*a.name == name)
	}

	pub fn governances(&self) -> &[GovernanceBinding] {
		&self.governances
	}

	/// Number of bound objects across all scopes.
	pub fn object_count(&self) -> usize {
		Scope::ALL.iter().map(|&s| self.table(s).len()).sum()
	}
}
