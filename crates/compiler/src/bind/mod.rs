//! Binding of managed objects into scopes.
//!
//! # Mental Model
//!
//! Binding runs in phases over per-scope placeholder maps:
//!
//! 1. **Register:** [`scope_binder::bind_scope`] validates each binding configuration and
//!    registers a placeholder under its bound name at the next index of its scope.
//! 2. **Affix:** [`affix::affix_process_bindings`] adds process placeholders for managed
//!    sources that need callback flows and were not bound explicitly.
//! 3. **Link:** [`linker::link_scope`] resolves every dependency slot against the
//!    placeholder's own scope and then its ancestors.
//! 4. **Build:** [`factory::build_object`] runs each instance's build step.
//!
//! Because every placeholder of every scope is registered before anything is linked,
//! dependency order in the configuration does not matter.
//!
//! # Invariants
//!
//! - Bound names are unique per scope; the first declaration wins.
//! - Indices within a scope are assigned in registration order starting at 0, and a
//!   rejected declaration does not consume an index.
//! - A linked instance holds exactly one [`DependencyRef`] per declared dependency.
//! - A dependency never resolves into a nested scope: the linker only sees the current
//!   scope and its ancestors.
//!
//! [`DependencyRef`]: crate::graph::DependencyRef

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::DependencyMapping;
use crate::scope::Scope;
use crate::source::SourceDescriptor;

pub(crate) mod affix;
pub(crate) mod factory;
pub(crate) mod linker;
pub(crate) mod scope_binder;


/// How a placeholder came to be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
	Configured,
	Affixed,
}

/// An instance awaiting linking.
#[derive(Debug, Clone)]
pub(crate) struct PendingInstance {
	pub source: Arc<SourceDescriptor>,
	pub mappings: Vec<DependencyMapping>,
}

/// A registered bound name whose dependencies are not yet resolved.
#[derive(Debug, Clone)]
pub(crate) struct Placeholder {
	pub name: Arc<str>,
	pub scope: Scope,
	pub index: u32,
	pub origin: Origin,
	pub instances: Vec<PendingInstance>,
}

impl Placeholder {
	pub fn primary_source(&self) -> &SourceDescriptor {
		&self.instances[0].source
	}
}

/// Placeholders of one scope, keyed by bound name in registration order.
#[derive(Debug, Clone)]
pub(crate) struct ScopeBindings {
	pub scope: Scope,
	placeholders: IndexMap<Arc<str>, Placeholder>,
}

impl ScopeBindings {
	pub fn new(scope: Scope) -> Self {
		Self {
			scope,
			placeholders: IndexMap::new(),
		}
	}

	pub fn get(&self, name: &str) -> Option<&Placeholder> {
		self.placeholders.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.placeholders.contains_key(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Placeholder> + '_ {
		self.placeholders.values()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.placeholders.keys().map(|k| &**k)
	}

	pub fn len(&self) -> usize {
		self.placeholders.len()
	}

	/// Registers a placeholder at the next index. The caller must have checked
	/// that `name` is free.
	pub fn register(&mut self, name: Arc<str>, origin: Origin, instances: Vec<PendingInstance>) -> u32 {
		debug_assert!(!self.contains(&name), "placeholder '{name}' registered twice");
		let index = self.placeholders.len() as u32;
		self.placeholders.insert(
			Arc::clone(&name),
			Placeholder {
				name,
				scope: self.scope,
				index,
				origin,
				instances,
			},
		);
		index
	}
}

/// Read-only view of a scope's placeholders plus those of its ancestors.
pub(crate) struct ScopeView<'a> {
	current: &'a ScopeBindings,
	ancestors: &'a [&'a ScopeBindings],
}

impl<'a> ScopeView<'a> {
	/// `ancestors` must be ordered innermost first.
	pub fn new(current: &'a ScopeBindings, ancestors: &'a [&'a ScopeBindings]) -> Self {
		debug_assert!(ancestors.iter().zip(current.scope.ancestors()).all(|(b, s)| b.scope == s));
		Self { current, ancestors }
	}

	pub fn scope(&self) -> Scope {
		self.current.scope
	}

	pub fn current(&self) -> &'a ScopeBindings {
		self.current
	}

	/// Resolves `name` in the current scope, then each ancestor outward.
	pub fn resolve(&self, name: &str) -> Option<&'a Placeholder> {
		std::iter::once(self.current).chain(self.ancestors.iter().copied()).find_map(|b| b.get(name))
	}

	/// Every visible name, for suggestions.
	pub fn visible_names(&self) -> impl Iterator<Item = &'a str> + '_ {
		std::iter::once(self.current).chain(self.ancestors.iter().copied()).flat_map(|b| b.names())
	}
}
