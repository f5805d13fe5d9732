//! Lookups the compiler consumes: sources, teams and monitors.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::issues::{AssetKind, IssueSink};
use crate::source::SourceDescriptor;

/// Read-only lookup of validated source descriptors.
pub trait SourceRegistry {
	fn resolve(&self, name: &str) -> Option<Arc<SourceDescriptor>>;

	/// Registered names, used for "did you mean" hints.
	fn names(&self) -> Vec<&str> {
		Vec::new()
	}
}

/// [`SourceRegistry`] backed by a hash map. The first registration of a name wins.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
	by_name: FxHashMap<Arc<str>, Arc<SourceDescriptor>>,
}

impl SourceCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `source` under its own name. Returns false if the name was taken.
	pub fn register(&mut self, source: SourceDescriptor) -> bool {
		let name: Arc<str> = Arc::from(source.name());
		if self.by_name.contains_key(&name) {
			tracing::warn!(source = %name, "source already registered; keeping first");
			return false;
		}
		self.by_name.insert(name, Arc::new(source));
		true
	}

	/// Builder form of [`Self::register`].
	pub fn with(mut self, source: SourceDescriptor) -> Self {
		self.register(source);
		self
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}

impl SourceRegistry for SourceCatalog {
	fn resolve(&self, name: &str) -> Option<Arc<SourceDescriptor>> {
		self.by_name.get(name).cloned()
	}

	fn names(&self) -> Vec<&str> {
		self.by_name.keys().map(|k| &**k).collect()
	}
}

/// A responsible team that can run administration duties and escalations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
	pub name: Arc<str>,
}

/// Read-only lookup of responsible teams.
pub trait TeamRegistry {
	fn resolve(&self, name: &str) -> Option<Arc<Team>>;

	fn names(&self) -> Vec<&str> {
		Vec::new()
	}
}

/// [`TeamRegistry`] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct TeamCatalog {
	by_name: FxHashMap<Arc<str>, Arc<Team>>,
}

impl TeamCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a team named `name`. Adding a name twice keeps the first team.
	pub fn with(mut self, name: &str) -> Self {
		let name: Arc<str> = Arc::from(name);
		self.by_name.entry(Arc::clone(&name)).or_insert_with(|| Arc::new(Team { name }));
		self
	}
}

impl TeamRegistry for TeamCatalog {
	fn resolve(&self, name: &str) -> Option<Arc<Team>> {
		self.by_name.get(name).cloned()
	}

	fn names(&self) -> Vec<&str> {
		self.by_name.keys().map(|k| &**k).collect()
	}
}

/// Handle to a timeout/liveness monitor backing asynchronous operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorHandle {
	pub id: u32,
	pub asset_kind: AssetKind,
	pub name: Arc<str>,
	pub suffix: Arc<str>,
}

impl fmt::Display for MonitorHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{} {} {}:{}", self.id, self.asset_kind, self.name, self.suffix)
	}
}

/// Creates monitors for assets that run asynchronous operations.
pub trait MonitorFactory {
	fn create(&self, asset_kind: AssetKind, name: &str, suffix: &str, issues: &mut dyn IssueSink) -> MonitorHandle;
}

/// [`MonitorFactory`] handing out sequential ids.
#[derive(Debug, Default)]
pub struct SequentialMonitors {
	next: AtomicU32,
}

impl SequentialMonitors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of monitors created so far.
	pub fn created(&self) -> u32 {
		self.next.load(Ordering::Relaxed)
	}
}

impl MonitorFactory for SequentialMonitors {
	fn create(&self, asset_kind: AssetKind, name: &str, suffix: &str, _issues: &mut dyn IssueSink) -> MonitorHandle {
		MonitorHandle {
			id: self.next.fetch_add(1, Ordering::Relaxed),
			asset_kind,
			name: Arc::from(name),
			suffix: Arc::from(suffix),
		}
	}
}
