//! Office configuration objects.
//!
//! These are the unresolved inputs of a compile pass: plain names that the
//! compiler turns into indices. They can be built programmatically or
//! deserialized, for example with [`OfficeConfig::from_toml_str`].

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scope::Scope;
use crate::source::DependencyKey;

/// Complete configuration of one office.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfficeConfig {
	pub name: String,
	pub process: Vec<BindingConfig>,
	pub thread: Vec<BindingConfig>,
	pub function: Vec<BindingConfig>,
	/// Sources this office manages, checked for process affixing.
	pub managed_sources: Vec<ManagedSourceConfig>,
	/// Office governances, in index order.
	pub governances: Vec<String>,
	pub administrations: Vec<AdministrationConfig>,
}

impl OfficeConfig {
	/// Empty office configuration named `name`.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			..Self::default()
		}
	}

	/// Parses an office from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses the TOML file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&input)
	}

	/// Binding configurations declared for `scope`, in declaration order.
	pub fn bindings(&self, scope: Scope) -> &[BindingConfig] {
		match scope {
			Scope::Process => &self.process,
			Scope::Thread => &self.thread,
			Scope::Function => &self.function,
		}
	}

	/// Appends `binding` to `scope`.
	pub fn bind(mut self, scope: Scope, binding: BindingConfig) -> Self {
		match scope {
			Scope::Process => self.process.push(binding),
			Scope::Thread => self.thread.push(binding),
			Scope::Function => self.function.push(binding),
		}
		self
	}

	/// Appends a managed source.
	pub fn manage(mut self, managed: ManagedSourceConfig) -> Self {
		self.managed_sources.push(managed);
		self
	}

	/// Appends an office governance at the next index.
	pub fn governance(mut self, name: &str) -> Self {
		self.governances.push(name.to_string());
		self
	}

	/// Appends an administration.
	pub fn administer(mut self, administration: AdministrationConfig) -> Self {
		self.administrations.push(administration);
		self
	}
}

/// Binds a source into a scope under a name.
///
/// `source` and `dependencies` describe the primary instance. Each entry of
/// `alternates` adds another instance backing the same bound name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
	pub name: String,
	pub source: String,
	#[serde(default)]
	pub dependencies: Vec<DependencyMapping>,
	#[serde(default)]
	pub alternates: Vec<InstanceConfig>,
}

impl BindingConfig {
	/// Binds `name` to `source` with no dependency mappings or alternates.
	pub fn new(name: &str, source: &str) -> Self {
		Self {
			name: name.to_string(),
			source: source.to_string(),
			..Self::default()
		}
	}

	/// Maps the next sequential dependency slot to `target`.
	pub fn depends_on(mut self, target: &str) -> Self {
		self.dependencies.push(DependencyMapping::positional(target));
		self
	}

	/// Maps the dependency slot keyed by `key` to `target`.
	pub fn depends_on_key(mut self, key: u32, target: &str) -> Self {
		self.dependencies.push(DependencyMapping::keyed(key, target));
		self
	}

	/// Adds another instance backing this bound name.
	pub fn alternate(mut self, instance: InstanceConfig) -> Self {
		self.alternates.push(instance);
		self
	}

	/// Every instance, primary first, as `(source, dependencies)`.
	pub fn instances(&self) -> impl Iterator<Item = (&str, &[DependencyMapping])> + '_ {
		std::iter::once((self.source.as_str(), self.dependencies.as_slice()))
			.chain(self.alternates.iter().map(|i| (i.source.as_str(), i.dependencies.as_slice())))
	}
}

/// An additional instance backing a bound name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
	pub source: String,
	#[serde(default)]
	pub dependencies: Vec<DependencyMapping>,
}

impl InstanceConfig {
	pub fn new(source: &str) -> Self {
		Self {
			source: source.to_string(),
			dependencies: Vec::new(),
		}
	}

	pub fn depends_on(mut self, target: &str) -> Self {
		self.dependencies.push(DependencyMapping::positional(target));
		self
	}
}

/// Maps one dependency slot to a bound name.
///
/// With `key` set the mapping addresses a keyed slot, with `index` set it
/// addresses a sequence position, and with neither it takes its position in
/// the mapping list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyMapping {
	#[serde(default)]
	pub key: Option<u32>,
	#[serde(default)]
	pub index: Option<usize>,
	pub target: String,
}

impl DependencyMapping {
	/// Mapping that takes its position in the mapping list.
	pub fn positional(target: &str) -> Self {
		Self {
			target: target.to_string(),
			..Self::default()
		}
	}

	/// Mapping addressing the slot keyed by `key`.
	pub fn keyed(key: u32, target: &str) -> Self {
		Self {
			key: Some(key),
			index: None,
			target: target.to_string(),
		}
	}

	/// Mapping addressing the slot at sequence position `index`.
	pub fn indexed(index: usize, target: &str) -> Self {
		Self {
			key: None,
			index: Some(index),
			target: target.to_string(),
		}
	}

	/// Slot addressed by this mapping when it sits at `position` in its list.
	/// `None` if both `key` and `index` are set.
	pub fn address(&self, position: usize) -> Option<DependencyKey> {
		match (self.key, self.index) {
			(Some(key), None) => Some(DependencyKey::Keyed(key)),
			(None, Some(index)) => Some(DependencyKey::Indexed(index)),
			(None, None) => Some(DependencyKey::Indexed(position)),
			(Some(_), Some(_)) => None,
		}
	}
}

/// A source the office manages, with mappings for its dependencies should it
/// have to be affixed into process scope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagedSourceConfig {
	pub source: String,
	#[serde(default)]
	pub dependencies: Vec<DependencyMapping>,
}

impl ManagedSourceConfig {
	pub fn new(source: &str) -> Self {
		Self {
			source: source.to_string(),
			dependencies: Vec::new(),
		}
	}

	pub fn depends_on(mut self, target: &str) -> Self {
		self.dependencies.push(DependencyMapping::positional(target));
		self
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdministrationConfig {
	pub name: String,
	#[serde(default)]
	pub factory: Option<String>,
	#[serde(default)]
	pub capability: Option<String>,
	#[serde(default)]
	pub administers: Vec<String>,
	#[serde(default)]
	pub governance: Vec<GovernanceRef>,
	#[serde(default)]
	pub team: Option<String>,
	#[serde(default)]
	pub timeout_ms: u64,
	#[serde(default)]
	pub escalations: Vec<EscalationConfig>,
}

impl AdministrationConfig {
	/// Administration `name` built by `factory` over objects exposing `capability`.
	pub fn new(name: &str, factory: &str, capability: &str) -> Self {
		Self {
			name: name.to_string(),
			factory: Some(factory.to_string()),
			capability: Some(capability.to_string()),
			..Self::default()
		}
	}

	/// Adds a bound name to administer.
	pub fn administer(mut self, bound_name: &str) -> Self {
		self.administers.push(bound_name.to_string());
		self
	}

	/// Maps the administration's governance `index` to an office governance.
	pub fn govern(mut self, index: usize, governance: &str) -> Self {
		self.governance.push(GovernanceRef {
			index,
			name: governance.to_string(),
		});
		self
	}

	/// Sets the responsible team.
	pub fn team(mut self, team: &str) -> Self {
		self.team = Some(team.to_string());
		self
	}

	/// Sets the asynchronous-flow timeout; zero disables the monitor.
	pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}

	/// Routes failures of type `handles` to `team`.
	pub fn escalate(mut self, handles: &str, team: &str) -> Self {
		self.escalations.push(EscalationConfig {
			handles: handles.to_string(),
			team: team.to_string(),
		});
		self
	}
}

/// Sparse governance reference: administration-local index to office governance name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GovernanceRef {
	pub index: usize,
	pub name: String,
}

/// Routes failures of type `handles` to `team`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
	pub handles: String,
	pub team: String,
}
