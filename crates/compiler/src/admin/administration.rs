use std::sync::Arc;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};

use super::governance::map_governance;
use crate::config::AdministrationConfig;
use crate::graph::{AdministeredObject, AdministrationBinding, BoundObject, Escalation, GovernanceBinding};
use crate::issues::{AssetKind, IssueCode, IssueSink, unknown_message};
use crate::registry::{MonitorFactory, Team, TeamRegistry};
use crate::types::{TypeHierarchy, TypeName};

/// Bound objects visible to an office's administrations, by bound name.
///
/// Built from the outermost scope inward, so a nested scope shadows an
/// enclosing one.
pub(crate) struct VisibleObjects<'a> {
	by_name: FxHashMap<&'a str, &'a BoundObject>,
}

impl<'a> VisibleObjects<'a> {
	pub fn new<I>(scopes_outermost_first: I) -> Self
	where
		I: IntoIterator<Item = &'a [BoundObject]>,
	{
		let mut by_name = FxHashMap::default();
		for objects in scopes_outermost_first {
			for object in objects {
				by_name.insert(object.name(), object);
			}
		}
		Self { by_name }
	}

	fn get(&self, name: &str) -> Option<&'a BoundObject> {
		self.by_name.get(name).copied()
	}

	fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
		self.by_name.keys().copied()
	}
}

pub(crate) struct AdministrationBinder<'a> {
	pub objects: &'a VisibleObjects<'a>,
	pub governances: &'a [GovernanceBinding],
	pub teams: &'a dyn TeamRegistry,
	pub types: &'a TypeHierarchy,
	pub monitors: &'a dyn MonitorFactory,
}

impl AdministrationBinder<'_> {
	/// Binds every administration configuration, skipping invalid ones.
	pub fn bind_all(&self, configs: &[AdministrationConfig], issues: &mut dyn IssueSink) -> Vec<AdministrationBinding> {
		let mut seen = FxHashSet::default();
		let mut bound = Vec::with_capacity(configs.len());

		for config in configs {
			let name = config.name.trim();
			if !name.is_empty() && !seen.insert(name) {
				issues.add_issue(
					AssetKind::Administration,
					name,
					IssueCode::DuplicateBinding,
					format!("administration '{name}' is declared more than once"),
				);
				continue;
			}
			if let Some(binding) = self.bind(config, issues) {
				bound.push(binding);
			}
		}

		tracing::debug!(configured = configs.len(), bound = bound.len(), "administrations bound");
		bound
	}

	/// Binds one administration. Every problem is reported before giving up.
	pub fn bind(&self, config: &AdministrationConfig, issues: &mut dyn IssueSink) -> Option<AdministrationBinding> {
		let name = config.name.trim();
		if name.is_empty() {
			issues.add_issue(
				AssetKind::Administration,
				name,
				IssueCode::ConfigurationError,
				"administration has no name".to_string(),
			);
			return None;
		}

		let factory = required(config.factory.as_deref());
		if factory.is_none() {
			issues.add_issue(
				AssetKind::Administration,
				name,
				IssueCode::ConfigurationError,
				"administration has no factory".to_string(),
			);
		}
		let capability = required(config.capability.as_deref()).map(TypeName::from);
		if capability.is_none() {
			issues.add_issue(
				AssetKind::Administration,
				name,
				IssueCode::ConfigurationError,
				"administration has no extension interface".to_string(),
			);
		}
		let (Some(factory), Some(capability)) = (factory, capability) else {
			return None;
		};

		let administered = self.administered(name, &capability, &config.administers, issues);
		let team = self.team(name, config.team.as_deref(), issues);
		let escalations = self.escalations(name, config, issues);
		let governance = map_governance(name, &config.governance, self.governances, issues);

		let (Some(administered), Some(team), Some(escalations)) = (administered, team, escalations) else {
			return None;
		};

		let timeout = Duration::from_millis(config.timeout_ms);
		let monitor = (!timeout.is_zero()).then(|| self.monitors.create(AssetKind::Administration, name, "asynchronous-flows", &mut *issues));

		tracing::trace!(name, %capability, administered = administered.len(), "administration bound");
		Some(AdministrationBinding {
			name: Arc::from(name),
			factory: Arc::from(factory),
			capability,
			administered: administered.into_boxed_slice(),
			governance,
			team,
			timeout,
			monitor,
			escalations: escalations.into_boxed_slice(),
		})
	}

	/// Resolves the administered objects and extracts the capability from
	/// every instance of each.
	fn administered(&self, name: &str, capability: &TypeName, bound_names: &[String], issues: &mut dyn IssueSink) -> Option<Vec<AdministeredObject>> {
		let mut administered = Vec::with_capacity(bound_names.len());
		let mut failed = false;

		for bound_name in bound_names {
			let bound_name = bound_name.trim();
			let Some(object) = self.objects.get(bound_name) else {
				issues.add_issue(
					AssetKind::Administration,
					name,
					IssueCode::UnknownManagedObject,
					unknown_message("managed object", bound_name, self.objects.names()),
				);
				failed = true;
				continue;
			};

			let extractors: Option<Vec<_>> = object
				.instances()
				.iter()
				.map(|i| i.source.capability_for(capability, self.types).map(|c| Arc::clone(&c.extractor)))
				.collect();

			match extractors {
				Some(extractors) => administered.push(AdministeredObject {
					bound_name: Arc::from(bound_name),
					slot: object.slot(),
					extractors: extractors.into_boxed_slice(),
				}),
				None => {
					let lacking: Vec<_> = object
						.instances()
						.iter()
						.enumerate()
						.filter(|(_, i)| i.source.capability_for(capability, self.types).is_none())
						.map(|(n, i)| format!("instance {n} ('{}')", i.source.name()))
						.collect();
					issues.add_issue(
						AssetKind::Administration,
						name,
						IssueCode::UnsupportedCapability,
						format!(
							"managed object '{bound_name}' does not support extension interface '{capability}' on {}",
							lacking.join(", ")
						),
					);
					failed = true;
				}
			}
		}

		(!failed).then_some(administered)
	}

	/// Resolves the responsible team. `Some(None)` means none was configured.
	fn team(&self, name: &str, team: Option<&str>, issues: &mut dyn IssueSink) -> Option<Option<Arc<Team>>> {
		let Some(team_name) = required(team) else {
			return Some(None);
		};
		match self.teams.resolve(team_name) {
			Some(team) => Some(Some(team)),
			None => {
				issues.add_issue(
					AssetKind::Administration,
					name,
					IssueCode::UnknownTeam,
					unknown_message("responsible team", team_name, self.teams.names()),
				);
				None
			}
		}
	}

	fn escalations(&self, name: &str, config: &AdministrationConfig, issues: &mut dyn IssueSink) -> Option<Vec<Escalation>> {
		let mut escalations = Vec::with_capacity(config.escalations.len());
		let mut failed = false;

		for (position, escalation) in config.escalations.iter().enumerate() {
			let Some(handles) = required(Some(escalation.handles.as_str())) else {
				issues.add_issue(
					AssetKind::Administration,
					name,
					IssueCode::ConfigurationError,
					format!("escalation {position} has no handled type"),
				);
				failed = true;
				continue;
			};
			let team_name = escalation.team.trim();
			match self.teams.resolve(team_name) {
				Some(team) => escalations.push(Escalation {
					handles: TypeName::from(handles),
					team,
				}),
				None => {
					issues.add_issue(
						AssetKind::Administration,
						name,
						IssueCode::UnknownTeam,
						format!(
							"escalation {position} for '{handles}': {}",
							unknown_message("team", team_name, self.teams.names())
						),
					);
					failed = true;
				}
			}
		}

		(!failed).then_some(escalations)
	}
}

/// Trimmed value, treating blank as absent.
fn required(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}
