use std::sync::Arc;

use super::{Origin, PendingInstance, ScopeBindings};
use crate::config::BindingConfig;
use crate::issues::{AssetKind, IssueCode, IssueSink, unknown_message};
use crate::registry::SourceRegistry;
use crate::scope::Scope;

/// Registers a placeholder for every valid binding configuration of `scope`.
///
/// Invalid configurations are reported and skipped. A bound name that was
/// already registered keeps its first declaration.
pub(crate) fn bind_scope(scope: Scope, configs: &[BindingConfig], sources: &dyn SourceRegistry, issues: &mut dyn IssueSink) -> ScopeBindings {
	let mut bindings = ScopeBindings::new(scope);

	for config in configs {
		let name = config.name.trim();
		if name.is_empty() {
			issues.add_issue(
				AssetKind::Office,
				scope.as_str(),
				IssueCode::ConfigurationError,
				format!("{scope} binding for source '{}' has no bound name", config.source),
			);
			continue;
		}

		let Some(instances) = resolve_instances(name, config, sources, issues) else {
			continue;
		};

		if let Some(existing) = bindings.get(name) {
			issues.add_issue(
				AssetKind::ManagedObject,
				name,
				IssueCode::DuplicateBinding,
				format!(
					"{scope} object '{name}' is already bound to source '{}' at index {}; dropping binding to '{}'",
					existing.primary_source().name(),
					existing.index,
					config.source
				),
			);
			continue;
		}

		let index = bindings.register(Arc::from(name), Origin::Configured, instances);
		tracing::trace!(%scope, name, index, source = %config.source, "registered placeholder");
	}

	tracing::debug!(%scope, configured = configs.len(), registered = bindings.len(), "scope bound");
	bindings
}

/// Looks up the source of every instance. Reports every failing instance
/// before giving up on the binding.
fn resolve_instances(name: &str, config: &BindingConfig, sources: &dyn SourceRegistry, issues: &mut dyn IssueSink) -> Option<Vec<PendingInstance>> {
	let mut instances = Vec::with_capacity(1 + config.alternates.len());
	let mut failed = false;

	for (instance, (source_name, mappings)) in config.instances().enumerate() {
		let source_name = source_name.trim();
		if source_name.is_empty() {
			issues.add_issue(
				AssetKind::ManagedObject,
				name,
				IssueCode::ConfigurationError,
				format!("instance {instance} of '{name}' has no source name"),
			);
			failed = true;
			continue;
		}

		match sources.resolve(source_name) {
			Some(source) => instances.push(PendingInstance {
				source,
				mappings: mappings.to_vec(),
			}),
			None => {
				issues.add_issue(
					AssetKind::ManagedObject,
					name,
					IssueCode::UnknownSource,
					unknown_message("managed object source", source_name, sources.names()),
				);
				failed = true;
			}
		}
	}

	(!failed).then_some(instances)
}
