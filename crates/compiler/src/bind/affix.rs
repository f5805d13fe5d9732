use std::sync::Arc;

use super::{Origin, PendingInstance, ScopeBindings};
use crate::config::ManagedSourceConfig;
use crate::issues::{AssetKind, IssueCode, IssueSink, unknown_message};
use crate::registry::SourceRegistry;
use crate::scope::Scope;

/// Ensures every managed source needing callback flows into the office has a
/// process binding under its required process-bound name.
///
/// An existing binding is reused when it comes from the same source. Otherwise
/// a placeholder is registered at the next process index; it is linked and
/// built with the rest of the process scope.
pub(crate) fn affix_process_bindings(
	process: &mut ScopeBindings,
	managed: &[ManagedSourceConfig],
	sources: &dyn SourceRegistry,
	issues: &mut dyn IssueSink,
) {
	debug_assert_eq!(process.scope, Scope::Process);
	let mut affixed = 0usize;

	for config in managed {
		let source_name = config.source.trim();
		if source_name.is_empty() {
			issues.add_issue(
				AssetKind::ManagedObjectSource,
				source_name,
				IssueCode::ConfigurationError,
				"managed source has no name".to_string(),
			);
			continue;
		}

		let Some(source) = sources.resolve(source_name) else {
			issues.add_issue(
				AssetKind::ManagedObjectSource,
				source_name,
				IssueCode::UnknownSource,
				unknown_message("managed object source", source_name, sources.names()),
			);
			continue;
		};

		let Some(requirement) = source.managing_office().filter(|r| r.needs_callback_flows) else {
			tracing::trace!(source = source_name, "no callback flows; not affixed");
			continue;
		};

		let bound_name = requirement.process_bound_name.trim();
		if bound_name.is_empty() {
			issues.add_issue(
				AssetKind::ManagedObjectSource,
				source_name,
				IssueCode::ConfigurationError,
				"managing office requirement has no process bound name".to_string(),
			);
			continue;
		}

		if let Some(existing) = process.get(bound_name) {
			let existing_source = existing.primary_source().name();
			if existing_source != source.name() {
				issues.add_issue(
					AssetKind::ManagedObjectSource,
					source_name,
					IssueCode::ConflictingProcessBinding,
					format!("process object '{bound_name}' is bound to source '{existing_source}', not '{source_name}'"),
				);
			}
			continue;
		}

		if !source.dependencies().is_empty() && config.dependencies.is_empty() {
			issues.add_issue(
				AssetKind::ManagedObjectSource,
				source_name,
				IssueCode::UnmappedAffixedDependencies,
				format!(
					"source declares {} dependencies but is not bound and has no dependency mappings for '{bound_name}'",
					source.dependencies().len()
				),
			);
			continue;
		}

		let instance = PendingInstance {
			source: Arc::clone(&source),
			mappings: config.dependencies.clone(),
		};
		let index = process.register(Arc::from(bound_name), Origin::Affixed, vec![instance]);
		affixed += 1;
		tracing::debug!(source = source_name, name = bound_name, index, "affixed into process scope");
	}

	tracing::debug!(managed = managed.len(), affixed, "process affixing complete");
}
