use rustc_hash::FxHashMap;

use super::{Placeholder, ScopeView};
use crate::config::DependencyMapping;
use crate::graph::DependencyRef;
use crate::issues::{AssetKind, IssueCode, IssueSink, unknown_message};
use crate::source::{DependencyDescriptor, DependencyKey, SourceDescriptor};
use crate::types::TypeHierarchy;

/// A placeholder whose every instance has a complete dependency list.
#[derive(Debug)]
pub(crate) struct LinkedObject<'a> {
	pub placeholder: &'a Placeholder,
	/// Parallel to `placeholder.instances`.
	pub dependencies: Vec<Box<[DependencyRef]>>,
}

/// Links every placeholder of the view's current scope.
///
/// Placeholders with an unresolvable dependency are reported and left out.
pub(crate) fn link_scope<'a>(view: &ScopeView<'a>, types: &TypeHierarchy, issues: &mut dyn IssueSink) -> Vec<LinkedObject<'a>> {
	let current = view.current();
	let mut linked = Vec::with_capacity(current.len());

	for placeholder in current.iter() {
		if let Some(object) = link_placeholder(view, placeholder, types, issues) {
			linked.push(object);
		}
	}

	tracing::debug!(scope = %view.scope(), placeholders = current.len(), linked = linked.len(), "scope linked");
	linked
}

pub(crate) fn link_placeholder<'a>(
	view: &ScopeView<'a>,
	placeholder: &'a Placeholder,
	types: &TypeHierarchy,
	issues: &mut dyn IssueSink,
) -> Option<LinkedObject<'a>> {
	let mut dependencies = Vec::with_capacity(placeholder.instances.len());
	let mut failed = false;

	for (instance, pending) in placeholder.instances.iter().enumerate() {
		let mut linker = InstanceLinker {
			view,
			types,
			name: &placeholder.name,
			instance,
			issues: &mut *issues,
		};
		match linker.link(&pending.source, &pending.mappings) {
			Some(refs) => dependencies.push(refs),
			None => failed = true,
		}
	}

	if failed {
		return None;
	}
	tracing::trace!(scope = %placeholder.scope, name = %placeholder.name, index = placeholder.index, "linked");
	Some(LinkedObject { placeholder, dependencies })
}

/// Slot position of each declared dependency, by its addressing key.
fn slot_layout(descriptors: &[DependencyDescriptor]) -> FxHashMap<DependencyKey, usize> {
	descriptors.iter().enumerate().map(|(slot, d)| (d.key, slot)).collect()
}

struct InstanceLinker<'v, 'a> {
	view: &'v ScopeView<'a>,
	types: &'v TypeHierarchy,
	name: &'v str,
	instance: usize,
	issues: &'v mut dyn IssueSink,
}

impl InstanceLinker<'_, '_> {
	fn link(&mut self, source: &SourceDescriptor, mappings: &[DependencyMapping]) -> Option<Box<[DependencyRef]>> {
		let descriptors = source.dependencies();
		let (slots, mut failed) = self.assign_slots(descriptors, mappings);

		let mut refs = Vec::with_capacity(descriptors.len());
		for (descriptor, mapping) in descriptors.iter().zip(slots) {
			let Some(mapping) = mapping else {
				self.report(
					IssueCode::MissingDependencyMapping,
					format!("dependency {}{} is not mapped", descriptor.key, label(descriptor)),
				);
				failed = true;
				continue;
			};
			match self.resolve(descriptor, mapping) {
				Some(r) => refs.push(r),
				None => failed = true,
			}
		}

		(!failed).then(|| refs.into_boxed_slice())
	}

	/// Normalizes every mapping to a declared slot. Mappings that address no
	/// declared slot, or a slot already taken, are reported as extra.
	fn assign_slots<'m>(&mut self, descriptors: &[DependencyDescriptor], mappings: &'m [DependencyMapping]) -> (Vec<Option<&'m DependencyMapping>>, bool) {
		let layout = slot_layout(descriptors);
		let mut slots: Vec<Option<&DependencyMapping>> = vec![None; descriptors.len()];
		let mut extra = Vec::new();
		let mut failed = false;

		for (position, mapping) in mappings.iter().enumerate() {
			let Some(key) = mapping.address(position) else {
				self.report(
					IssueCode::ConfigurationError,
					format!("dependency mapping {position} to '{}' sets both key and index", mapping.target),
				);
				failed = true;
				continue;
			};
			match layout.get(&key) {
				Some(&slot) if slots[slot].is_none() => slots[slot] = Some(mapping),
				_ => extra.push(format!("{key} -> '{}'", mapping.target)),
			}
		}

		if !extra.is_empty() {
			self.report(
				IssueCode::ExtraDependenciesConfigured,
				format!(
					"{} extra dependency mapping(s) beyond the {} declared: {}",
					extra.len(),
					descriptors.len(),
					extra.join(", ")
				),
			);
		}
		(slots, failed)
	}

	fn resolve(&mut self, descriptor: &DependencyDescriptor, mapping: &DependencyMapping) -> Option<DependencyRef> {
		let target_name = mapping.target.trim();
		if target_name.is_empty() {
			self.report(
				IssueCode::ConfigurationError,
				format!("dependency {}{} has no target name", descriptor.key, label(descriptor)),
			);
			return None;
		}

		let Some(target) = self.view.resolve(target_name) else {
			let message = unknown_message("dependency target", target_name, self.view.visible_names());
			self.report(
				IssueCode::UnknownDependencyTarget,
				format!("dependency {}{}: {message}", descriptor.key, label(descriptor)),
			);
			return None;
		};

		for exposed in target.instances.iter().map(|i| i.source.object_type()) {
			if !self.types.is_assignable(exposed, &descriptor.required_type) {
				self.report(
					IssueCode::IncompatibleDependency,
					format!(
						"dependency {}{} requires '{}' but '{target_name}' exposes '{exposed}'",
						descriptor.key,
						label(descriptor),
						descriptor.required_type
					),
				);
				return None;
			}
		}

		Some(DependencyRef::new(target.scope, target.index))
	}

	fn report(&mut self, code: IssueCode, message: String) {
		let message = if self.instance == 0 {
			message
		} else {
			format!("instance {}: {message}", self.instance)
		};
		self.issues.add_issue(AssetKind::ManagedObject, self.name, code, message);
	}
}

fn label(descriptor: &DependencyDescriptor) -> String {
	descriptor.label.as_ref().map(|l| format!(" ({l})")).unwrap_or_default()
}
