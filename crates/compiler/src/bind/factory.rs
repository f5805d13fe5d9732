use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::linker::LinkedObject;
use crate::error::ConstructionError;
use crate::graph::{BoundInstance, BoundObject, DependencyRef};
use crate::issues::{AssetKind, IssueCode, IssueSink};
use crate::metadata::BuildContext;
use crate::registry::MonitorFactory;

/// Runs the build step of every instance of a linked object.
///
/// Errors and panics raised by a build step are reported as construction
/// failures and the object is left out.
pub(crate) fn build_object(linked: LinkedObject<'_>, monitors: &dyn MonitorFactory, issues: &mut dyn IssueSink) -> Option<BoundObject> {
	let placeholder = linked.placeholder;
	let mut instances = Vec::with_capacity(placeholder.instances.len());
	let mut failed = false;

	for (instance, (pending, dependencies)) in placeholder.instances.iter().zip(&linked.dependencies).enumerate() {
		let source = &*pending.source;
		let result = {
			let mut ctx = BuildContext::new(
				&placeholder.name,
				placeholder.scope,
				placeholder.index,
				instance,
				source,
				dependencies,
				monitors,
				&mut *issues,
			);
			std::panic::catch_unwind(AssertUnwindSafe(|| source.builder().build(&mut ctx)))
		};

		let error = match result {
			Ok(Ok(metadata)) if metadata.dependencies.len() == dependencies.len() => {
				instances.push(BoundInstance {
					source: Arc::clone(&pending.source),
					metadata,
				});
				continue;
			}
			Ok(Ok(metadata)) => ConstructionError::DependencyCount {
				expected: dependencies.len(),
				actual: metadata.dependencies.len(),
			},
			Ok(Err(e)) => e,
			Err(payload) => ConstructionError::Panicked(panic_message(payload)),
		};

		issues.add_issue_with_cause(
			AssetKind::ManagedObject,
			&placeholder.name,
			IssueCode::SourceConstructionFailure,
			format!("failed to build instance {instance} from source '{}'", source.name()),
			Arc::new(error),
		);
		failed = true;
	}

	if failed {
		return None;
	}
	tracing::trace!(scope = %placeholder.scope, name = %placeholder.name, origin = ?placeholder.origin, "built");
	Some(BoundObject::new(
		Arc::clone(&placeholder.name),
		DependencyRef::new(placeholder.scope, placeholder.index),
		instances.into_boxed_slice(),
	))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	match payload.downcast::<String>() {
		Ok(s) => *s,
		Err(payload) => payload
			.downcast_ref::<&'static str>()
			.map(|s| (*s).to_string())
			.unwrap_or_else(|| "non-string panic payload".to_string()),
	}
}
