use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::config::GovernanceRef;
use crate::graph::GovernanceBinding;
use crate::issues::{AssetKind, IssueCode, IssueSink, unknown_message};

/// Builds the office governance list. Indices follow declaration order of
/// the accepted names.
pub(crate) fn bind_governances(names: &[String], issues: &mut dyn IssueSink) -> Vec<GovernanceBinding> {
	let mut seen = FxHashSet::default();
	let mut bound = Vec::with_capacity(names.len());

	for (position, name) in names.iter().enumerate() {
		let name = name.trim();
		if name.is_empty() {
			issues.add_issue(
				AssetKind::Governance,
				name,
				IssueCode::ConfigurationError,
				format!("governance {position} has no name"),
			);
			continue;
		}
		if !seen.insert(name) {
			issues.add_issue(
				AssetKind::Governance,
				name,
				IssueCode::DuplicateBinding,
				format!("governance '{name}' is declared more than once"),
			);
			continue;
		}
		bound.push(GovernanceBinding {
			name: Arc::from(name),
			index: bound.len() as u32,
		});
	}

	tracing::debug!(governances = bound.len(), "governances bound");
	bound
}

/// Resolves an administration's sparse governance references into a dense
/// table of office governance indices.
///
/// The table is sized to the highest accepted index plus one. An index must
/// stay below the number of references plus the number of office governances;
/// larger ones are reported and skipped. Slots that stay unresolved are `None`
/// and reported.
pub(crate) fn map_governance(
	administration: &str,
	refs: &[GovernanceRef],
	governances: &[GovernanceBinding],
	issues: &mut dyn IssueSink,
) -> Box<[Option<u32>]> {
	let limit = refs.len().saturating_add(governances.len());
	let mut accepted = Vec::with_capacity(refs.len());
	for r in refs {
		if r.index >= limit {
			issues.add_issue(
				AssetKind::Administration,
				administration,
				IssueCode::ConfigurationError,
				format!("governance index {} for '{}' is out of range (limit {limit})", r.index, r.name),
			);
			continue;
		}
		accepted.push(r);
	}

	let Some(max) = accepted.iter().map(|r| r.index).max() else {
		return Box::default();
	};
	let Some(len) = max.checked_add(1) else {
		return Box::default();
	};

	let mut table: Vec<Option<u32>> = vec![None; len];
	let mut mapped = vec![false; len];

	for r in accepted {
		if mapped[r.index] {
			issues.add_issue(
				AssetKind::Administration,
				administration,
				IssueCode::ExtraGovernanceConfigured,
				format!("governance index {} is mapped more than once; ignoring '{}'", r.index, r.name),
			);
			continue;
		}
		mapped[r.index] = true;

		match governances.iter().find(|g| *g.name == *r.name.trim()) {
			Some(g) => table[r.index] = Some(g.index),
			None => issues.add_issue(
				AssetKind::Administration,
				administration,
				IssueCode::UnknownGovernance,
				format!(
					"governance index {}: {}",
					r.index,
					unknown_message("governance", &r.name, governances.iter().map(|g| &*g.name))
				),
			),
		}
	}

	for (index, _) in mapped.iter().enumerate().filter(|(_, m)| !**m) {
		issues.add_issue(
			AssetKind::Administration,
			administration,
			IssueCode::UnmappedGovernanceIndex,
			format!("governance index {index} is not mapped (indices 0..={max} must all be mapped)"),
		);
	}

	table.into_boxed_slice()
}
