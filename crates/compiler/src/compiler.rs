use std::sync::Arc;

use crate::admin::{AdministrationBinder, VisibleObjects, bind_governances};
use crate::bind::affix::affix_process_bindings;
use crate::bind::factory::build_object;
use crate::bind::linker::link_scope;
use crate::bind::scope_binder::bind_scope;
use crate::bind::{ScopeBindings, ScopeView};
use crate::config::OfficeConfig;
use crate::error::CompileError;
use crate::graph::{OfficeGraph, ScopeTable};
use crate::issues::{CountingSink, IssueLog, IssueSink};
use crate::registry::{MonitorFactory, SourceRegistry, TeamRegistry};
use crate::scope::Scope;
use crate::types::TypeHierarchy;

/// External collaborators consulted during a compile pass.
#[derive(Clone, Copy)]
pub struct OfficeEnvironment<'a> {
	pub sources: &'a dyn SourceRegistry,
	pub teams: &'a dyn TeamRegistry,
	pub types: &'a TypeHierarchy,
	pub monitors: &'a dyn MonitorFactory,
}

/// Compiles office configuration into an [`OfficeGraph`].
pub struct OfficeCompiler<'a> {
	env: OfficeEnvironment<'a>,
}

impl<'a> OfficeCompiler<'a> {
	pub fn new(env: OfficeEnvironment<'a>) -> Self {
		Self { env }
	}

	/// Runs a full pass, reporting every problem to `issues`.
	///
	/// Always returns a graph, holding whatever compiled cleanly. The graph
	/// must not be used at runtime if any issue was reported.
	pub fn compile(&self, config: &OfficeConfig, issues: &mut dyn IssueSink) -> OfficeGraph {
		let env = self.env;
		let _span = tracing::debug_span!("compile_office", office = %config.name).entered();
		let mut issues = CountingSink::new(issues);

		let governances = bind_governances(&config.governances, &mut issues);

		let mut process = bind_scope(Scope::Process, &config.process, env.sources, &mut issues);
		let thread = bind_scope(Scope::Thread, &config.thread, env.sources, &mut issues);
		let function = bind_scope(Scope::Function, &config.function, env.sources, &mut issues);
		affix_process_bindings(&mut process, &config.managed_sources, env.sources, &mut issues);

		let process_table = self.build_scope(&process, &[], &mut issues);
		let thread_table = self.build_scope(&thread, &[&process], &mut issues);
		let function_table = self.build_scope(&function, &[&thread, &process], &mut issues);

		let visible = VisibleObjects::new([process_table.objects(), thread_table.objects(), function_table.objects()]);
		let administrations = AdministrationBinder {
			objects: &visible,
			governances: &governances,
			teams: env.teams,
			types: env.types,
			monitors: env.monitors,
		}
		.bind_all(&config.administrations, &mut issues);

		let objects = process_table.len() + thread_table.len() + function_table.len();
		if issues.count() > 0 {
			tracing::warn!(office = %config.name, issues = issues.count(), objects, "office compiled with issues");
		} else {
			tracing::debug!(office = %config.name, objects, administrations = administrations.len(), "office compiled");
		}

		OfficeGraph {
			name: Arc::from(config.name.as_str()),
			process: process_table,
			thread: thread_table,
			function: function_table,
			administrations: administrations.into(),
			governances: governances.into(),
		}
	}

	/// Runs a full pass and fails if any issue was reported.
	pub fn compile_checked(&self, config: &OfficeConfig) -> Result<OfficeGraph, CompileError> {
		let mut log = IssueLog::new();
		let graph = self.compile(config, &mut log);
		if log.is_empty() {
			return Ok(graph);
		}

		let samples: Vec<_> = log.issues().iter().take(5).map(ToString::to_string).collect();
		tracing::warn!(count = log.len(), ?samples, "office compile problems");
		Err(CompileError::Issues {
			office: config.name.clone(),
			issues: log.into_issues(),
		})
	}

	fn build_scope(&self, bindings: &ScopeBindings, ancestors: &[&ScopeBindings], issues: &mut dyn IssueSink) -> ScopeTable {
		let view = ScopeView::new(bindings, ancestors);
		let objects = link_scope(&view, self.env.types, &mut *issues)
			.into_iter()
			.filter_map(|linked| build_object(linked, self.env.monitors, &mut *issues))
			.collect();
		ScopeTable::new(bindings.scope, objects)
	}
}
