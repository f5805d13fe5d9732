use std::path::PathBuf;

use crate::issues::Issue;

/// Failure of a source descriptor's metadata build step.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
	#[error("{0}")]
	Failed(String),

	#[error("build step panicked: {0}")]
	Panicked(String),

	#[error("build step produced {actual} dependencies, expected {expected}")]
	DependencyCount { expected: usize, actual: usize },
}

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Returned by checked compilation when the pass recorded issues.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
	#[error("office '{office}' failed to compile with {} issue(s)", issues.len())]
	Issues { office: String, issues: Vec<Issue> },
}

impl CompileError {
	pub fn issues(&self) -> &[Issue] {
		match self {
			Self::Issues { issues, .. } => issues,
		}
	}
}
