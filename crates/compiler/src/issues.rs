//! Compile diagnostics.
//!
//! Every stage of the compiler reports problems through an [`IssueSink`] and
//! keeps going, so a single pass surfaces as many problems as possible. A pass
//! is usable only if no issue was recorded.

use std::fmt;
use std::sync::Arc;

/// Kind of configured asset an issue is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
	Office,
	ManagedObject,
	ManagedObjectSource,
	Administration,
	Governance,
	Team,
}

impl AssetKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Office => "office",
			Self::ManagedObject => "managed object",
			Self::ManagedObjectSource => "managed object source",
			Self::Administration => "administration",
			Self::Governance => "governance",
			Self::Team => "team",
		}
	}
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Broad error taxonomy shared by all issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
	/// Blank or missing required field.
	Configuration,
	/// Source, managed object, team or governance name not found.
	UnknownReference,
	/// Dependency or capability type incompatibility.
	TypeMismatch,
	/// Two declarations competing for one name.
	DuplicateBinding,
	/// Missing or extra mappings relative to what was declared.
	CapacityMismatch,
	/// A build step failed or panicked.
	ConstructionFailure,
}

/// Specific problem detected during a compile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
	ConfigurationError,
	UnknownSource,
	DuplicateBinding,
	MissingDependencyMapping,
	UnknownDependencyTarget,
	IncompatibleDependency,
	ExtraDependenciesConfigured,
	SourceConstructionFailure,
	UnknownManagedObject,
	UnsupportedCapability,
	UnknownTeam,
	UnknownGovernance,
	UnmappedGovernanceIndex,
	ExtraGovernanceConfigured,
	ConflictingProcessBinding,
	UnmappedAffixedDependencies,
}

impl IssueCode {
	pub const fn category(self) -> IssueCategory {
		match self {
			Self::ConfigurationError => IssueCategory::Configuration,
			Self::UnknownSource
			| Self::UnknownDependencyTarget
			| Self::UnknownManagedObject
			| Self::UnknownTeam
			| Self::UnknownGovernance => IssueCategory::UnknownReference,
			Self::IncompatibleDependency | Self::UnsupportedCapability => IssueCategory::TypeMismatch,
			Self::DuplicateBinding | Self::ConflictingProcessBinding => IssueCategory::DuplicateBinding,
			Self::MissingDependencyMapping
			| Self::ExtraDependenciesConfigured
			| Self::UnmappedGovernanceIndex
			| Self::ExtraGovernanceConfigured
			| Self::UnmappedAffixedDependencies => IssueCategory::CapacityMismatch,
			Self::SourceConstructionFailure => IssueCategory::ConstructionFailure,
		}
	}
}

/// Underlying error attached to an issue.
pub type IssueCause = Arc<dyn std::error::Error + Send + Sync>;

/// A recorded compile problem.
#[derive(Debug, Clone)]
pub struct Issue {
	pub asset_kind: AssetKind,
	pub asset_name: Arc<str>,
	pub code: IssueCode,
	pub message: Arc<str>,
	pub cause: Option<IssueCause>,
}

impl Issue {
	pub fn category(&self) -> IssueCategory {
		self.code.category()
	}
}

impl fmt::Display for Issue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} '{}': {}", self.asset_kind, self.asset_name, self.message)?;
		if let Some(cause) = &self.cause {
			write!(f, " ({cause})")?;
		}
		Ok(())
	}
}

/// Destination for compile issues. Never fails.
pub trait IssueSink {
	fn add_issue(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String);

	fn add_issue_with_cause(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String, cause: IssueCause);
}

/// In-memory [`IssueSink`] that keeps every issue in report order.
#[derive(Debug, Clone, Default)]
pub struct IssueLog {
	issues: Vec<Issue>,
}

impl IssueLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn issues(&self) -> &[Issue] {
		&self.issues
	}

	pub fn into_issues(self) -> Vec<Issue> {
		self.issues
	}

	pub fn len(&self) -> usize {
		self.issues.len()
	}

	pub fn is_empty(&self) -> bool {
		self.issues.is_empty()
	}

	/// Issues recorded with `code`.
	pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &Issue> + '_ {
		self.issues.iter().filter(move |i| i.code == code)
	}

	pub fn count(&self, code: IssueCode) -> usize {
		self.with_code(code).count()
	}

	/// Issues attributed to the named asset.
	pub fn for_asset<'a>(&'a self, asset_name: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
		self.issues.iter().filter(move |i| &*i.asset_name == asset_name)
	}

	fn push(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String, cause: Option<IssueCause>) {
		tracing::debug!(kind = %asset_kind, name = asset_name, ?code, %message, "compile issue");
		self.issues.push(Issue {
			asset_kind,
			asset_name: Arc::from(asset_name),
			code,
			message: Arc::from(message),
			cause,
		});
	}
}

impl IssueSink for IssueLog {
	fn add_issue(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String) {
		self.push(asset_kind, asset_name, code, message, None);
	}

	fn add_issue_with_cause(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String, cause: IssueCause) {
		self.push(asset_kind, asset_name, code, message, Some(cause));
	}
}

/// Counts issues as they pass through to an inner sink.
pub(crate) struct CountingSink<'a> {
	inner: &'a mut dyn IssueSink,
	count: usize,
}

impl<'a> CountingSink<'a> {
	pub(crate) fn new(inner: &'a mut dyn IssueSink) -> Self {
		Self { inner, count: 0 }
	}

	pub(crate) fn count(&self) -> usize {
		self.count
	}
}

impl IssueSink for CountingSink<'_> {
	fn add_issue(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String) {
		self.count += 1;
		self.inner.add_issue(asset_kind, asset_name, code, message);
	}

	fn add_issue_with_cause(&mut self, asset_kind: AssetKind, asset_name: &str, code: IssueCode, message: String, cause: IssueCause) {
		self.count += 1;
		self.inner.add_issue_with_cause(asset_kind, asset_name, code, message, cause);
	}
}

/// Suggests the closest known name using edit distance.
pub(crate) fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
	candidates
		.into_iter()
		.map(|c| (strsim::levenshtein(name, c), c))
		.filter(|(d, _)| *d <= 3)
		.min_by_key(|(d, _)| *d)
		.map(|(_, c)| c)
}

/// Formats an unknown-name message with an optional "did you mean" hint.
pub(crate) fn unknown_message<'a>(what: &str, name: &str, candidates: impl IntoIterator<Item = &'a str>) -> String {
	match suggest(name, candidates) {
		Some(s) => format!("unknown {what} '{name}' (did you mean '{s}'?)"),
		None => format!("unknown {what} '{name}'"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn log_keeps_report_order() {
		let mut log = IssueLog::new();
		log.add_issue(AssetKind::ManagedObject, "A", IssueCode::UnknownSource, "first".into());
		log.add_issue(AssetKind::Team, "T", IssueCode::UnknownTeam, "second".into());

		let messages: Vec<_> = log.issues().iter().map(|i| &*i.message).collect();
		assert_eq!(messages, ["first", "second"]);
		assert_eq!(log.count(IssueCode::UnknownTeam), 1);
		assert_eq!(log.for_asset("A").count(), 1);
	}

	#[test]
	fn every_unknown_code_is_an_unknown_reference() {
		for code in [
			IssueCode::UnknownSource,
			IssueCode::UnknownDependencyTarget,
			IssueCode::UnknownManagedObject,
			IssueCode::UnknownTeam,
			IssueCode::UnknownGovernance,
		] {
			assert_eq!(code.category(), IssueCategory::UnknownReference, "{code:?}");
		}
	}

	#[test]
	fn suggestion_picks_nearest_candidate() {
		assert_eq!(suggest("conection", ["connection", "cache"]), Some("connection"));
		assert_eq!(suggest("zzzzzzzz", ["connection"]), None);
		assert_eq!(unknown_message("team", "nope", std::iter::empty()), "unknown team 'nope'");
	}

	#[test]
	fn counting_sink_forwards() {
		let mut log = IssueLog::new();
		let mut sink = CountingSink::new(&mut log);
		sink.add_issue(AssetKind::Office, "o", IssueCode::ConfigurationError, "x".into());
		assert_eq!(sink.count(), 1);
		assert_eq!(log.len(), 1);
	}
}
