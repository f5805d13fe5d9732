use std::fmt;

use serde::Deserialize;

/// Containment lifetime of a bound managed object.
///
/// Scopes nest as `Process ⊃ Thread ⊃ Function`. An object bound in a scope can
/// depend on objects in the same scope or any enclosing scope, never on an
/// object in a nested scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
	Process,
	Thread,
	Function,
}

impl Scope {
	/// All scopes, outermost first.
	pub const ALL: [Scope; 3] = [Scope::Process, Scope::Thread, Scope::Function];

	/// Nesting depth, `0` for [`Scope::Process`].
	pub const fn depth(self) -> usize {
		match self {
			Self::Process => 0,
			Self::Thread => 1,
			Self::Function => 2,
		}
	}

	/// The directly enclosing scope.
	pub const fn parent(self) -> Option<Scope> {
		match self {
			Self::Process => None,
			Self::Thread => Some(Self::Process),
			Self::Function => Some(Self::Thread),
		}
	}

	/// Strict ancestors, innermost first.
	pub fn ancestors(self) -> impl Iterator<Item = Scope> {
		std::iter::successors(self.parent(), |s| s.parent())
	}

	/// Returns true if objects bound in `other` are visible from this scope.
	pub const fn can_see(self, other: Scope) -> bool {
		other.depth() <= self.depth()
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Process => "process",
			Self::Thread => "thread",
			Self::Function => "function",
		}
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ancestors_walk_outward() {
		let chain: Vec<_> = Scope::Function.ancestors().collect();
		assert_eq!(chain, vec![Scope::Thread, Scope::Process]);
		assert_eq!(Scope::Process.ancestors().count(), 0);
	}

	#[test]
	fn visibility_never_reaches_nested_scopes() {
		assert!(Scope::Function.can_see(Scope::Process));
		assert!(Scope::Thread.can_see(Scope::Thread));
		assert!(!Scope::Process.can_see(Scope::Thread));
		assert!(!Scope::Thread.can_see(Scope::Function));
	}
}
