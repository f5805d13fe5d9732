//! Type identifiers and the explicit supertype table used for is-a checks.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

/// Identifier of a runtime object type or capability type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for TypeName {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for TypeName {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

impl From<&TypeName> for TypeName {
	fn from(name: &TypeName) -> Self {
		name.clone()
	}
}

impl fmt::Display for TypeName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Supertype table answering "is `actual` assignable to `required`".
///
/// Types without a declaration are only assignable to themselves. Declarations
/// are followed transitively, so `PooledConnection: Connection` and
/// `Connection: Resource` makes `PooledConnection` assignable to `Resource`.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
	supertypes: FxHashMap<TypeName, Vec<TypeName>>,
}

impl TypeHierarchy {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares the direct supertypes of `ty`, appending to earlier declarations.
	pub fn declare<S>(&mut self, ty: impl Into<TypeName>, supertypes: impl IntoIterator<Item = S>) -> &mut Self
	where
		S: Into<TypeName>,
	{
		let entry = self.supertypes.entry(ty.into()).or_default();
		for sup in supertypes {
			let sup = sup.into();
			if !entry.contains(&sup) {
				entry.push(sup);
			}
		}
		self
	}

	/// Builder form of [`Self::declare`].
	pub fn with<S>(mut self, ty: impl Into<TypeName>, supertypes: impl IntoIterator<Item = S>) -> Self
	where
		S: Into<TypeName>,
	{
		self.declare(ty, supertypes);
		self
	}

	/// Direct supertypes declared for `ty`.
	pub fn supertypes(&self, ty: &TypeName) -> &[TypeName] {
		self.supertypes.get(ty).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Returns true if `actual` is `required` or one of its transitive subtypes.
	pub fn is_assignable(&self, actual: &TypeName, required: &TypeName) -> bool {
		if actual == required {
			return true;
		}

		let mut seen: FxHashSet<&TypeName> = FxHashSet::default();
		let mut pending: Vec<&TypeName> = vec![actual];
		while let Some(ty) = pending.pop() {
			if !seen.insert(ty) {
				continue;
			}
			for sup in self.supertypes(ty) {
				if sup == required {
					return true;
				}
				pending.push(sup);
			}
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hierarchy() -> TypeHierarchy {
		TypeHierarchy::new()
			.with("PooledConnection", ["Connection"])
			.with("Connection", ["Resource", "AutoCloseable"])
			.with("Integer", ["Number"])
	}

	#[test]
	fn exact_match_needs_no_declaration() {
		let types = TypeHierarchy::new();
		assert!(types.is_assignable(&"Anything".into(), &"Anything".into()));
	}

	#[test]
	fn supertypes_are_followed_transitively() {
		let types = hierarchy();
		assert!(types.is_assignable(&"PooledConnection".into(), &"Connection".into()));
		assert!(types.is_assignable(&"PooledConnection".into(), &"AutoCloseable".into()));
		assert!(!types.is_assignable(&"Connection".into(), &"PooledConnection".into()));
		assert!(!types.is_assignable(&"Integer".into(), &"Connection".into()));
	}

	#[test]
	fn cyclic_declarations_terminate() {
		let types = TypeHierarchy::new().with("A", ["B"]).with("B", ["A"]);
		assert!(types.is_assignable(&"A".into(), &"B".into()));
		assert!(!types.is_assignable(&"A".into(), &"C".into()));
	}

	#[test]
	fn repeated_declarations_do_not_duplicate() {
		let mut types = TypeHierarchy::new();
		types.declare("A", ["B"]).declare("A", ["B", "C"]);
		assert_eq!(types.supertypes(&"A".into()).len(), 2);
	}
}
