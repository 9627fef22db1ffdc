//! [`CompoundName`]: dotted names flattened into a single table key.

/// A name built from `.`-separated segments, e.g. `outer.inner.leaf`.
///
/// The table has no notion of nesting; a compound name is bound and looked
/// up as its joined text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundName {
	joined: String,
	segments: usize,
}

impl CompoundName {
	#[must_use]
	pub fn new(first: &str) -> Self {
		Self {
			joined: first.to_owned(),
			segments: 1,
		}
	}

	pub fn push(&mut self, segment: &str) {
		self.joined.push('.');
		self.joined.push_str(segment);
		self.segments += 1;
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.joined
	}

	#[must_use]
	pub fn segments(&self) -> impl Iterator<Item = &str> {
		self.joined.split('.')
	}

	#[must_use]
	pub fn is_compound(&self) -> bool {
		self.segments > 1
	}
}

impl std::ops::Deref for CompoundName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		self.as_str()
	}
}

impl std::fmt::Display for CompoundName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.joined)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn smoke() {
		let mut name = CompoundName::new("outer");
		assert!(!name.is_compound());
		name.push("inner");
		name.push("leaf");
		assert!(name.is_compound());
		assert_eq!(name.as_str(), "outer.inner.leaf");
		assert_eq!(name.segments().collect::<Vec<_>>(), ["outer", "inner", "leaf"]);
	}
}
