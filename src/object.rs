//! [`Object`]: opaque handles to composite values.
//!
//! The composite kinds have no contents yet; each handle owns an empty
//! placeholder record. Only construction, destruction, and kind
//! introspection are meaningful.

use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
	List,
	Dict,
	Struct,
	Namespace,
}

impl ObjectKind {
	pub const ALL: [Self; 4] = [Self::List, Self::Dict, Self::Struct, Self::Namespace];

	/// The lower-case keyword naming this kind in declaration lists.
	#[must_use]
	pub fn keyword(self) -> &'static str {
		match self {
			Self::List => "list",
			Self::Dict => "dict",
			Self::Struct => "struct",
			Self::Namespace => "namespace",
		}
	}

	#[must_use]
	pub fn from_keyword(word: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|k| k.keyword() == word)
	}
}

impl std::fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::List => "LIST",
			Self::Dict => "DICT",
			Self::Struct => "STRUCT",
			Self::Namespace => "NAMESPACE",
		};

		f.write_str(s)
	}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListObj {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DictObj {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StructObj {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamespaceObj {}

/// The record behind an [`Object`]. The variant fixes the object's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Handle {
	List(Box<ListObj>),
	Dict(Box<DictObj>),
	Struct(Box<StructObj>),
	Namespace(Box<NamespaceObj>),
}

/// A composite value. Its kind never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
	handle: Handle,
}

impl Object {
	#[must_use]
	pub fn new(kind: ObjectKind) -> Self {
		let handle = match kind {
			ObjectKind::List => Handle::List(Box::default()),
			ObjectKind::Dict => Handle::Dict(Box::default()),
			ObjectKind::Struct => Handle::Struct(Box::default()),
			ObjectKind::Namespace => Handle::Namespace(Box::default()),
		};

		Self { handle }
	}

	#[must_use]
	pub fn list() -> Self {
		Self::new(ObjectKind::List)
	}

	#[must_use]
	pub fn dict() -> Self {
		Self::new(ObjectKind::Dict)
	}

	#[must_use]
	pub fn structure() -> Self {
		Self::new(ObjectKind::Struct)
	}

	#[must_use]
	pub fn namespace() -> Self {
		Self::new(ObjectKind::Namespace)
	}

	#[must_use]
	pub fn kind(&self) -> ObjectKind {
		match self.handle {
			Handle::List(_) => ObjectKind::List,
			Handle::Dict(_) => ObjectKind::Dict,
			Handle::Struct(_) => ObjectKind::Struct,
			Handle::Namespace(_) => ObjectKind::Namespace,
		}
	}

	#[must_use]
	pub fn as_list(&self) -> Option<&ListObj> {
		match &self.handle {
			Handle::List(l) => Some(l),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_dict(&self) -> Option<&DictObj> {
		match &self.handle {
			Handle::Dict(d) => Some(d),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_struct(&self) -> Option<&StructObj> {
		match &self.handle {
			Handle::Struct(s) => Some(s),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_namespace(&self) -> Option<&NamespaceObj> {
		match &self.handle {
			Handle::Namespace(n) => Some(n),
			_ => None,
		}
	}

	/// Releases the handle. Dropping the object does the same; this exists
	/// to make the release point explicit at call sites.
	pub fn destroy(self) {
		tracing::trace!("Destroying {} object.", self.kind());
		drop(self);
	}

	/// Writes the kind tag and a description of the record behind the handle,
	/// each line indented by `indent` columns.
	pub fn print(&self, indent: usize, w: &mut impl Write) -> std::io::Result<()> {
		writeln!(w, "{:indent$}{}", "", self.kind())?;

		let record: &dyn std::fmt::Debug = match &self.handle {
			Handle::List(l) => l,
			Handle::Dict(d) => d,
			Handle::Struct(s) => s,
			Handle::Namespace(n) => n,
		};

		writeln!(w, "{:indent$}    value: {record:?}", "")
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn kind_is_recoverable() {
		for kind in ObjectKind::ALL {
			let obj = Object::new(kind);
			assert_eq!(obj.kind(), kind);
			assert_eq!(ObjectKind::from_keyword(kind.keyword()), Some(kind));
			obj.destroy();
		}

		assert!(Object::list().as_list().is_some());
		assert!(Object::list().as_dict().is_none());
		assert!(Object::namespace().as_namespace().is_some());
	}

	#[test]
	fn print() {
		let mut out = vec![];
		Object::dict().print(2, &mut out).unwrap();
		let text = String::from_utf8(out).unwrap();
		assert_eq!(text, "  DICT\n      value: DictObj\n");
	}
}
