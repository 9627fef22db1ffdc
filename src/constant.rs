//! [`Constant`]: literal values as recognized by the scanner.

/// An immutable literal produced while scanning.
///
/// String payloads are owned copies, never views into a source buffer,
/// since the scanner is free to discard its input once a token is consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
	Bool(bool),
	SignedInt(i64),
	UnsignedInt(u64),
	Float(f64),
	String(Box<str>),
}

/// The discriminant of a [`Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstKind {
	Bool,
	SignedInt,
	UnsignedInt,
	Float,
	String,
}

impl Constant {
	#[must_use]
	pub fn string(text: &str) -> Self {
		Self::String(text.to_owned().into_boxed_str())
	}

	#[must_use]
	pub fn kind(&self) -> ConstKind {
		match self {
			Self::Bool(_) => ConstKind::Bool,
			Self::SignedInt(_) => ConstKind::SignedInt,
			Self::UnsignedInt(_) => ConstKind::UnsignedInt,
			Self::Float(_) => ConstKind::Float,
			Self::String(_) => ConstKind::String,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<bool> for Constant {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Constant {
	fn from(value: i64) -> Self {
		Self::SignedInt(value)
	}
}

impl From<u64> for Constant {
	fn from(value: u64) -> Self {
		Self::UnsignedInt(value)
	}
}

impl From<f64> for Constant {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Constant {
	fn from(value: &str) -> Self {
		Self::string(value)
	}
}

impl std::fmt::Display for Constant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::SignedInt(i) => write!(f, "{i}"),
			Self::UnsignedInt(u) => write!(f, "{u}u"),
			Self::Float(n) => write!(f, "{n:?}"),
			Self::String(s) => write!(f, "{s:?}"),
		}
	}
}

impl std::fmt::Display for ConstKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::Bool => "BOOL",
			Self::SignedInt => "INUM",
			Self::UnsignedInt => "UNUM",
			Self::Float => "FNUM",
			Self::String => "STRG",
		};

		f.write_str(s)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn string_is_owned_copy() {
		let mut source = String::from("hello");
		let c = Constant::string(&source);
		source.clear();
		assert_eq!(c.as_str(), Some("hello"));
		assert_eq!(c.kind(), ConstKind::String);
	}

	#[test]
	fn display() {
		assert_eq!(Constant::from(7_u64).to_string(), "7u");
		assert_eq!(Constant::from(-3_i64).to_string(), "-3");
		assert_eq!(Constant::from(1.0).to_string(), "1.0");
		assert_eq!(Constant::from("a\"b").to_string(), "\"a\\\"b\"");
	}
}
