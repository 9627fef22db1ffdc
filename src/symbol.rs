//! [`SymbolValue`]: the typed, attributed value held by a table entry.

use crate::{
	constant::Constant,
	object::{Object, ObjectKind},
};

bitflags::bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SymFlags: u8 {
		/// The binding holds a live value rather than a forward declaration.
		const ASSIGNED = 1 << 0;
		const CONST = 1 << 1;
		const PRIVATE = 1 << 2;
	}
}

impl SymFlags {
	/// The attributes fixed when a binding is created.
	pub const ATTRIBUTES: Self = Self::CONST.union(Self::PRIVATE);

	#[must_use]
	pub fn new(is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		let mut ret = Self::empty();
		ret.set(Self::ASSIGNED, is_assigned);
		ret.set(Self::CONST, is_const);
		ret.set(Self::PRIVATE, is_private);
		ret
	}
}

/// The discriminant of a [`Datum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymKind {
	Object,
	SignedInt,
	UnsignedInt,
	Float,
	String,
	Bool,
}

impl std::fmt::Display for SymKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::Object => "OBJECT",
			Self::SignedInt => "INUM",
			Self::UnsignedInt => "UNUM",
			Self::Float => "FNUM",
			Self::String => "STRING",
			Self::Bool => "BOOL",
		};

		f.write_str(s)
	}
}

/// A symbol's payload. An object binding without a handle is a binding
/// whose object has not been given yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
	Object(Option<Object>),
	SignedInt(i64),
	UnsignedInt(u64),
	Float(f64),
	String(Box<str>),
	Bool(bool),
}

impl Datum {
	#[must_use]
	pub fn kind(&self) -> SymKind {
		match self {
			Self::Object(_) => SymKind::Object,
			Self::SignedInt(_) => SymKind::SignedInt,
			Self::UnsignedInt(_) => SymKind::UnsignedInt,
			Self::Float(_) => SymKind::Float,
			Self::String(_) => SymKind::String,
			Self::Bool(_) => SymKind::Bool,
		}
	}

	/// `false` only for an object binding with no handle.
	#[must_use]
	pub fn has_payload(&self) -> bool {
		!matches!(self, Self::Object(None))
	}

	/// The zero value of a scalar kind, or an empty object binding.
	#[must_use]
	pub fn placeholder(kind: SymKind) -> Self {
		match kind {
			SymKind::Object => Self::Object(None),
			SymKind::SignedInt => Self::SignedInt(0),
			SymKind::UnsignedInt => Self::UnsignedInt(0),
			SymKind::Float => Self::Float(0.0),
			SymKind::String => Self::String(Box::default()),
			SymKind::Bool => Self::Bool(false),
		}
	}
}

impl From<Constant> for Datum {
	fn from(value: Constant) -> Self {
		match value {
			Constant::Bool(b) => Self::Bool(b),
			Constant::SignedInt(i) => Self::SignedInt(i),
			Constant::UnsignedInt(u) => Self::UnsignedInt(u),
			Constant::Float(f) => Self::Float(f),
			Constant::String(s) => Self::String(s),
		}
	}
}

impl std::fmt::Display for Datum {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Object(Some(obj)) => write!(f, "{}", obj.kind()),
			Self::Object(None) => write!(f, "NULL"),
			Self::SignedInt(i) => write!(f, "{i}"),
			Self::UnsignedInt(u) => write!(f, "{u}"),
			Self::Float(n) => write!(f, "{n:?}"),
			Self::String(s) => write!(f, "{s:?}"),
			Self::Bool(b) => write!(f, "{b}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolValue {
	pub datum: Datum,
	pub flags: SymFlags,
}

impl SymbolValue {
	#[must_use]
	pub fn new(datum: Datum, flags: SymFlags) -> Self {
		Self { datum, flags }
	}

	/// Assignment state follows the handle: the binding is assigned
	/// exactly when it has been given an object.
	#[must_use]
	pub fn object(obj: Option<Object>, is_const: bool, is_private: bool) -> Self {
		let flags = SymFlags::new(obj.is_some(), is_const, is_private);
		Self::new(Datum::Object(obj), flags)
	}

	#[must_use]
	pub fn signed(inum: i64, is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::SignedInt(inum),
			SymFlags::new(is_assigned, is_const, is_private),
		)
	}

	#[must_use]
	pub fn unsigned(unum: u64, is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::UnsignedInt(unum),
			SymFlags::new(is_assigned, is_const, is_private),
		)
	}

	#[must_use]
	pub fn float(fnum: f64, is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::Float(fnum),
			SymFlags::new(is_assigned, is_const, is_private),
		)
	}

	#[must_use]
	pub fn string(s: &str, is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::String(s.to_owned().into_boxed_str()),
			SymFlags::new(is_assigned, is_const, is_private),
		)
	}

	#[must_use]
	pub fn boolean(b: bool, is_assigned: bool, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::Bool(b),
			SymFlags::new(is_assigned, is_const, is_private),
		)
	}

	/// An assigned binding holding a scanned literal.
	#[must_use]
	pub fn from_constant(constant: Constant, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::from(constant),
			SymFlags::new(true, is_const, is_private),
		)
	}

	/// An unassigned binding of the given kind, i.e. a typed forward declaration.
	#[must_use]
	pub fn unassigned(kind: SymKind, is_const: bool, is_private: bool) -> Self {
		Self::new(
			Datum::placeholder(kind),
			SymFlags::new(false, is_const, is_private),
		)
	}

	#[must_use]
	pub fn kind(&self) -> SymKind {
		self.datum.kind()
	}

	#[must_use]
	pub fn is_assigned(&self) -> bool {
		self.flags.contains(SymFlags::ASSIGNED)
	}

	#[must_use]
	pub fn is_const(&self) -> bool {
		self.flags.contains(SymFlags::CONST)
	}

	#[must_use]
	pub fn is_private(&self) -> bool {
		self.flags.contains(SymFlags::PRIVATE)
	}

	#[must_use]
	pub fn object_kind(&self) -> Option<ObjectKind> {
		match &self.datum {
			Datum::Object(Some(obj)) => Some(obj.kind()),
			_ => None,
		}
	}
}

impl std::fmt::Display for SymbolValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.kind(), self.datum)?;

		if !self.is_assigned() {
			write!(f, " (unassigned)")?;
		}

		if self.is_const() {
			write!(f, " const")?;
		}

		if self.is_private() {
			write!(f, " private")?;
		}

		Ok(())
	}
}
