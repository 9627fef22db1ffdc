//! [`SymbolTable`]: a flat namespace of name-to-value bindings.
//!
//! Entries form a binary search tree ordered by name. The tree is never
//! rebalanced, so sorted insertion orders degrade it into a list; the tables
//! this is built for hold a few hundred names at most. Nodes live in a
//! [`SlotMap`] arena and refer to their children by key, so each entry is
//! owned by the table alone and no two entries can share a value.

use std::{cmp::Ordering, io::Write};

use serde::Deserialize;
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::{
	error::SymError,
	scan::SourcePos,
	symbol::{Datum, SymFlags, SymbolValue},
};

slotmap::new_key_type! { pub struct EntryKey; }

#[derive(Debug)]
pub struct Entry {
	name: Box<str>,
	value: Option<SymbolValue>,
	left: Option<EntryKey>,
	right: Option<EntryKey>,
	defined_at: SourcePos,
}

impl Entry {
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// `None` for a forward declaration that has not been given a value.
	#[must_use]
	pub fn value(&self) -> Option<&SymbolValue> {
		self.value.as_ref()
	}

	/// Where this entry was first defined. Updates do not move it.
	#[must_use]
	pub fn defined_at(&self) -> SourcePos {
		self.defined_at
	}
}

/// The answer to an attribute query. Exactly one of these holds for any name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
	True,
	False,
	/// The entry exists but holds no value yet.
	NotAssigned,
	NotFound,
}

impl From<bool> for Query {
	fn from(value: bool) -> Self {
		if value {
			Self::True
		} else {
			Self::False
		}
	}
}

impl std::fmt::Display for Query {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::True => "TRUE",
			Self::False => "FALSE",
			Self::NotAssigned => "NOT_ASSIGNED",
			Self::NotFound => "NOT_FOUND",
		};

		f.write_str(s)
	}
}

/// Traversal orders for [`SymbolTable::dump`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DumpOrder {
	/// Left subtree, right subtree, then the node. Reflects the tree's shape.
	#[default]
	PostOrder,
	/// Alphabetical.
	InOrder,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
	entries: SlotMap<EntryKey, Entry>,
	root: Option<EntryKey>,
}

enum Probe {
	Found(EntryKey),
	/// Where a new entry with the probed name would be linked in.
	Vacant {
		parent: Option<EntryKey>,
		side: Ordering,
	},
}

impl SymbolTable {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Binds `name` to `value`, stamping the entry with `at`.
	/// Fails without touching the table if `name` is already bound.
	pub fn insert(
		&mut self,
		name: &str,
		value: SymbolValue,
		at: SourcePos,
	) -> Result<(), SymError> {
		self.link(name, Some(value), at)
	}

	/// Creates an entry for `name` which holds no value.
	pub fn declare(&mut self, name: &str, at: SourcePos) -> Result<(), SymError> {
		self.link(name, None, at)
	}

	/// Replaces the value bound to `name`.
	///
	/// The entry's `CONST` and `PRIVATE` attributes are kept as they were set
	/// at creation; only the payload and the assignment state come from
	/// `value`. An entry that was only declared takes `value` as it is.
	pub fn update(&mut self, name: &str, value: SymbolValue) -> Result<(), SymError> {
		let Probe::Found(key) = self.probe(name) else {
			return Err(SymError::NotFound);
		};

		let entry = &mut self.entries[key];

		let value = match entry.value.take() {
			Some(old) => {
				let attrs = old.flags & SymFlags::ATTRIBUTES;

				if let Datum::Object(Some(obj)) = old.datum {
					obj.destroy();
				}

				SymbolValue {
					datum: value.datum,
					flags: value.flags.difference(SymFlags::ATTRIBUTES) | attrs,
				}
			}
			None => value,
		};

		trace!("Updated symbol `{name}`: {value}");
		entry.value = Some(value);
		Ok(())
	}

	/// Copies out the value bound to `name`.
	///
	/// Returns [`SymError::NotAssigned`] if the entry holds no value, including
	/// an object binding which has not been given an object.
	pub fn find(&self, name: &str) -> Result<SymbolValue, SymError> {
		let entry = self.get(name).ok_or(SymError::NotFound)?;

		match &entry.value {
			Some(value) if value.datum.has_payload() => Ok(value.clone()),
			Some(_) | None => Err(SymError::NotAssigned),
		}
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Entry> {
		match self.probe(name) {
			Probe::Found(key) => Some(&self.entries[key]),
			Probe::Vacant { .. } => None,
		}
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	#[must_use]
	pub fn defined_at(&self, name: &str) -> Option<SourcePos> {
		self.get(name).map(Entry::defined_at)
	}

	#[must_use]
	pub fn is_assigned(&self, name: &str) -> Query {
		self.query(name, SymbolValue::is_assigned)
	}

	#[must_use]
	pub fn is_const(&self, name: &str) -> Query {
		self.query(name, SymbolValue::is_const)
	}

	#[must_use]
	pub fn is_private(&self, name: &str) -> Query {
		self.query(name, SymbolValue::is_private)
	}

	#[must_use]
	fn query(&self, name: &str, attr: fn(&SymbolValue) -> bool) -> Query {
		match self.get(name) {
			None => Query::NotFound,
			Some(Entry { value: None, .. }) => Query::NotAssigned,
			Some(Entry {
				value: Some(value), ..
			}) => Query::from(attr(value)),
		}
	}

	/// Entries in alphabetical order.
	pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
		InOrder {
			table: self,
			stack: vec![],
			next: self.root,
		}
	}

	/// Entries in the given order.
	#[must_use]
	pub fn walk(&self, order: DumpOrder) -> Vec<&Entry> {
		match order {
			DumpOrder::InOrder => self.iter().collect(),
			DumpOrder::PostOrder => self.post_order(),
		}
	}

	/// The number of entries on the longest root-to-leaf path.
	#[must_use]
	pub fn depth(&self) -> usize {
		let mut ret = 0;
		let mut stack: Vec<(EntryKey, usize)> = self.root.map(|k| (k, 1)).into_iter().collect();

		while let Some((key, d)) = stack.pop() {
			ret = ret.max(d);
			let entry = &self.entries[key];
			stack.extend(entry.left.map(|k| (k, d + 1)));
			stack.extend(entry.right.map(|k| (k, d + 1)));
		}

		ret
	}

	pub fn dump(&self, order: DumpOrder, w: &mut impl Write) -> std::io::Result<()> {
		for entry in self.walk(order) {
			writeln!(w, "{} @ {}", entry.name(), entry.defined_at())?;

			match entry.value() {
				None => writeln!(w, "    (no value)")?,
				Some(value) => {
					writeln!(w, "    {value}")?;

					if let Datum::Object(Some(obj)) = &value.datum {
						obj.print(8, w)?;
					}
				}
			}
		}

		Ok(())
	}

	#[must_use]
	fn probe(&self, name: &str) -> Probe {
		let mut parent = None;
		let mut side = Ordering::Equal;
		let mut cursor = self.root;

		while let Some(key) = cursor {
			let entry = &self.entries[key];
			let ord = name.cmp(&*entry.name);

			match ord {
				Ordering::Equal => return Probe::Found(key),
				Ordering::Less => cursor = entry.left,
				Ordering::Greater => cursor = entry.right,
			}

			parent = Some(key);
			side = ord;
		}

		Probe::Vacant { parent, side }
	}

	fn link(
		&mut self,
		name: &str,
		value: Option<SymbolValue>,
		at: SourcePos,
	) -> Result<(), SymError> {
		let Probe::Vacant { parent, side } = self.probe(name) else {
			debug!("Symbol `{name}` is already defined.");
			return Err(SymError::AlreadyExists);
		};

		let key = self.entries.insert(Entry {
			name: name.into(),
			value,
			left: None,
			right: None,
			defined_at: at,
		});

		match parent {
			None => self.root = Some(key),
			Some(p) if side == Ordering::Less => self.entries[p].left = Some(key),
			Some(p) => self.entries[p].right = Some(key),
		}

		trace!("Defined symbol `{name}` at {at}.");
		Ok(())
	}

	#[must_use]
	fn post_order(&self) -> Vec<&Entry> {
		let mut ret = Vec::with_capacity(self.len());
		// The flag records whether the node's children have been pushed.
		let mut stack: Vec<(EntryKey, bool)> = self.root.map(|k| (k, false)).into_iter().collect();

		while let Some((key, expanded)) = stack.pop() {
			let entry = &self.entries[key];

			if expanded {
				ret.push(entry);
				continue;
			}

			stack.push((key, true));
			stack.extend(entry.right.map(|k| (k, false)));
			stack.extend(entry.left.map(|k| (k, false)));
		}

		ret
	}
}

struct InOrder<'t> {
	table: &'t SymbolTable,
	stack: Vec<EntryKey>,
	next: Option<EntryKey>,
}

impl<'t> Iterator for InOrder<'t> {
	type Item = &'t Entry;

	fn next(&mut self) -> Option<Self::Item> {
		while let Some(key) = self.next {
			self.stack.push(key);
			self.next = self.table.entries[key].left;
		}

		let key = self.stack.pop()?;
		let entry = &self.table.entries[key];
		self.next = entry.right;
		Some(entry)
	}
}

#[cfg(test)]
mod test {
	use crate::{object::Object, symbol::SymKind};

	use super::*;

	const AT: SourcePos = SourcePos { line: 1, col: 1 };

	fn names(entries: Vec<&Entry>) -> Vec<&str> {
		entries.into_iter().map(Entry::name).collect()
	}

	#[test]
	fn find_inserted() {
		let mut table = SymbolTable::new();
		table
			.insert("x", SymbolValue::signed(5, true, false, false), AT)
			.unwrap();

		let found = table.find("x").unwrap();
		assert_eq!(found.kind(), SymKind::SignedInt);
		assert_eq!(found.datum, Datum::SignedInt(5));
		assert_eq!(table.is_assigned("x"), Query::True);
		assert_eq!(table.is_const("x"), Query::False);
		assert_eq!(table.is_private("x"), Query::False);
	}

	#[test]
	fn duplicate_keeps_first() {
		let mut table = SymbolTable::new();
		let first = SymbolValue::signed(1, true, false, false);
		let second = SymbolValue::string("two", true, true, true);

		assert_eq!(table.insert("x", first.clone(), AT), Ok(()));
		assert_eq!(
			table.insert("x", second, SourcePos::new(9, 9)),
			Err(SymError::AlreadyExists)
		);
		assert_eq!(table.find("x"), Ok(first));
		assert_eq!(table.defined_at("x"), Some(AT));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn absent_names() {
		let mut table = SymbolTable::new();
		table
			.insert("m", SymbolValue::boolean(true, true, false, false), AT)
			.unwrap();

		assert_eq!(
			table.update("y", SymbolValue::signed(1, true, false, false)),
			Err(SymError::NotFound)
		);
		assert_eq!(table.find("y"), Err(SymError::NotFound));
		assert_eq!(table.is_assigned("y"), Query::NotFound);
		assert_eq!(table.is_const("y"), Query::NotFound);
		assert_eq!(table.is_private("y"), Query::NotFound);
		assert_eq!(table.defined_at("y"), None);
		assert_eq!(table.len(), 1);
		assert_eq!(names(table.walk(DumpOrder::InOrder)), ["m"]);
	}

	#[test]
	fn update_keeps_attributes_and_position() {
		let mut table = SymbolTable::new();
		table
			.insert("k", SymbolValue::signed(0, false, true, true), AT)
			.unwrap();
		assert_eq!(table.is_assigned("k"), Query::False);

		table
			.update("k", SymbolValue::float(2.5, true, false, false))
			.unwrap();

		let v = table.find("k").unwrap();
		assert_eq!(v.datum, Datum::Float(2.5));
		assert_eq!(table.is_assigned("k"), Query::True);
		assert_eq!(table.is_const("k"), Query::True);
		assert_eq!(table.is_private("k"), Query::True);
		assert_eq!(table.defined_at("k"), Some(AT));
	}

	#[test]
	fn declared_entries() {
		let mut table = SymbolTable::new();
		table.declare("fwd", AT).unwrap();
		assert_eq!(table.declare("fwd", AT), Err(SymError::AlreadyExists));

		assert_eq!(table.find("fwd"), Err(SymError::NotAssigned));
		assert_eq!(table.is_assigned("fwd"), Query::NotAssigned);
		assert_eq!(table.is_const("fwd"), Query::NotAssigned);
		assert_eq!(table.is_private("fwd"), Query::NotAssigned);

		// Nothing was set at creation, so the new value's attributes stand.
		table
			.update("fwd", SymbolValue::boolean(true, true, true, false))
			.unwrap();
		assert_eq!(table.is_const("fwd"), Query::True);
		assert_eq!(table.find("fwd").unwrap().datum, Datum::Bool(true));
	}

	#[test]
	fn object_without_handle() {
		let mut table = SymbolTable::new();
		table
			.insert("o", SymbolValue::object(None, false, true), AT)
			.unwrap();

		assert_eq!(table.find("o"), Err(SymError::NotAssigned));
		assert_eq!(table.is_assigned("o"), Query::False);
		assert_eq!(table.is_private("o"), Query::True);

		table
			.update("o", SymbolValue::object(Some(Object::structure()), false, false))
			.unwrap();
		assert_eq!(table.is_assigned("o"), Query::True);
		assert_eq!(table.is_private("o"), Query::True);
		assert!(table.find("o").unwrap().object_kind().is_some());
	}

	#[test]
	fn round_trip_any_order() {
		let words = [
			"delta", "alpha", "kilo", "bravo", "echo", "zulu", "charlie", "mike", "golf",
		];

		let orders: [Vec<&str>; 3] = [
			words.to_vec(),
			words.iter().rev().copied().collect(),
			{
				let mut sorted = words.to_vec();
				sorted.sort_unstable();
				sorted
			},
		];

		for order in orders {
			let mut table = SymbolTable::new();

			for (i, word) in order.iter().enumerate() {
				table
					.insert(word, SymbolValue::unsigned(i as u64, true, false, false), AT)
					.unwrap();
			}

			for (i, word) in order.iter().enumerate() {
				assert_eq!(table.find(word).unwrap().datum, Datum::UnsignedInt(i as u64));
			}

			let in_order = names(table.walk(DumpOrder::InOrder));
			assert!(in_order.windows(2).all(|w| w[0] < w[1]));
			assert_eq!(in_order.len(), words.len());
		}
	}

	#[test]
	fn sorted_insertion_is_not_rebalanced() {
		let mut table = SymbolTable::new();

		for name in ["a", "b", "c", "d", "e"] {
			table.declare(name, AT).unwrap();
		}

		assert_eq!(table.depth(), 5);
	}

	#[test]
	fn post_order_follows_shape() {
		let mut table = SymbolTable::new();

		for name in ["m", "f", "t", "a", "h", "z"] {
			table.declare(name, AT).unwrap();
		}

		assert_eq!(
			names(table.walk(DumpOrder::PostOrder)),
			["a", "h", "f", "z", "t", "m"]
		);
		assert_eq!(
			names(table.walk(DumpOrder::InOrder)),
			["a", "f", "h", "m", "t", "z"]
		);
		assert_eq!(table.depth(), 3);
	}

	#[test]
	fn dump() {
		let mut table = SymbolTable::new();
		table
			.insert("b", SymbolValue::object(Some(Object::list()), true, false), AT)
			.unwrap();
		table.declare("a", SourcePos::new(2, 5)).unwrap();

		let mut out = vec![];
		table.dump(DumpOrder::PostOrder, &mut out).unwrap();

		assert_eq!(
			String::from_utf8(out).unwrap(),
			"a @ 2:5\n    (no value)\n\
			b @ 1:1\n    OBJECT: LIST const\n        LIST\n            value: ListObj\n"
		);
	}

	#[test]
	fn empty() {
		let table = SymbolTable::new();
		assert!(table.is_empty());
		assert_eq!(table.depth(), 0);
		assert!(table.walk(DumpOrder::PostOrder).is_empty());
		assert_eq!(table.iter().count(), 0);
	}
}
