//! [`Unit`]: one compilation unit run through the core.
//!
//! The grammar parser proper does not exist yet. Until it does, a unit reads
//! a line-oriented declaration list, one binding per line:
//!
//! ```text
//! [const] [private] NAME = VALUE     # bind
//! [const] [private] NAME : KIND      # bind, unassigned
//! NAME                               # forward declaration
//! NAME := VALUE                      # assign
//! ```
//!
//! VALUE is a literal, an object kind (`list`, `dict`, `struct`,
//! `namespace`), or the name of another symbol. Names may be dotted.

use tracing::debug;

use crate::{
	diag::Diagnostics,
	error::SymError,
	names::CompoundName,
	object::{Object, ObjectKind},
	scan::{Keyword, Locate, Pinned, Scanner, SourcePos, Token},
	symbol::{SymFlags, SymKind, SymbolValue},
	table::{Query, SymbolTable},
	trace_message,
};

/// A symbol table and the diagnostics reported while filling it.
/// Units never share either.
#[derive(Debug, Default)]
pub struct Unit {
	table: SymbolTable,
	diag: Diagnostics,
}

#[derive(Debug, Default, Clone, Copy)]
struct Modifiers {
	is_const: bool,
	is_private: bool,
}

impl Modifiers {
	#[must_use]
	fn any(self) -> bool {
		self.is_const || self.is_private
	}
}

impl Unit {
	#[must_use]
	pub fn new(diag: Diagnostics) -> Self {
		Self {
			table: SymbolTable::new(),
			diag,
		}
	}

	#[must_use]
	pub fn table(&self) -> &SymbolTable {
		&self.table
	}

	#[must_use]
	pub fn diag(&self) -> &Diagnostics {
		&self.diag
	}

	#[must_use]
	pub fn diag_mut(&mut self) -> &mut Diagnostics {
		&mut self.diag
	}

	#[must_use]
	pub fn into_parts(self) -> (SymbolTable, Diagnostics) {
		(self.table, self.diag)
	}

	/// `false` if any errors were reported, or any warnings with `werror` set.
	#[must_use]
	pub fn succeeded(&self, werror: bool) -> bool {
		self.diag.error_count() == 0 && !(werror && self.diag.warning_count() > 0)
	}

	/// Processes every statement in `src`. Recoverable problems are reported
	/// and processing continues with the next line.
	pub fn run(&mut self, file_name: &str, src: &str) {
		debug!("Processing unit: {file_name}");
		let mut scanner = Scanner::new(file_name, src);

		loop {
			match scanner.next_token() {
				Token::Eof => break,
				Token::Newline => continue,
				tok => {
					let trailing = self.statement(&mut scanner, tok);
					self.end_of_line(&mut scanner, trailing);
				}
			}
		}

		debug!(
			"Finished unit {file_name}: {} symbols, {}.",
			self.table.len(),
			self.diag.tally()
		);
	}

	/// Returns the first token after the statement.
	fn statement<'s>(&mut self, scanner: &mut Scanner<'s>, mut tok: Token<'s>) -> Token<'s> {
		let mut mods = Modifiers::default();

		while let Token::Keyword(kw) = tok {
			let repeated = match kw {
				Keyword::Const => std::mem::replace(&mut mods.is_const, true),
				Keyword::Private => std::mem::replace(&mut mods.is_private, true),
			};

			if repeated {
				self.diag
					.warning(&*scanner, format_args!("repeated modifier"));
			}

			tok = scanner.next_token();
		}

		let first = match tok {
			Token::Ident(first) => first,
			other => return self.bail(scanner, other, "a symbol name"),
		};

		let at = scanner.position();
		trace_message!(self.diag, "statement for `{first}` at {at}");

		let (name, tok) = match self.name(scanner, first) {
			Ok(ret) => ret,
			Err(tok) => return tok,
		};

		match tok {
			Token::Newline | Token::Eof => {
				if mods.any() {
					return self.bail_here(
						scanner,
						format_args!("a forward declaration cannot take modifiers"),
					);
				}

				self.bind(scanner.file_name(), &name, at, None);
				tok
			}
			Token::Eq => match self.value(scanner, mods) {
				Ok((value, tok)) => {
					self.bind(scanner.file_name(), &name, at, Some(value));
					tok
				}
				Err(tok) => tok,
			},
			Token::Colon => self.typed(scanner, &name, at, mods),
			Token::ColonEq => {
				if mods.any() {
					return self.bail_here(
						scanner,
						format_args!("an assignment cannot take modifiers"),
					);
				}

				match self.value(scanner, Modifiers::default()) {
					Ok((value, tok)) => {
						self.assign(scanner.file_name(), &name, at, value);
						tok
					}
					Err(tok) => tok,
				}
			}
			other => self.bail(scanner, other, "'=', ':', ':=', or end of line"),
		}
	}

	/// Reads the rest of a possibly-dotted name. `Ok` carries the token
	/// after the name; `Err` carries the token to resume from.
	fn name<'s>(
		&mut self,
		scanner: &mut Scanner<'s>,
		first: &str,
	) -> Result<(CompoundName, Token<'s>), Token<'s>> {
		let mut name = CompoundName::new(first);

		loop {
			let tok = scanner.next_token();

			if !matches!(tok, Token::Dot) {
				return Ok((name, tok));
			}

			match scanner.next_token() {
				Token::Ident(segment) => name.push(segment),
				other => return Err(self.bail(scanner, other, "a name segment after '.'")),
			}
		}
	}

	/// Reads a value. `Err` means nothing is to be bound, and carries the
	/// token to resume from.
	fn value<'s>(
		&mut self,
		scanner: &mut Scanner<'s>,
		mods: Modifiers,
	) -> Result<(SymbolValue, Token<'s>), Token<'s>> {
		match scanner.next_token() {
			Token::Literal(constant) => {
				let value = SymbolValue::from_constant(constant, mods.is_const, mods.is_private);
				Ok((value, scanner.next_token()))
			}
			Token::Ident(word) => {
				let at = scanner.position();
				let (name, tok) = self.name(scanner, word)?;

				if !name.is_compound() {
					if let Some(kind) = ObjectKind::from_keyword(word) {
						let obj = Object::new(kind);
						let value = SymbolValue::object(Some(obj), mods.is_const, mods.is_private);
						return Ok((value, tok));
					}
				}

				let here = Pinned {
					file_name: scanner.file_name(),
					pos: at,
				};

				match self.table.find(&name) {
					Ok(found) => {
						if !found.is_assigned() {
							self.diag.warning(
								&here,
								format_args!("symbol '{name}' used before assignment"),
							);
						}

						let flags =
							SymFlags::new(found.is_assigned(), mods.is_const, mods.is_private);
						Ok((SymbolValue::new(found.datum, flags), tok))
					}
					Err(err) => {
						self.unresolved(&here, &name, err);
						Err(tok)
					}
				}
			}
			other => Err(self.bail(scanner, other, "a value")),
		}
	}

	/// Reports a symbol reference whose value could not be read.
	fn unresolved(&mut self, here: &Pinned<'_>, name: &CompoundName, err: SymError) {
		match err {
			SymError::NotAssigned => {
				self.diag
					.warning(here, format_args!("symbol '{name}' used before assignment"));
			}
			SymError::NotFound => {
				self.diag
					.syntax_error(here, format_args!("undefined symbol '{name}'"));
			}
			SymError::AlreadyExists => {
				self.diag
					.fatal(format_args!("impossible lookup status for '{name}': {err}"));
			}
		}
	}

	/// `NAME : KIND`.
	fn typed<'s>(
		&mut self,
		scanner: &mut Scanner<'s>,
		name: &CompoundName,
		at: SourcePos,
		mods: Modifiers,
	) -> Token<'s> {
		let word = match scanner.next_token() {
			Token::Ident(word) => word,
			other => return self.bail(scanner, other, "a kind"),
		};

		let kind = match word {
			"int" => SymKind::SignedInt,
			"uint" => SymKind::UnsignedInt,
			"float" => SymKind::Float,
			"string" => SymKind::String,
			"bool" => SymKind::Bool,
			other if ObjectKind::from_keyword(other).is_some() => SymKind::Object,
			other => {
				return self.bail_here(scanner, format_args!("unknown kind '{other}'"));
			}
		};

		let value = SymbolValue::unassigned(kind, mods.is_const, mods.is_private);
		self.bind(scanner.file_name(), name, at, Some(value));
		scanner.next_token()
	}

	fn bind(
		&mut self,
		file_name: &str,
		name: &CompoundName,
		at: SourcePos,
		value: Option<SymbolValue>,
	) {
		let result = match value {
			Some(value) => self.table.insert(name, value, at),
			None => self.table.declare(name, at),
		};

		match result {
			Ok(()) => {
				crate::internal_assert!(
					self.diag,
					self.table.defined_at(name) == Some(at),
					"symbol `{name}` not found after insertion"
				);
			}
			Err(SymError::AlreadyExists) => {
				let prev = self.table.defined_at(name).unwrap_or_default();

				self.diag.syntax_error(
					&Pinned {
						file_name,
						pos: at,
					},
					format_args!("symbol '{name}' already defined at {prev}"),
				);
			}
			Err(other) => {
				self.diag
					.fatal(format_args!("impossible insertion status for '{name}': {other}"));
			}
		}
	}

	fn assign(&mut self, file_name: &str, name: &CompoundName, at: SourcePos, value: SymbolValue) {
		let here = Pinned {
			file_name,
			pos: at,
		};

		if self.table.is_const(name) == Query::True && self.table.is_assigned(name) == Query::True {
			self.diag
				.syntax_error(&here, format_args!("cannot assign to constant '{name}'"));
			return;
		}

		match self.table.update(name, value) {
			Ok(()) => {}
			Err(SymError::NotFound) => {
				self.diag.syntax_error(
					&here,
					format_args!("assignment to undeclared symbol '{name}'"),
				);
			}
			Err(other) => {
				self.diag
					.fatal(format_args!("impossible update status for '{name}': {other}"));
			}
		}
	}

	fn end_of_line<'s>(&mut self, scanner: &mut Scanner<'s>, tok: Token<'s>) {
		match tok {
			Token::Newline | Token::Eof => {}
			other => {
				self.bail(scanner, other, "end of line");
			}
		}
	}

	/// Reports `tok` as unexpected and skips the rest of its line.
	/// Returns the token to resume from.
	fn bail<'s>(&mut self, scanner: &mut Scanner<'s>, tok: Token<'s>, expected: &str) -> Token<'s> {
		match tok {
			Token::Invalid(msg) => self.bail_here(scanner, format_args!("{msg}")),
			Token::Newline | Token::Eof => {
				self.diag.syntax_error(
					&*scanner,
					format_args!("expected {expected}, found {tok}"),
				);
				tok
			}
			other => self.bail_here(
				scanner,
				format_args!("expected {expected}, found {other}"),
			),
		}
	}

	/// Reports at the current token and skips the rest of its line.
	fn bail_here<'s>(&mut self, scanner: &mut Scanner<'s>, args: std::fmt::Arguments) -> Token<'s> {
		self.diag.syntax_error(&*scanner, args);
		scanner.skip_line();
		Token::Newline
	}
}
