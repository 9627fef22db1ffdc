//! Source positions, the [`Locate`] interface, and the line-oriented [`Scanner`]
//! that feeds declaration lists to the core.

use std::sync::OnceLock;

use regex::Regex;

use crate::constant::Constant;

/// A one-based `(line, column)` pair. A non-positive line means "no position".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
	pub line: i32,
	pub col: i32,
}

impl SourcePos {
	#[must_use]
	pub fn new(line: i32, col: i32) -> Self {
		Self { line, col }
	}

	#[must_use]
	pub fn is_known(self) -> bool {
		self.line > 0
	}
}

impl std::fmt::Display for SourcePos {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.col)
	}
}

/// What a scanner reports about where it currently is.
pub trait Locate {
	fn file_name(&self) -> &str;
	fn line(&self) -> i32;
	fn column(&self) -> i32;

	fn position(&self) -> SourcePos {
		SourcePos::new(self.line(), self.column())
	}
}

/// For reports made before any scanning has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nowhere;

impl Locate for Nowhere {
	fn file_name(&self) -> &str {
		""
	}

	fn line(&self) -> i32 {
		0
	}

	fn column(&self) -> i32 {
		0
	}
}

/// A fixed position in a named file, for reports about something scanned
/// before the scanner moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pinned<'f> {
	pub file_name: &'f str,
	pub pos: SourcePos,
}

impl Locate for Pinned<'_> {
	fn file_name(&self) -> &str {
		self.file_name
	}

	fn line(&self) -> i32 {
		self.pos.line
	}

	fn column(&self) -> i32 {
		self.pos.col
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
	Const,
	Private,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'s> {
	Ident(&'s str),
	Keyword(Keyword),
	Literal(Constant),
	Dot,
	Eq,
	ColonEq,
	Colon,
	Newline,
	Eof,
	/// Malformed input; the message says what was wrong.
	Invalid(String),
}

impl std::fmt::Display for Token<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Ident(name) => write!(f, "identifier '{name}'"),
			Self::Keyword(Keyword::Const) => write!(f, "keyword 'const'"),
			Self::Keyword(Keyword::Private) => write!(f, "keyword 'private'"),
			Self::Literal(c) => write!(f, "literal {c}"),
			Self::Dot => write!(f, "'.'"),
			Self::Eq => write!(f, "'='"),
			Self::ColonEq => write!(f, "':='"),
			Self::Colon => write!(f, "':'"),
			Self::Newline => write!(f, "end of line"),
			Self::Eof => write!(f, "end of file"),
			Self::Invalid(msg) => write!(f, "{msg}"),
		}
	}
}

/// Walks source text one token at a time, tracking the file, line, and column
/// of the start of the most recently returned token.
#[derive(Debug)]
pub struct Scanner<'s> {
	file_name: Box<str>,
	src: &'s str,
	offs: usize,
	line: i32,
	line_start: usize,
	tok_pos: SourcePos,
}

impl<'s> Scanner<'s> {
	#[must_use]
	pub fn new(file_name: &str, src: &'s str) -> Self {
		Self {
			file_name: file_name.into(),
			src,
			offs: 0,
			line: 1,
			line_start: 0,
			tok_pos: SourcePos::default(),
		}
	}

	#[must_use]
	fn rest(&self) -> &'s str {
		&self.src[self.offs..]
	}

	#[must_use]
	fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	fn bump(&mut self, len: usize) {
		self.offs += len;
	}

	fn skip_trivia(&mut self) {
		while let Some(c) = self.peek() {
			match c {
				'#' => {
					let len = self.rest().find('\n').unwrap_or(self.rest().len());
					self.bump(len);
				}
				'\n' => break,
				c if c.is_whitespace() => self.bump(c.len_utf8()),
				_ => break,
			}
		}
	}

	pub fn next_token(&mut self) -> Token<'s> {
		self.skip_trivia();

		let col = self.src[self.line_start..self.offs].chars().count() as i32 + 1;
		self.tok_pos = SourcePos::new(self.line, col);

		let Some(c) = self.peek() else {
			return Token::Eof;
		};

		match c {
			'\n' => {
				self.bump(1);
				self.line += 1;
				self.line_start = self.offs;
				Token::Newline
			}
			'.' => {
				self.bump(1);
				Token::Dot
			}
			'=' => {
				self.bump(1);
				Token::Eq
			}
			':' => {
				if self.rest().starts_with(":=") {
					self.bump(2);
					Token::ColonEq
				} else {
					self.bump(1);
					Token::Colon
				}
			}
			'"' => self.string(),
			'-' | '0'..='9' => self.number(),
			c if c.is_ascii_alphabetic() || c == '_' => self.word(),
			other => {
				self.bump(other.len_utf8());
				Token::Invalid(format!("unexpected character '{}'", other.escape_default()))
			}
		}
	}

	fn word(&mut self) -> Token<'s> {
		let rest = self.rest();
		let len = rest
			.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
			.unwrap_or(rest.len());
		let word = &rest[..len];
		self.bump(len);

		match word {
			"const" => Token::Keyword(Keyword::Const),
			"private" => Token::Keyword(Keyword::Private),
			"true" => Token::Literal(Constant::Bool(true)),
			"false" => Token::Literal(Constant::Bool(false)),
			_ => Token::Ident(word),
		}
	}

	fn number(&mut self) -> Token<'s> {
		static NUMBER: OnceLock<Regex> = OnceLock::new();

		let regex = NUMBER.get_or_init(|| {
			Regex::new(r"^-?[0-9]+(?P<frac>\.[0-9]+)?(?P<exp>[eE][+-]?[0-9]+)?(?P<unsigned>[uU])?")
				.unwrap()
		});

		let rest = self.rest();

		let Some(caps) = regex.captures(rest) else {
			self.bump(1);
			return Token::Invalid("'-' must be followed by a digit".to_string());
		};

		let whole = caps.get(0).map_or("", |m| m.as_str());
		self.bump(whole.len());

		let is_float = caps.name("frac").is_some() || caps.name("exp").is_some();

		if caps.name("unsigned").is_some() {
			let digits = &whole[..(whole.len() - 1)];

			if is_float || digits.starts_with('-') {
				return Token::Invalid(format!("invalid unsigned literal '{whole}'"));
			}

			return match digits.parse::<u64>() {
				Ok(u) => Token::Literal(Constant::UnsignedInt(u)),
				Err(err) => Token::Invalid(format!("invalid unsigned literal '{whole}': {err}")),
			};
		}

		if is_float {
			match whole.parse::<f64>() {
				Ok(f) => Token::Literal(Constant::Float(f)),
				Err(err) => Token::Invalid(format!("invalid float literal '{whole}': {err}")),
			}
		} else {
			match whole.parse::<i64>() {
				Ok(i) => Token::Literal(Constant::SignedInt(i)),
				Err(err) => Token::Invalid(format!("invalid integer literal '{whole}': {err}")),
			}
		}
	}

	fn string(&mut self) -> Token<'s> {
		self.bump(1);
		let mut text = String::new();

		loop {
			let Some(c) = self.peek() else {
				return Token::Invalid("unterminated string literal".to_string());
			};

			match c {
				'"' => {
					self.bump(1);
					return Token::Literal(Constant::String(text.into_boxed_str()));
				}
				'\n' => {
					return Token::Invalid("unterminated string literal".to_string());
				}
				'\\' => {
					self.bump(1);

					let escaped = match self.peek() {
						Some('n') => '\n',
						Some('t') => '\t',
						Some('"') => '"',
						Some('\\') => '\\',
						Some(other) => {
							self.bump(other.len_utf8());
							return Token::Invalid(format!(
								"unknown escape sequence '\\{}'",
								other.escape_default()
							));
						}
						None => return Token::Invalid("unterminated string literal".to_string()),
					};

					self.bump(1);
					text.push(escaped);
				}
				other => {
					self.bump(other.len_utf8());
					text.push(other);
				}
			}
		}
	}

	/// Discards everything up to (but not including) the next newline.
	pub fn skip_line(&mut self) {
		let len = self.rest().find('\n').unwrap_or(self.rest().len());
		self.bump(len);
	}
}

impl Locate for Scanner<'_> {
	fn file_name(&self) -> &str {
		&self.file_name
	}

	fn line(&self) -> i32 {
		self.tok_pos.line
	}

	fn column(&self) -> i32 {
		self.tok_pos.col
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn tokens(src: &str) -> Vec<Token> {
		let mut scanner = Scanner::new("test", src);
		let mut ret = vec![];

		loop {
			match scanner.next_token() {
				Token::Eof => break,
				tok => ret.push(tok),
			}
		}

		ret
	}

	#[test]
	fn literals() {
		assert_eq!(
			tokens(r#"-12 7u 1.5 2e3 true "a\"b\n""#),
			vec![
				Token::Literal(Constant::SignedInt(-12)),
				Token::Literal(Constant::UnsignedInt(7)),
				Token::Literal(Constant::Float(1.5)),
				Token::Literal(Constant::Float(2000.0)),
				Token::Literal(Constant::Bool(true)),
				Token::Literal(Constant::string("a\"b\n")),
			]
		);
	}

	#[test]
	fn malformed() {
		assert!(matches!(tokens("-1u")[0], Token::Invalid(_)));
		assert!(matches!(tokens("\"abc")[0], Token::Invalid(_)));
		assert!(matches!(tokens("99999999999999999999")[0], Token::Invalid(_)));
		assert!(matches!(tokens("@")[0], Token::Invalid(_)));
	}

	#[test]
	fn positions() {
		let mut scanner = Scanner::new("pos.sym", "a = 1 # comment\n  const b");
		assert_eq!(scanner.position(), SourcePos::default());

		assert_eq!(scanner.next_token(), Token::Ident("a"));
		assert_eq!(scanner.position(), SourcePos::new(1, 1));
		assert_eq!(scanner.next_token(), Token::Eq);
		assert_eq!(scanner.position(), SourcePos::new(1, 3));
		assert_eq!(scanner.next_token(), Token::Literal(Constant::SignedInt(1)));
		assert_eq!(scanner.next_token(), Token::Newline);
		assert_eq!(scanner.next_token(), Token::Keyword(Keyword::Const));
		assert_eq!(scanner.position(), SourcePos::new(2, 3));
		assert_eq!(scanner.next_token(), Token::Ident("b"));
		assert_eq!(scanner.position(), SourcePos::new(2, 9));
		assert_eq!(scanner.file_name(), "pos.sym");
	}
}
