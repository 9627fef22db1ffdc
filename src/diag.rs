//! [`Diagnostics`]: counted, position-tagged reports of syntax errors,
//! warnings, and fatal conditions.
//!
//! One `Diagnostics` exists per compilation unit. It is constructed before
//! scanning starts, passed by reference to whatever needs to report, and its
//! counters are read once the unit has been processed.

use std::{
	fmt::{self, Write as _},
	io::Write,
};

use crate::scan::Locate;

/// Reports longer than this many bytes are truncated.
pub const DEFAULT_MESSAGE_LIMIT: usize = 132;

/// Called by [`Diagnostics::fatal`] after the report has been emitted.
/// Must not return; the default is [`std::process::exit`].
pub type Terminator = fn(i32) -> !;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
	Syntax,
	Warning,
	Fatal,
}

impl Severity {
	#[must_use]
	fn prefix(self) -> &'static str {
		match self {
			Self::Syntax => "Syntax Error",
			Self::Warning => "Warning",
			Self::Fatal => "FATAL ERROR",
		}
	}
}

/// Where an [`internal_assert!`](crate::internal_assert) or
/// [`trace_message!`](crate::trace_message) was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSite {
	pub file: &'static str,
	pub func: &'static str,
	pub line: u32,
}

impl CheckSite {
	#[must_use]
	fn file_name(&self) -> &'static str {
		self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
	}
}

pub struct Diagnostics {
	errors: u32,
	warnings: u32,
	sink: Box<dyn Write>,
	terminate: Terminator,
	limit: usize,
}

impl std::fmt::Debug for Diagnostics {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Diagnostics")
			.field("errors", &self.errors)
			.field("warnings", &self.warnings)
			.field("limit", &self.limit)
			.finish_non_exhaustive()
	}
}

impl Default for Diagnostics {
	fn default() -> Self {
		Self::with_sink(std::io::stderr())
	}
}

impl Diagnostics {
	#[must_use]
	pub fn with_sink(sink: impl Write + 'static) -> Self {
		Self {
			errors: 0,
			warnings: 0,
			sink: Box::new(sink),
			terminate: std::process::exit,
			limit: DEFAULT_MESSAGE_LIMIT,
		}
	}

	pub fn set_terminator(&mut self, terminate: Terminator) {
		self.terminate = terminate;
	}

	pub fn set_message_limit(&mut self, limit: usize) {
		self.limit = limit;
	}

	#[must_use]
	pub fn error_count(&self) -> u32 {
		self.errors
	}

	#[must_use]
	pub fn warning_count(&self) -> u32 {
		self.warnings
	}

	/// Counts an error that was reported through some other channel.
	pub fn bump_errors(&mut self) {
		self.errors += 1;
	}

	/// Counts a warning that was reported through some other channel.
	pub fn bump_warnings(&mut self) {
		self.warnings += 1;
	}

	pub fn syntax_error(&mut self, loc: &dyn Locate, args: fmt::Arguments) {
		self.errors += 1;
		self.report(Severity::Syntax, loc, args);
	}

	pub fn warning(&mut self, loc: &dyn Locate, args: fmt::Arguments) {
		self.warnings += 1;
		self.report(Severity::Warning, loc, args);
	}

	/// Counts and emits the report, then terminates the process.
	/// Callers must not expect any cleanup to happen afterwards.
	pub fn fatal(&mut self, args: fmt::Arguments) -> ! {
		self.errors += 1;
		let mut msg = Bounded::new(self.limit);
		let _ = write!(msg, "{}: ", Severity::Fatal.prefix());
		let _ = msg.write_fmt(args);
		self.emit(&msg.0);
		self.abort()
	}

	/// Behaves like [`Self::fatal`] if `cond` is `false`, additionally naming
	/// the site of the check and the text of the failed condition.
	/// Prefer the [`internal_assert!`](crate::internal_assert) macro.
	pub fn check(&mut self, site: CheckSite, cond: bool, expr: &str, args: fmt::Arguments) {
		if cond {
			return;
		}

		self.errors += 1;
		let mut msg = Bounded::new(self.limit);
		let _ = write!(
			msg,
			"fatal error: {}: {}:{} assert failed: ({expr}): ",
			site.file_name(),
			site.func,
			site.line
		);
		let _ = msg.write_fmt(args);
		self.emit(&msg.0);
		self.abort()
	}

	/// A developer trace message. Goes to the log rather than the sink and
	/// never affects the counters.
	pub fn message(&self, site: CheckSite, args: fmt::Arguments) {
		tracing::trace!(
			file = site.file_name(),
			func = site.func,
			line = site.line,
			"{args}"
		);
	}

	/// `errors: N warnings: M`.
	#[must_use]
	pub fn tally(&self) -> String {
		format!("errors: {} warnings: {}", self.errors, self.warnings)
	}

	fn report(&mut self, severity: Severity, loc: &dyn Locate, args: fmt::Arguments) {
		let mut msg = Bounded::new(self.limit);
		let pos = loc.position();

		let _ = if pos.is_known() {
			write!(
				msg,
				"{}: {}: {}: {}: ",
				severity.prefix(),
				loc.file_name(),
				pos.line,
				pos.col
			)
		} else {
			write!(msg, "{}: ", severity.prefix())
		};

		let _ = msg.write_fmt(args);
		self.emit(&msg.0);
	}

	fn emit(&mut self, msg: &str) {
		// Nothing sensible can be done if the sink itself fails.
		let _ = writeln!(self.sink, "{msg}");
	}

	fn abort(&mut self) -> ! {
		let _ = self.sink.flush();
		(self.terminate)(1)
	}
}

/// A string which silently drops whatever would take it past `limit` bytes.
struct Bounded(String, usize);

impl Bounded {
	#[must_use]
	fn new(limit: usize) -> Self {
		Self(String::with_capacity(limit), limit)
	}
}

impl fmt::Write for Bounded {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		let room = self.1.saturating_sub(self.0.len());

		if s.len() <= room {
			self.0.push_str(s);
			return Ok(());
		}

		let mut end = room;

		while !s.is_char_boundary(end) {
			end -= 1;
		}

		self.0.push_str(&s[..end]);
		Ok(())
	}
}

/// Fatal unless `cond` holds. The report names this call's file, module,
/// and line along with the text of `cond`.
#[macro_export]
macro_rules! internal_assert {
	($diag:expr, $cond:expr, $($arg:tt)+) => {
		$diag.check(
			$crate::diag::CheckSite {
				file: file!(),
				func: module_path!(),
				line: line!(),
			},
			$cond,
			stringify!($cond),
			format_args!($($arg)+),
		)
	};
}

/// [`Diagnostics::message`] with the call site filled in.
#[macro_export]
macro_rules! trace_message {
	($diag:expr, $($arg:tt)+) => {
		$diag.message(
			$crate::diag::CheckSite {
				file: file!(),
				func: module_path!(),
				line: line!(),
			},
			format_args!($($arg)+),
		)
	};
}

/// An in-memory sink whose contents stay readable after being handed over.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct Capture(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

#[cfg(test)]
impl Capture {
	#[must_use]
	pub(crate) fn text(&self) -> String {
		String::from_utf8_lossy(&self.0.borrow()).into_owned()
	}
}

#[cfg(test)]
impl Write for Capture {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.borrow_mut().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

/// Stands in for [`std::process::exit`] so fatal paths can be caught.
#[cfg(test)]
pub(crate) fn panic_exit(code: i32) -> ! {
	panic!("process exit requested with code {code}")
}

#[cfg(test)]
mod test {
	use std::panic::{catch_unwind, AssertUnwindSafe};

	use crate::scan::{Nowhere, Pinned, SourcePos};

	use super::*;

	fn at(line: i32, col: i32) -> Pinned<'static> {
		Pinned {
			file_name: "main.sym",
			pos: SourcePos::new(line, col),
		}
	}

	#[test]
	fn location_prefix() {
		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());

		diag.syntax_error(&at(3, 7), format_args!("bad {}", "token"));
		diag.warning(&at(4, 1), format_args!("unused"));
		diag.syntax_error(&Nowhere, format_args!("no input"));

		assert_eq!(diag.error_count(), 2);
		assert_eq!(diag.warning_count(), 1);
		assert_eq!(
			out.text(),
			"Syntax Error: main.sym: 3: 7: bad token\n\
			Warning: main.sym: 4: 1: unused\n\
			Syntax Error: no input\n"
		);
		assert_eq!(diag.tally(), "errors: 2 warnings: 1");
	}

	#[test]
	fn bumps_are_silent() {
		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());
		diag.bump_errors();
		diag.bump_warnings();
		diag.bump_warnings();
		assert_eq!(diag.tally(), "errors: 1 warnings: 2");
		assert!(out.text().is_empty());
	}

	#[test]
	fn truncation() {
		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());
		diag.set_message_limit(20);
		diag.warning(&Nowhere, format_args!("{}", "é".repeat(20)));
		// "Warning: " is 9 bytes; 'é' is 2, so 5 fit in the remaining 11.
		assert_eq!(out.text(), format!("Warning: {}\n", "é".repeat(5)));

		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());
		diag.warning(&Nowhere, format_args!("{}", "x".repeat(500)));
		assert_eq!(out.text().trim_end().len(), DEFAULT_MESSAGE_LIMIT);
	}

	#[test]
	fn fatal_counts_then_terminates() {
		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());
		diag.set_terminator(panic_exit);

		let result = catch_unwind(AssertUnwindSafe(|| {
			diag.fatal(format_args!("cannot allocate {} bytes", 64));
		}));

		assert!(result.is_err());
		assert_eq!(diag.error_count(), 1);
		assert_eq!(out.text(), "FATAL ERROR: cannot allocate 64 bytes\n");
	}

	#[test]
	fn internal_assert() {
		let out = Capture::default();
		let mut diag = Diagnostics::with_sink(out.clone());
		diag.set_terminator(panic_exit);

		crate::internal_assert!(diag, 1 + 1 == 2, "arithmetic");
		assert_eq!(diag.error_count(), 0);
		assert!(out.text().is_empty());

		let depth = 3;
		let result = catch_unwind(AssertUnwindSafe(|| {
			crate::internal_assert!(diag, depth < 2, "depth is {depth}");
		}));

		assert!(result.is_err());
		assert_eq!(diag.error_count(), 1);

		let text = out.text();
		assert!(text.starts_with("fatal error: diag.rs: symfront::diag::test:"));
		assert!(text.ends_with("assert failed: (depth < 2): depth is 3\n"));
	}
}
