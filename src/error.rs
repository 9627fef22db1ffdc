use crate::ErrorBox;

/// The recoverable outcomes of a [symbol table](crate::table::SymbolTable)
/// operation. Callers decide whether any of these warrants a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymError {
	NotFound,
	AlreadyExists,
	/// The entry exists but holds no value yet.
	NotAssigned,
}

impl std::error::Error for SymError {}

impl std::fmt::Display for SymError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::NotFound => "NOT_FOUND",
			Self::AlreadyExists => "EXISTS",
			Self::NotAssigned => "NOT_ASSIGNED",
		};

		f.write_str(s)
	}
}

/// Failures of the driver around the core: reading inputs and configuration.
#[derive(Debug)]
pub enum Error {
	Process {
		source: Option<ErrorBox>,
		ctx: String,
	},
}

impl Error {
	#[must_use]
	pub fn msg(ctx: impl Into<String>) -> Self {
		Self::Process {
			source: None,
			ctx: ctx.into(),
		}
	}

	/// Replaces the generic context attached by a `From` conversion.
	#[must_use]
	pub fn context(self, ctx: impl Into<String>) -> Self {
		match self {
			Self::Process { source, .. } => Self::Process {
				source,
				ctx: ctx.into(),
			},
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Process { source, .. } => source
				.as_deref()
				.map(|s| s as &(dyn std::error::Error + 'static)),
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Process { source, ctx } => match source {
				Some(s) => {
					write!(f, "{ctx}: {s}")
				}
				None => {
					write!(f, "{ctx}")
				}
			},
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(value: std::io::Error) -> Self {
		Self::Process {
			source: Some(Box::new(value)),
			ctx: "file I/O failure".to_string(),
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(value: serde_json::Error) -> Self {
		Self::Process {
			source: Some(Box::new(value)),
			ctx: "failed to decode configuration".to_string(),
		}
	}
}

impl From<walkdir::Error> for Error {
	fn from(value: walkdir::Error) -> Self {
		Self::Process {
			source: Some(Box::new(value)),
			ctx: "failed to walk an input directory".to_string(),
		}
	}
}
