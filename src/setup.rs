//! Logging initialization and driver configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
	fmt::writer::BoxMakeWriter, prelude::__tracing_subscriber_SubscriberExt,
	util::SubscriberInitExt,
};

use crate::{diag::DEFAULT_MESSAGE_LIMIT, error::Error, table::DumpOrder};

/// Driver settings, read from a JSON file. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// 0 logs warnings only; each step up adds a level, to `TRACE` at 3.
	pub verbosity: u8,
	/// Print each unit's symbol table once it has been processed.
	pub dump: Option<DumpOrder>,
	/// Diagnostics longer than this many bytes are truncated.
	pub message_limit: usize,
	/// Count warnings as failures.
	pub werror: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			verbosity: 0,
			dump: None,
			message_limit: DEFAULT_MESSAGE_LIMIT,
			werror: false,
		}
	}
}

impl Config {
	pub fn from_json(text: &str) -> Result<Self, Error> {
		Ok(serde_json::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, Error> {
		let text = std::fs::read_to_string(path).map_err(|err| {
			Error::from(err).context(format!("failed to read config file: {}", path.display()))
		})?;

		Self::from_json(&text).map_err(|err| {
			err.context(format!("failed to decode config file: {}", path.display()))
		})
	}

	#[must_use]
	pub fn level(&self) -> LevelFilter {
		match self.verbosity {
			0 => LevelFilter::WARN,
			1 => LevelFilter::INFO,
			2 => LevelFilter::DEBUG,
			_ => LevelFilter::TRACE,
		}
	}
}

pub fn logging(level: LevelFilter) {
	/// Like [`tracing_subscriber::fmt::time::Uptime`] but with
	/// hour/minute/second formatting for better clarity.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	struct Uptime(std::time::Instant);

	impl Default for Uptime {
		fn default() -> Self {
			Self(std::time::Instant::now())
		}
	}

	impl tracing_subscriber::fmt::time::FormatTime for Uptime {
		fn format_time(
			&self,
			w: &mut tracing_subscriber::fmt::format::Writer<'_>,
		) -> std::fmt::Result {
			let elapsed = self.0.elapsed().as_secs();
			let hours = elapsed / 3600;
			let mins = (elapsed / 60) % 60;
			let secs = elapsed % 60;
			write!(w, "{hours:02}:{mins:02}:{secs:02}")
		}
	}

	let layer_stderr = tracing_subscriber::fmt::Layer::default()
		.with_timer(Uptime::default())
		.with_ansi(false)
		.with_writer(BoxMakeWriter::new(std::io::stderr));

	let collector = tracing_subscriber::registry()
		.with(layer_stderr)
		.with(level);

	// A subscriber may already be installed, e.g. by a test harness.
	let _ = collector.try_init();
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn config_defaults() {
		let cfg = Config::from_json("{}").unwrap();
		assert_eq!(cfg, Config::default());
		assert_eq!(cfg.message_limit, 132);
		assert_eq!(cfg.level(), LevelFilter::WARN);
	}

	#[test]
	fn config_fields() {
		let cfg =
			Config::from_json(r#"{ "verbosity": 2, "dump": "in-order", "werror": true }"#).unwrap();
		assert_eq!(cfg.dump, Some(DumpOrder::InOrder));
		assert_eq!(cfg.level(), LevelFilter::DEBUG);
		assert!(cfg.werror);

		assert!(Config::from_json(r#"{ "dump": "sideways" }"#).is_err());
		assert!(Config::from_json(r#"{ "colour": true }"#).is_err());
	}
}
