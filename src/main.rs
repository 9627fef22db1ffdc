//! # Symfront
//!
//! Runs declaration lists through the symbol table core, one compilation unit
//! per input file, and reports the diagnostics tally.

use std::{
	path::{Path, PathBuf},
	process::ExitCode,
};

use symfront::{
	diag::Diagnostics,
	error::Error,
	setup::{self, Config},
	table::DumpOrder,
	unit::Unit,
};
use tracing::{debug, error, info};

const USAGE: &str = concat!(
	"usage: symfront [--config FILE] [--verbosity N] [--dump [post-order|in-order]] ",
	"INPUT... [VERBOSITY]"
);

/// Directories given as inputs are searched for files with this extension.
const SOURCE_EXT: &str = "sym";

#[derive(Debug, Default)]
struct Args {
	inputs: Vec<PathBuf>,
	config: Option<PathBuf>,
	verbosity: Option<u8>,
	dump: Option<DumpOrder>,
}

fn main() -> ExitCode {
	let args = match parse_args(std::env::args().skip(1)) {
		Ok(a) => a,
		Err(err) => {
			eprintln!("{err}");
			eprintln!("{USAGE}");
			return ExitCode::from(2);
		}
	};

	let config = match configure(&args) {
		Ok(c) => c,
		Err(err) => {
			eprintln!("{err}");
			return ExitCode::from(2);
		}
	};

	setup::logging(config.level());
	debug!("Configuration: {config:#?}");

	let tally = run(&args.inputs, &config);
	println!("{tally}");

	if tally.failed {
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Counters summed over every unit in a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
	errors: u32,
	warnings: u32,
	/// Units which were read and processed.
	units: usize,
	failed: bool,
}

impl Tally {
	fn add(&mut self, unit: &Unit, werror: bool) {
		self.errors += unit.diag().error_count();
		self.warnings += unit.diag().warning_count();
		self.units += 1;
		self.failed |= !unit.succeeded(werror);
	}

	/// An input which could not be turned into a unit at all.
	fn input_failed(&mut self, err: &Error) {
		error!("{err}");
		self.errors += 1;
		self.failed = true;
	}
}

impl std::fmt::Display for Tally {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "errors: {} warnings: {}", self.errors, self.warnings)
	}
}

fn parse_args(argv: impl Iterator<Item = String>) -> Result<Args, Error> {
	let mut argv = argv.peekable();
	let mut args = Args::default();
	let mut positional = vec![];

	while let Some(arg) = argv.next() {
		match arg.as_str() {
			"--config" => {
				let path = argv
					.next()
					.ok_or_else(|| Error::msg("`--config` requires a file path"))?;
				args.config = Some(PathBuf::from(path));
			}
			"--verbosity" => {
				let level = argv
					.next()
					.ok_or_else(|| Error::msg("`--verbosity` requires a number"))?;
				args.verbosity = Some(parse_verbosity(&level)?);
			}
			"--dump" => {
				// The order is optional; post-order when omitted.
				let order = match argv.next_if(|a| a == "in-order" || a == "post-order") {
					Some(a) if a == "in-order" => DumpOrder::InOrder,
					_ => DumpOrder::PostOrder,
				};

				args.dump = Some(order);
			}
			other if other.starts_with("--") => {
				return Err(Error::msg(format!("unknown option: {other}")));
			}
			_ => positional.push(arg),
		}
	}

	// `prog INPUT VERBOSITY`: a trailing number after exactly one input.
	if positional.len() == 2 && args.verbosity.is_none() {
		if let Ok(level) = positional[1].parse::<u8>() {
			args.verbosity = Some(level);
			positional.pop();
		}
	}

	if positional.is_empty() {
		return Err(Error::msg("no input files"));
	}

	args.inputs = positional.into_iter().map(PathBuf::from).collect();
	Ok(args)
}

fn parse_verbosity(text: &str) -> Result<u8, Error> {
	text.parse::<u8>()
		.map_err(|_| Error::msg(format!("invalid verbosity: {text}")))
}

fn configure(args: &Args) -> Result<Config, Error> {
	let mut config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};

	if let Some(v) = args.verbosity {
		config.verbosity = v;
	}

	if args.dump.is_some() {
		config.dump = args.dump;
	}

	Ok(config)
}

/// Expands directories into the source files beneath them, sorted by path.
/// A directory entry which cannot be read yields an `Err` in its place.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<Result<PathBuf, Error>> {
	let mut ret = vec![];

	for input in inputs {
		if !input.is_dir() {
			ret.push(Ok(input.clone()));
			continue;
		}

		let walker = walkdir::WalkDir::new(input)
			.follow_links(false)
			.sort_by_file_name();

		for entry in walker {
			match entry {
				Ok(e) => {
					if e.file_type().is_file()
						&& e.path().extension().is_some_and(|ext| ext == SOURCE_EXT)
					{
						ret.push(Ok(e.into_path()));
					}
				}
				Err(err) => ret.push(Err(Error::from(err))),
			}
		}
	}

	ret
}

/// Processes every input, continuing past any that cannot be read.
fn run(inputs: &[PathBuf], config: &Config) -> Tally {
	let files = collect_inputs(inputs);
	info!("Processing {} input file(s).", files.len());

	let mut tally = Tally::default();

	for file in files {
		let unit = match file.and_then(|path| process(&path, config)) {
			Ok(u) => u,
			Err(err) => {
				tally.input_failed(&err);
				continue;
			}
		};

		tally.add(&unit, config.werror);
	}

	tally
}

fn process(path: &Path, config: &Config) -> Result<Unit, Error> {
	let src = std::fs::read_to_string(path).map_err(|err| {
		Error::from(err).context(format!("failed to read: {}", path.display()))
	})?;

	let mut diag = Diagnostics::default();
	diag.set_message_limit(config.message_limit);

	let mut unit = Unit::new(diag);
	unit.run(&path.to_string_lossy(), &src);

	if let Some(order) = config.dump {
		let mut stdout = std::io::stdout().lock();
		unit.table().dump(order, &mut stdout)?;
	}

	Ok(unit)
}

#[cfg(test)]
mod test {
	use super::*;

	/// A scratch directory under the system temp dir, removed on drop.
	struct Scratch(PathBuf);

	impl Scratch {
		fn new(name: &str) -> Self {
			let dir = std::env::temp_dir().join(format!("symfront-{name}-{}", std::process::id()));
			std::fs::create_dir_all(&dir).unwrap();
			Self(dir)
		}

		fn file(&self, name: &str, src: &str) -> PathBuf {
			let path = self.0.join(name);
			std::fs::write(&path, src).unwrap();
			path
		}
	}

	impl Drop for Scratch {
		fn drop(&mut self) {
			let _ = std::fs::remove_dir_all(&self.0);
		}
	}

	#[test]
	fn unreadable_input_does_not_stop_the_run() {
		let scratch = Scratch::new("unreadable");
		let a = scratch.file("a.sym", "x = 1\nx = 2\n");
		let missing = scratch.0.join("missing.sym");
		let b = scratch.file("b.sym", "y := 3\n");

		let tally = run(&[a, missing, b], &Config::default());

		assert_eq!(tally.units, 2);
		assert_eq!(tally.errors, 3);
		assert_eq!(tally.warnings, 0);
		assert!(tally.failed);
		assert_eq!(tally.to_string(), "errors: 3 warnings: 0");
	}

	#[test]
	fn directories_and_werror() {
		let scratch = Scratch::new("walk");
		scratch.file("one.sym", "fwd\nv = fwd\n");
		scratch.file("notes.txt", "not = a unit = at all\n");

		let tally = run(&[scratch.0.clone()], &Config::default());
		assert_eq!(tally.units, 1);
		assert_eq!(tally.warnings, 1);
		assert!(!tally.failed);

		let config = Config {
			werror: true,
			..Config::default()
		};

		assert!(run(&[scratch.0.clone()], &config).failed);
	}

	#[test]
	fn arguments() {
		let argv = |s: &str| s.split_whitespace().map(str::to_owned).collect::<Vec<_>>();

		let args = parse_args(argv("main.sym 2").into_iter()).unwrap();
		assert_eq!(args.inputs, [PathBuf::from("main.sym")]);
		assert_eq!(args.verbosity, Some(2));

		let args = parse_args(argv("--dump in-order a.sym b.sym").into_iter()).unwrap();
		assert_eq!(args.dump, Some(DumpOrder::InOrder));
		assert_eq!(args.inputs.len(), 2);

		let args = parse_args(argv("--dump a.sym").into_iter()).unwrap();
		assert_eq!(args.dump, Some(DumpOrder::PostOrder));
		assert_eq!(args.inputs, [PathBuf::from("a.sym")]);

		assert!(parse_args(argv("--verbosity").into_iter()).is_err());
		assert!(parse_args(argv("--colour a.sym").into_iter()).is_err());
		assert!(parse_args(std::iter::empty()).is_err());
	}
}
