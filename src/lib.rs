//! # Symfront Core
//!
//! The symbol table and diagnostics core of a small compiler front end, in a
//! separate library so that the driver binary and tests have something to
//! link against.

pub mod constant;
pub mod diag;
pub mod error;
pub mod names;
pub mod object;
pub mod scan;
pub mod setup;
pub mod symbol;
pub mod table;
pub mod unit;


pub type ErrorBox = Box<dyn std::error::Error + Send + Sync>;
pub type UnitResult = Result<(), error::Error>;
