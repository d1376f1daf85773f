//! Taglet - inline translation tag collector
//!
//! Taglet is a CLI tool and library that scans application source files for
//! inline translation tag calls, aggregates the declared strings into
//! namespaced JSON dictionaries, and keeps the in-source tag configuration in
//! sync with the namespace resolution policy. In library mode it instead
//! emits an export snapshot that consuming projects can import.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing and dispatch)
//! - `config`: Configuration file loading and parsing
//! - `core`: Core collection engine (match, parse, resolve, merge, write)
//! - `discovery`: Source file discovery from include/exclude patterns
//! - `logger`: Leveled structured logging sink
//! - `report`: End-of-run summary formatting

pub mod cli;
pub mod config;
pub mod core;
pub mod discovery;
pub mod logger;
pub mod report;
