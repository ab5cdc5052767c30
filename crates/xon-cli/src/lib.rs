//! Xon CLI crate
//!
//! Headless stand-in for the interactive dashboards that consume the
//! simulation core: it loads a scenario, drives it through the engine, and
//! exports voltage traces and spike times.
//!
//! - `init`: write a default scenario file.
//! - `run`: execute a scenario (or the built-in default), writing JSON or
//!   CSV traces to a file or stdout. Ctrl-C stops the run between ticks and
//!   still exports what was simulated.
//!
//! The binary (src/main.rs) wires up logging and argument parsing, then calls
//! `XonCli::execute()`.

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod scenario;

pub use commands::XonCli;
