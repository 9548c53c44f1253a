// src/exec/mod.rs

//! Shell command execution for tasks declared in a composefile.
//!
//! - [`command`] turns a command line into a [`TaskFn`](crate::runner::TaskFn)
//!   that runs it through the platform shell.

pub mod command;

pub use command::{command_fn, run_command};
