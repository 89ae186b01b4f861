//! Rendering of job state for the command line

pub mod reporter;

pub use reporter::{ConsoleReporter, JobReporter, JsonReporter};
