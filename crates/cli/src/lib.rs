//! Library side of the `rhead` binary: argument model, source resolution,
//! logging bootstrap, and the run wiring used by `main.rs` and the tests.

pub mod app;
pub mod args;
pub mod logging;
pub mod sources;
