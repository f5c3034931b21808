//! Scripted input and snapshot export for the headless runner.

pub mod headless;
pub mod script;
pub mod snapshot;
