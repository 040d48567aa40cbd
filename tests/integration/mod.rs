//! Cross-component integration tests.

mod cache;
mod closures;
mod control_flow;
mod scenarios;
