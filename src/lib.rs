//! # apmec-rs
//!
//! Command-line client for the Apmec MEC orchestration service.
//!
//! The CLI layer here is thin: argument parsing, config loading and
//! output shaping. All protocol logic (retries, pagination, error
//! classification) lives in the `apmec-api` crate.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod errors;
