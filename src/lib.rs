//! Speech-bubble compositing for generated comic panels, plus the small
//! service that fetches, renders, stores and records finished panels.

#![allow(clippy::multiple_crate_versions)]
#![deny(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::disallowed_methods)]
#![deny(clippy::expect_used)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::panic)]
#![deny(clippy::perf)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::unreachable)]
#![deny(clippy::unwrap_used)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bubbles;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod fetch;
pub mod storage;
pub mod web;
