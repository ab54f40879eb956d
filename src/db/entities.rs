//! Table definitions
pub mod panels;
