//! Salary Engine for progressive income tax and social insurance regimes.
//!
//! This crate converts a gross salary into a net salary with a full
//! breakdown of insurance contributions, allowances and per-bracket tax,
//! and solves the inverse problem: the gross salary that yields a given
//! net. Tax brackets, insurance rates, allowances and regional minimum
//! wages are configuration, loaded from YAML.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod converter;
pub mod error;
pub mod models;

pub use converter::convert;
