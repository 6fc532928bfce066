//! Core data models for the Salary Engine.
//!
//! This module contains the request and result types shared by every
//! calculation.

mod conversion_result;
mod salary_input;

pub use conversion_result::{
    AuditStep, AuditTrace, BracketTax, ConversionResult, InsuranceBase, InsuranceContributions,
    SolverStrategy, SolverTrace,
};
pub use salary_input::{Direction, SalaryInput};
