//! Calculation logic for the Salary Engine.
//!
//! This module contains the progressive tax engine, the insurance engine,
//! the allowance calculator, the forward (gross to net) converter and the
//! inverse (net to gross) solver, together with the rounding convention
//! both directions share.

mod allowance;
mod forward;
mod insurance;
mod inverse;
mod rounding;
mod tax;

pub use allowance::{AllowanceResult, clamp_dependants, compute_allowance};
pub use forward::{
    ConversionParams, gross_to_net, insurance_breakpoints, resolve_insurance_base,
    unemployment_cap,
};
pub use insurance::{InsuranceResult, compute_insurance};
pub use inverse::{BisectionOutcome, Breakpoint, bisect, net_to_gross};
pub use rounding::{currency_unit, round_to_unit};
pub use tax::{TaxResult, compute_tax};
