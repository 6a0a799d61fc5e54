//! HR and payroll analytics services.
//!
//! Every service takes a sea-orm connection plus explicit parameters
//! (including the reference date) and returns a serializable DTO, so the
//! HTTP and GraphQL layers stay thin.

pub mod absence;
pub mod accounts;
pub mod analytics;
pub mod audit;
pub mod compensation;
pub mod costs;
pub mod dashboard;
pub mod error;
pub mod insights;
pub mod lookup;
pub mod period;
pub mod reports;
pub mod seed;
pub mod stats;
pub mod turnover;
pub mod workforce;

#[cfg(test)]
mod testing;

pub use error::{HrError, HrResult};
