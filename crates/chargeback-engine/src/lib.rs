//! The chargeback allocation engine.
//!
//! Two components run in strict sequence over one billing month's data:
//!
//! 1. [`CostTreeBuilder`] consumes the flat list of usage records plus the
//!    materialized asset inventory and produces the three-level cost tree —
//!    customer invoice → vendor cost → application-account cost → records —
//!    along with the records it could not link.
//! 2. [`SharedCostDistributor`] removes the invoices of designated
//!    shared-cost customers, aggregates their cost by vendor, and re-injects
//!    it into the remaining invoices as proportionally-weighted synthetic
//!    vendor lines, followed by the operator-supplied security total.
//!
//! Both components are synchronous, single-threaded computations over
//! in-memory structures; fetching assets and decoding record batches happens
//! before they run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod distributor;

pub use builder::{BuildOutcome, CostTreeBuilder, ResolutionError};
pub use distributor::{
    SharedCostDistributor, NETWORK_SHARED_SELLER, NETWORK_SHARED_VENDOR, SECURITY_SELLER,
    SECURITY_VENDOR,
};
