//! Core types and utilities for the chargeback allocation engine.
//!
//! This crate provides the foundational types used throughout the chargeback
//! pipeline:
//!
//! - **Records**: `UsageRecord` — one itemized cloud-usage cost line
//! - **Cost tree**: `AppAccountCost`, `VendorCost`, `Invoice`, `InvoiceSet`
//! - **Settings**: `Settings` — attribute-role mapping and run defaults
//! - **Money**: `round2` — the 2-decimal rounding applied to allocated shares
//!
//! # Amounts
//!
//! Costs arrive from vendor billing exports as fractional currency amounts and
//! are carried as `f64`. Allocated shares are rounded to 2 decimal places with
//! [`money::round2`]; sums of already-rounded shares are *not* re-reconciled
//! against the nominal shared total, so a rounding residue of up to one cent
//! per share is an expected property of the output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod invoice;
pub mod money;
pub mod record;
pub mod settings;

pub use error::{ChargebackError, Result};
pub use invoice::{AppAccountCost, Invoice, InvoiceSet, VendorCost};
pub use money::round2;
pub use record::UsageRecord;
pub use settings::Settings;
