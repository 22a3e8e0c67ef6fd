//! Error types for the chargeback engine.

/// Result type for chargeback operations.
pub type Result<T> = std::result::Result<T, ChargebackError>;

/// Errors that can abort a chargeback run.
///
/// Per-record resolution failures are *not* represented here; they are stamped
/// onto the offending [`crate::UsageRecord`] and collected into the builder's
/// error list without interrupting the run.
#[derive(Debug, thiserror::Error)]
pub enum ChargebackError {
    /// The billing-month label does not denote a real calendar month.
    #[error("invalid billing month: {0} (expected YYYY-MM)")]
    InvalidBillingMonth(String),

    /// A required setting is empty.
    #[error("configuration error: setting {0} is empty")]
    MissingSetting(&'static str),

    /// An application account carries vendor cost but has no entry in the
    /// invoice's per-account totals. The cost tree is inconsistent and the
    /// cycle must be aborted rather than emit a partially-allocated result.
    #[error(
        "application account {app_id} not found in invoice {customer} \
         totals while allocating shared network cost"
    )]
    MissingAppAccountTotal {
        /// The application account missing from the per-account totals.
        app_id: String,
        /// The customer whose invoice is inconsistent.
        customer: String,
    },
}
