//! Usage record types.
//!
//! A usage record is one itemized cost line from a vendor billing export,
//! decoded upstream and handed to the engine as-is. The engine never parses
//! the export format; it only links records to accounts and aggregates them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One itemized cloud-usage cost line.
///
/// Records are read-only input except for three fields the engine stamps
/// during processing: `vendor` (from the batch context), `seller` (set when
/// the record is filed under an invoice), and `error` (set when the record
/// cannot be linked to a chargeback account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Product or SKU the cost was metered under.
    pub product_code: String,

    /// Cost in the billing currency. May be negative (credits, refunds).
    pub cost: f64,

    /// Application-account identifier the usage belongs to.
    pub account_id: String,

    /// Cloud vendor the record was reported by.
    #[serde(default)]
    pub vendor: String,

    /// Seller shown on the invoice line.
    #[serde(default)]
    pub seller: String,

    /// Upload batch the record arrived in.
    #[serde(default)]
    pub batch_id: String,

    /// Resolution failure message, set by the builder when the record cannot
    /// be linked. Never present on records filed into the cost tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Extra columns from the upstream export, preserved untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UsageRecord {
    /// Create a record as decoded from a billing export.
    #[must_use]
    pub fn new(
        product_code: impl Into<String>,
        cost: f64,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            cost,
            account_id: account_id.into(),
            vendor: String::new(),
            seller: String::new(),
            batch_id: String::new(),
            error: None,
            extra: BTreeMap::new(),
        }
    }

    /// Set the cloud vendor.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Set the upload batch identifier.
    #[must_use]
    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = batch_id.into();
        self
    }

    /// Create a synthetic record carrying a redistributed shared-cost share.
    ///
    /// Synthetic records have no batch id; their account id is the application
    /// account the share was allocated to.
    #[must_use]
    pub fn synthetic(
        product_code: impl Into<String>,
        cost: f64,
        account_id: impl Into<String>,
        vendor: impl Into<String>,
        seller: impl Into<String>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            cost,
            account_id: account_id.into(),
            vendor: vendor.into(),
            seller: seller.into(),
            batch_id: String::new(),
            error: None,
            extra: BTreeMap::new(),
        }
    }
}
