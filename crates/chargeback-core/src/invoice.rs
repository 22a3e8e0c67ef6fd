//! The invoice cost tree.
//!
//! Costs aggregate over three levels: an [`InvoiceSet`] holds one [`Invoice`]
//! per chargeback customer, each invoice holds one [`VendorCost`] per cloud
//! vendor, and each vendor cost holds one [`AppAccountCost`] per application
//! account, which in turn holds the source records. Invoices additionally
//! keep a second, vendor-agnostic aggregation per application account in
//! [`Invoice::total_by_app_account`].
//!
//! Every `total_amount` on the tree is a running sum maintained as records
//! are filed, never recomputed from scratch. The [`Invoice::vendor_total`]
//! and [`Invoice::app_account_total`] helpers recompute the sums from the
//! children for consistency checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::UsageRecord;

/// Aggregated cost of one application account, with its source records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppAccountCost {
    /// Application-account identifier.
    pub app_id: String,

    /// Human-readable application name from the asset inventory.
    pub app_name: String,

    /// Running sum of the costs of all records filed under this account.
    pub total_amount: f64,

    /// The records themselves.
    pub records: Vec<UsageRecord>,
}

impl AppAccountCost {
    /// Create an empty cost node for an application account.
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
            total_amount: 0.0,
            records: Vec::new(),
        }
    }

    /// File a record under this account and move the running total with it.
    pub fn add_record(&mut self, record: UsageRecord) {
        self.total_amount += record.cost;
        self.records.push(record);
    }
}

/// Aggregated cost of one cloud vendor inside an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorCost {
    /// Vendor name.
    pub vendor: String,

    /// Running sum of all child account totals.
    pub total_amount: f64,

    /// Per-application-account breakdown, keyed by application-account id.
    pub accounts_by_id: BTreeMap<String, AppAccountCost>,
}

impl VendorCost {
    /// Create an empty cost node for a vendor.
    #[must_use]
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            total_amount: 0.0,
            accounts_by_id: BTreeMap::new(),
        }
    }

    /// Return the cost node for an application account, creating it in place
    /// if this vendor has not billed that account yet.
    pub fn account_entry(&mut self, app_id: &str, app_name: &str) -> &mut AppAccountCost {
        self.accounts_by_id
            .entry(app_id.to_string())
            .or_insert_with(|| AppAccountCost::new(app_id, app_name))
    }
}

/// One customer invoice for a billing month.
///
/// Keyed in the [`InvoiceSet`] by `customer_id` — the asset-inventory identity
/// of the chargeback account — not by the display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Chargeback-account asset identity.
    pub customer_id: String,

    /// Customer (project) name shown on the invoice.
    pub customer: String,

    /// Billing month label, `YYYY-MM`.
    pub billing_month: String,

    /// Cost center charged.
    pub cost_center: String,

    /// Legal entity the charge is booked under.
    pub legal_entity: String,

    /// Chargeback-account owner.
    pub owner: String,

    /// Financial controller.
    pub controller: String,

    /// Business unit.
    pub business_unit: String,

    /// Tenant.
    pub tenant: String,

    /// Reporting unit (sold-to).
    pub reporting_unit: String,

    /// SAP account the settlement posts to.
    pub sap_account: String,

    /// De-duplicated contact addresses notified when the invoice is issued.
    pub emails_to_notify: Vec<String>,

    /// Operator-set exclusion flag. Ignored invoices are removed during
    /// distribution and contribute to no totals.
    #[serde(default)]
    pub ignore: bool,

    /// Running sum of all costs filed under this invoice.
    pub total_amount: f64,

    /// Per-vendor breakdown, keyed by vendor name.
    pub costs_by_vendor: BTreeMap<String, VendorCost>,

    /// Vendor-agnostic per-application-account aggregation, keyed by
    /// application-account id.
    pub total_by_app_account: BTreeMap<String, AppAccountCost>,
}

impl Invoice {
    /// Create an empty invoice for a customer.
    #[must_use]
    pub fn new(
        customer_id: impl Into<String>,
        customer: impl Into<String>,
        billing_month: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            customer: customer.into(),
            billing_month: billing_month.into(),
            cost_center: String::new(),
            legal_entity: String::new(),
            owner: String::new(),
            controller: String::new(),
            business_unit: String::new(),
            tenant: String::new(),
            reporting_unit: String::new(),
            sap_account: String::new(),
            emails_to_notify: Vec::new(),
            ignore: false,
            total_amount: 0.0,
            costs_by_vendor: BTreeMap::new(),
            total_by_app_account: BTreeMap::new(),
        }
    }

    /// Return the cost node for a vendor, creating it in place if this
    /// invoice carries no cost for that vendor yet.
    pub fn vendor_entry(&mut self, vendor: &str) -> &mut VendorCost {
        self.costs_by_vendor
            .entry(vendor.to_string())
            .or_insert_with(|| VendorCost::new(vendor))
    }

    /// Sum of all vendor totals, recomputed from the children.
    ///
    /// Equals `total_amount` on a consistent tree.
    #[must_use]
    pub fn vendor_total(&self) -> f64 {
        self.costs_by_vendor.values().map(|v| v.total_amount).sum()
    }

    /// Sum of all per-application-account totals, recomputed from the
    /// children.
    ///
    /// Equals `total_amount` only before security distribution: the security
    /// pass raises the invoice total without touching
    /// [`Self::total_by_app_account`].
    #[must_use]
    pub fn app_account_total(&self) -> f64 {
        self.total_by_app_account
            .values()
            .map(|a| a.total_amount)
            .sum()
    }
}

/// The root of the cost tree: every invoice of one billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSet {
    /// Billing month label, `YYYY-MM`.
    pub billing_month: String,

    /// Sum of all directly-billed invoice totals. Excludes shared-cost
    /// customers and ignored invoices; zero until distribution runs.
    pub total_amount: f64,

    /// Total cost extracted from shared-cost customers' invoices.
    pub network_shared_costs: f64,

    /// Operator-supplied security cost total for the cycle.
    pub security_shared_costs: f64,

    /// `total_amount` plus both shared-cost totals; set when distribution
    /// completes.
    pub grand_total: f64,

    /// Directly-billed cost per vendor, keyed by vendor name.
    pub total_by_vendor: BTreeMap<String, f64>,

    /// Invoices keyed by chargeback-account identity.
    pub invoices: BTreeMap<String, Invoice>,
}

impl InvoiceSet {
    /// Create an empty invoice set for a billing month.
    #[must_use]
    pub fn new(billing_month: impl Into<String>) -> Self {
        Self {
            billing_month: billing_month.into(),
            total_amount: 0.0,
            network_shared_costs: 0.0,
            security_shared_costs: 0.0,
            grand_total: 0.0,
            total_by_vendor: BTreeMap::new(),
            invoices: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn add_record_moves_the_running_total() {
        let mut account = AppAccountCost::new("acct-1", "Payments Prod");
        account.add_record(UsageRecord::new("AmazonEC2", 10.0, "acct-1"));
        account.add_record(UsageRecord::new("AmazonS3", 2.5, "acct-1"));

        assert_eq!(account.total_amount, 12.5);
        assert_eq!(account.records.len(), 2);
    }

    #[test]
    fn vendor_entry_creates_the_node_in_place() {
        let mut invoice = Invoice::new("cb-1", "Proj-A", "2026-07");
        invoice.vendor_entry("Amazon Web Services").total_amount += 5.0;
        invoice.vendor_entry("Amazon Web Services").total_amount += 3.0;

        assert_eq!(invoice.costs_by_vendor.len(), 1);
        assert!((invoice.vendor_total() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn account_entry_keeps_the_first_name() {
        let mut vendor = VendorCost::new("Microsoft Azure");
        vendor.account_entry("sub-1", "Analytics");
        let account = vendor.account_entry("sub-1", "ignored");
        assert_eq!(account.app_name, "Analytics");
    }

    #[test]
    fn totals_recompute_from_children() {
        let mut invoice = Invoice::new("cb-1", "Proj-A", "2026-07");
        {
            let vendor = invoice.vendor_entry("Amazon Web Services");
            let account = vendor.account_entry("acct-1", "Payments Prod");
            account.add_record(UsageRecord::new("AmazonEC2", 100.0, "acct-1"));
            vendor.total_amount += 100.0;
        }
        invoice
            .total_by_app_account
            .entry("acct-1".into())
            .or_insert_with(|| AppAccountCost::new("acct-1", "Payments Prod"))
            .total_amount += 100.0;
        invoice.total_amount += 100.0;

        assert!((invoice.vendor_total() - invoice.total_amount).abs() < 1e-9);
        assert!((invoice.app_account_total() - invoice.total_amount).abs() < 1e-9);
    }
}
