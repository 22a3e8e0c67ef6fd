//! The shared-cost distributor.
//!
//! Runs three passes over a built cost tree. Pass 1 extracts the invoices of
//! designated shared-cost customers and totals their cost by vendor. Pass 2
//! re-injects each vendor's extracted cost into the remaining invoices,
//! weighted by each application account's share of that vendor's directly
//! billed total. Pass 3 spreads the operator-supplied security total over all
//! application accounts, weighted by their share of the post-network grand
//! total.
//!
//! Both weighting denominators are snapshotted before their pass mutates the
//! tree, so injected cost never weights its own distribution. Each allocated
//! share is rounded to 2 decimals independently; the residue between a
//! nominal shared total and the sum of its rounded shares is not
//! redistributed.

use std::collections::BTreeMap;

use chargeback_core::{
    round2, ChargebackError, Invoice, InvoiceSet, Result, Settings, UsageRecord,
};

/// Synthetic vendor carrying redistributed network infrastructure cost.
pub const NETWORK_SHARED_VENDOR: &str = "Cloud Network Shared Cost";

/// Synthetic vendor carrying redistributed security cost.
pub const SECURITY_VENDOR: &str = "Cloud Security";

/// Seller stamped on synthetic network-shared records.
pub const NETWORK_SHARED_SELLER: &str = "Cloud-Shared-Costs";

/// Seller stamped on synthetic security records.
pub const SECURITY_SELLER: &str = "Cloud-Security";

/// Redistributes shared network and security costs across invoices.
pub struct SharedCostDistributor<'a> {
    settings: &'a Settings,
}

impl<'a> SharedCostDistributor<'a> {
    /// Create a distributor with the run's configuration.
    #[must_use]
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Run all three passes and finalize the grand total.
    ///
    /// `security_total` is the operator-supplied security cost for the cycle;
    /// it is stored on the set before distribution begins.
    ///
    /// # Errors
    ///
    /// Returns [`ChargebackError::MissingAppAccountTotal`] when an
    /// application account carries vendor cost but is absent from its
    /// invoice's per-account totals; the cycle must be aborted rather than
    /// emit a partially-allocated result.
    pub fn distribute(&self, mut set: InvoiceSet, security_total: f64) -> Result<InvoiceSet> {
        set.security_shared_costs = security_total;

        let shared_by_vendor = self.extract_shared_costs(&mut set);
        distribute_network(&mut set, &shared_by_vendor)?;
        distribute_security(&mut set);

        set.grand_total = set.total_amount + set.network_shared_costs + set.security_shared_costs;

        tracing::info!(
            billing_month = %set.billing_month,
            total = set.total_amount,
            network_shared = set.network_shared_costs,
            security_shared = set.security_shared_costs,
            grand_total = set.grand_total,
            "shared costs distributed"
        );

        Ok(set)
    }

    /// Pass 1: pull shared-cost customers out of the set and total everyone
    /// else by vendor.
    ///
    /// Shared-cost invoices feed the per-vendor side table and
    /// `network_shared_costs`, then disappear from the set, as do invoices
    /// flagged ignore. Every other invoice feeds `total_by_vendor` and the
    /// set total.
    fn extract_shared_costs(&self, set: &mut InvoiceSet) -> BTreeMap<String, f64> {
        let mut shared_by_vendor: BTreeMap<String, f64> = BTreeMap::new();
        let mut removed: Vec<String> = Vec::new();
        set.total_amount = 0.0;

        for (customer_id, invoice) in &set.invoices {
            if self.settings.is_shared_cost_account(&invoice.customer) {
                for vendor_cost in invoice.costs_by_vendor.values() {
                    *shared_by_vendor.entry(vendor_cost.vendor.clone()).or_default() +=
                        vendor_cost.total_amount;
                    set.network_shared_costs += vendor_cost.total_amount;
                }
                tracing::debug!(
                    customer = %invoice.customer,
                    amount = invoice.total_amount,
                    "extracted shared-cost invoice"
                );
                removed.push(customer_id.clone());
            } else if invoice.ignore {
                tracing::debug!(customer = %invoice.customer, "removed ignored invoice");
                removed.push(customer_id.clone());
            } else {
                for (vendor, vendor_cost) in &invoice.costs_by_vendor {
                    *set.total_by_vendor.entry(vendor.clone()).or_default() +=
                        vendor_cost.total_amount;
                    set.total_amount += vendor_cost.total_amount;
                }
            }
        }

        for customer_id in removed {
            set.invoices.remove(&customer_id);
        }

        shared_by_vendor
    }
}

/// Pass 2: weight each vendor's extracted cost over the application accounts
/// that used that vendor.
fn distribute_network(
    set: &mut InvoiceSet,
    shared_by_vendor: &BTreeMap<String, f64>,
) -> Result<()> {
    for (vendor, &shared_total) in shared_by_vendor {
        // Denominator is fixed before any share is injected. A vendor whose
        // directly-billed total is zero or absent degrades to 1.
        #[allow(clippy::float_cmp)]
        let denominator = match set.total_by_vendor.get(vendor).copied() {
            Some(total) if total != 0.0 => total,
            _ => 1.0,
        };

        let mut allocated = 0.0;
        for invoice in set.invoices.values_mut() {
            let Some(vendor_cost) = invoice.costs_by_vendor.get(vendor) else {
                continue;
            };
            let shares: Vec<(String, String, f64)> = vendor_cost
                .accounts_by_id
                .values()
                .map(|account| {
                    (
                        account.app_id.clone(),
                        account.app_name.clone(),
                        round2(account.total_amount / denominator * shared_total),
                    )
                })
                .collect();

            for (app_id, app_name, share) in shares {
                inject_share(
                    invoice,
                    NETWORK_SHARED_VENDOR,
                    &app_id,
                    &app_name,
                    share,
                    format!("Cloud Network Shared-{vendor}"),
                    NETWORK_SHARED_SELLER,
                );

                let Some(tracked) = invoice.total_by_app_account.get_mut(&app_id) else {
                    return Err(ChargebackError::MissingAppAccountTotal {
                        app_id,
                        customer: invoice.customer.clone(),
                    });
                };
                tracked.total_amount += share;
                invoice.total_amount += share;
                allocated += share;
            }
        }

        tracing::debug!(
            vendor = %vendor,
            shared_total,
            allocated,
            residue = round2(shared_total - allocated),
            "allocated shared network cost"
        );
    }
    Ok(())
}

/// Pass 3: spread the security total over every application account,
/// weighted by its share of the post-network billed total.
fn distribute_security(set: &mut InvoiceSet) {
    // Snapshot; includes the network shares injected by the previous pass.
    let denominator = set.total_amount + set.network_shared_costs;
    let security_total = set.security_shared_costs;

    let mut allocated = 0.0;
    for invoice in set.invoices.values_mut() {
        let product_code = format!("Cloud security recharge-{}", invoice.customer);
        let shares: Vec<(String, String, f64)> = invoice
            .total_by_app_account
            .values()
            .map(|account| {
                (
                    account.app_id.clone(),
                    account.app_name.clone(),
                    round2(account.total_amount / denominator * security_total),
                )
            })
            .collect();

        for (app_id, app_name, share) in shares {
            inject_share(
                invoice,
                SECURITY_VENDOR,
                &app_id,
                &app_name,
                share,
                product_code.clone(),
                SECURITY_SELLER,
            );
            invoice.total_amount += share;
            allocated += share;
        }
    }

    tracing::debug!(
        security_total,
        allocated,
        residue = round2(security_total - allocated),
        "allocated shared security cost"
    );
}

/// File one allocated share under an invoice's synthetic vendor, merging
/// with any share already held for the same application account.
fn inject_share(
    invoice: &mut Invoice,
    synthetic_vendor: &str,
    app_id: &str,
    app_name: &str,
    amount: f64,
    product_code: String,
    seller: &str,
) {
    let record =
        UsageRecord::synthetic(product_code, amount, app_id, synthetic_vendor, seller);
    let vendor_cost = invoice.vendor_entry(synthetic_vendor);
    vendor_cost.account_entry(app_id, app_name).add_record(record);
    vendor_cost.total_amount += amount;
}
