//! The cost tree builder.
//!
//! Consumes a flat list of usage records and the materialized asset
//! inventory, and aggregates them into per-customer invoices. Records that
//! cannot be linked to a chargeback account are stamped with the failure and
//! collected separately; they never stop the run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use chargeback_assets::{Asset, AssetIndex, AssetType};
use chargeback_core::{
    AppAccountCost, ChargebackError, Invoice, InvoiceSet, Result, Settings, UsageRecord,
};

/// Why a usage record could not be linked to a chargeback account.
///
/// Rendered onto [`UsageRecord::error`]; never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The record's account id matches no application account.
    #[error("application account {0} not found in the asset inventory")]
    ApplicationNotFound(String),

    /// The application account names no owning chargeback account.
    #[error("no chargeback account set for application account {0}")]
    ChargebackNotSet(String),

    /// The named chargeback account matches no asset.
    #[error("chargeback account {name} not found for application account {app_id}")]
    ChargebackNotFound {
        /// The chargeback account name the application account points at.
        name: String,
        /// The application account carrying the dangling reference.
        app_id: String,
    },

    /// The chargeback account has no reporting unit (sold-to).
    #[error("no reporting unit set for chargeback account {0}")]
    ReportingUnitNotSet(String),

    /// The chargeback account has no legal entity.
    #[error("no legal entity set for chargeback account {0}")]
    LegalEntityNotSet(String),
}

/// What the builder returns: the cost tree plus the records it could not
/// link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// The aggregated cost tree.
    pub result: InvoiceSet,

    /// Records that failed resolution, each carrying its failure message.
    pub task_errors: Vec<UsageRecord>,
}

/// Aggregates usage records into the invoice cost tree.
pub struct CostTreeBuilder<'a> {
    billing_month: String,
    settings: &'a Settings,
    applications: AssetIndex<'a>,
    chargebacks: AssetIndex<'a>,
}

struct Resolved<'a> {
    application: &'a Asset,
    chargeback: &'a Asset,
    customer: &'a str,
}

impl<'a> CostTreeBuilder<'a> {
    /// Create a builder for one billing month.
    ///
    /// Indexes application accounts by their configured account-id attribute
    /// and chargeback accounts by their configured name attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ChargebackError::InvalidBillingMonth`] when the label does
    /// not denote a real `YYYY-MM` month, or
    /// [`ChargebackError::MissingSetting`] when the configuration is
    /// incomplete.
    pub fn new(
        billing_month: impl Into<String>,
        applications: &'a AssetType,
        chargebacks: &'a AssetType,
        settings: &'a Settings,
    ) -> Result<Self> {
        let billing_month = billing_month.into();
        validate_billing_month(&billing_month)?;
        settings.validate()?;

        Ok(Self {
            billing_month,
            settings,
            applications: applications.index_by(&settings.application_attr_account_id),
            chargebacks: chargebacks.index_by(&settings.chargeback_attr_name),
        })
    }

    /// Aggregate records into the cost tree.
    ///
    /// Whole accounts whose records sum to zero or less are excluded, as are
    /// records with an empty account id; neither is reported as an error.
    /// Every remaining record either lands in the tree or comes back in
    /// `task_errors` with its resolution failure stamped on it.
    #[must_use]
    pub fn build(&self, mut records: Vec<UsageRecord>) -> BuildOutcome {
        let mut totals_by_account: BTreeMap<String, f64> = BTreeMap::new();
        for record in &records {
            *totals_by_account.entry(record.account_id.clone()).or_default() += record.cost;
        }
        let excluded: BTreeSet<String> = totals_by_account
            .into_iter()
            .filter(|(_, total)| *total <= 0.0)
            .map(|(account_id, _)| account_id)
            .collect();
        for account_id in &excluded {
            if !account_id.is_empty() {
                tracing::debug!(
                    account_id = %account_id,
                    "excluding application account with non-positive net cost"
                );
            }
        }

        let before = records.len();
        records.retain(|record| {
            !record.account_id.is_empty() && !excluded.contains(&record.account_id)
        });
        if before > records.len() {
            tracing::debug!(
                dropped = before - records.len(),
                "dropped records from excluded or unidentified accounts"
            );
        }

        let mut result = InvoiceSet::new(&self.billing_month);
        let mut task_errors = Vec::new();

        for mut record in records {
            match self.resolve(&record.account_id) {
                Ok(resolved) => {
                    self.file_record(&mut result, &resolved, record);
                }
                Err(error) => {
                    record.error = Some(error.to_string());
                    task_errors.push(record);
                }
            }
        }

        tracing::info!(
            billing_month = %result.billing_month,
            invoices = result.invoices.len(),
            errors = task_errors.len(),
            "cost tree built"
        );

        BuildOutcome {
            result,
            task_errors,
        }
    }

    /// Walk the record's resolution chain through the asset inventory.
    fn resolve(&self, account_id: &str) -> std::result::Result<Resolved<'a>, ResolutionError> {
        let application = self
            .applications
            .get(account_id)
            .ok_or_else(|| ResolutionError::ApplicationNotFound(account_id.to_string()))?;

        let customer = self
            .applications
            .attribute_value(application, &self.settings.application_attr_chargeback)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ResolutionError::ChargebackNotSet(account_id.to_string()))?;

        let chargeback = self.chargebacks.get(customer).ok_or_else(|| {
            ResolutionError::ChargebackNotFound {
                name: customer.to_string(),
                app_id: account_id.to_string(),
            }
        })?;

        if self
            .chargebacks
            .attribute_value(chargeback, &self.settings.chargeback_attr_reporting_unit)
            .map_or(true, str::is_empty)
        {
            return Err(ResolutionError::ReportingUnitNotSet(customer.to_string()));
        }
        if self
            .chargebacks
            .attribute_value(chargeback, &self.settings.chargeback_attr_legal_entity)
            .map_or(true, str::is_empty)
        {
            return Err(ResolutionError::LegalEntityNotSet(customer.to_string()));
        }

        Ok(Resolved {
            application,
            chargeback,
            customer,
        })
    }

    /// File one resolved record, moving all four running totals together.
    fn file_record(&self, result: &mut InvoiceSet, resolved: &Resolved<'a>, mut record: UsageRecord) {
        let app_name = self
            .applications
            .attribute_value(resolved.application, &self.settings.application_attr_name)
            .unwrap_or_default()
            .to_string();

        let invoice = result
            .invoices
            .entry(resolved.chargeback.id.clone())
            .or_insert_with(|| self.new_invoice(resolved.chargeback, resolved.customer));

        record.seller.clone_from(&record.vendor);
        let cost = record.cost;
        let account_id = record.account_id.clone();
        let vendor = record.vendor.clone();

        let vendor_cost = invoice.vendor_entry(&vendor);
        vendor_cost.account_entry(&account_id, &app_name).add_record(record);
        vendor_cost.total_amount += cost;
        invoice
            .total_by_app_account
            .entry(account_id.clone())
            .or_insert_with(|| AppAccountCost::new(&account_id, &app_name))
            .total_amount += cost;
        invoice.total_amount += cost;
    }

    /// Populate a fresh invoice's metadata from the chargeback asset.
    fn new_invoice(&self, chargeback: &Asset, customer: &str) -> Invoice {
        let settings = self.settings;
        let attr = |attr_id: &str| {
            self.chargebacks
                .attribute_value(chargeback, attr_id)
                .unwrap_or_default()
                .to_string()
        };

        let mut invoice = Invoice::new(&chargeback.id, customer, &self.billing_month);
        invoice.cost_center = attr(&settings.chargeback_attr_cost_center);
        invoice.legal_entity = attr(&settings.chargeback_attr_legal_entity);
        invoice.owner = attr(&settings.chargeback_attr_owner);
        invoice.controller = attr(&settings.chargeback_attr_controller);
        invoice.business_unit = attr(&settings.chargeback_attr_business_unit);
        invoice.tenant = attr(&settings.chargeback_attr_tenant);
        invoice.reporting_unit = attr(&settings.chargeback_attr_reporting_unit);
        invoice.sap_account = self
            .chargebacks
            .attribute_value(chargeback, &settings.chargeback_attr_sap_account)
            .filter(|value| !value.is_empty())
            .map_or_else(|| settings.default_sap_account.clone(), ToString::to_string);
        invoice.emails_to_notify = self.notify_emails(chargeback);
        invoice
    }

    /// De-duplicated union of every configured contact attribute.
    fn notify_emails(&self, chargeback: &Asset) -> Vec<String> {
        let settings = self.settings;
        let mut emails = BTreeSet::new();
        for attr_id in [
            &settings.chargeback_attr_owner,
            &settings.chargeback_attr_controller,
            &settings.chargeback_attr_administrator,
            &settings.chargeback_attr_alt_administrators,
            &settings.chargeback_attr_additional_contacts,
        ] {
            for value in self.chargebacks.attribute_values(chargeback, attr_id) {
                if !value.is_empty() {
                    emails.insert(value.clone());
                }
            }
        }
        emails.into_iter().collect()
    }
}

/// Check that a billing-month label denotes a real calendar month.
fn validate_billing_month(label: &str) -> Result<()> {
    let first_day = format!("{label}-01");
    if chrono::NaiveDate::parse_from_str(&first_day, "%Y-%m-%d").is_err() {
        return Err(ChargebackError::InvalidBillingMonth(label.to_string()));
    }
    Ok(())
}
