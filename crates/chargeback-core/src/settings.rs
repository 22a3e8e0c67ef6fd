//! Run configuration.
//!
//! Attribute identity in the asset inventory is indirect: the engine never
//! hard-codes which attribute of an asset type holds the customer name or the
//! cost center. Instead, [`Settings`] maps each semantic role to a concrete
//! attribute id, and the lookup helpers match that id against the asset
//! type's definition list before reading the instance.

use serde::{Deserialize, Serialize};

use crate::error::{ChargebackError, Result};

/// Immutable configuration for one chargeback run.
///
/// Passed by reference into both the builder and the distributor; there is no
/// ambient configuration state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Application-account attribute holding the account id.
    pub application_attr_account_id: String,

    /// Application-account attribute holding the display name.
    pub application_attr_name: String,

    /// Application-account attribute holding the cloud vendor.
    pub application_attr_vendor: String,

    /// Application-account attribute naming the owning chargeback account.
    pub application_attr_chargeback: String,

    /// Chargeback-account attribute holding the customer name.
    pub chargeback_attr_name: String,

    /// Chargeback-account attribute holding the cost center.
    pub chargeback_attr_cost_center: String,

    /// Chargeback-account attribute holding the legal entity.
    pub chargeback_attr_legal_entity: String,

    /// Chargeback-account attribute holding the business unit.
    pub chargeback_attr_business_unit: String,

    /// Chargeback-account attribute holding the tenant.
    pub chargeback_attr_tenant: String,

    /// Chargeback-account attribute holding the owner.
    pub chargeback_attr_owner: String,

    /// Chargeback-account attribute holding the financial controller.
    pub chargeback_attr_controller: String,

    /// Chargeback-account attribute holding the administrator.
    pub chargeback_attr_administrator: String,

    /// Chargeback-account attribute holding alternate administrators.
    pub chargeback_attr_alt_administrators: String,

    /// Chargeback-account attribute holding additional notification contacts.
    pub chargeback_attr_additional_contacts: String,

    /// Chargeback-account attribute holding the reporting unit (sold-to).
    pub chargeback_attr_reporting_unit: String,

    /// Chargeback-account attribute holding the SAP account.
    pub chargeback_attr_sap_account: String,

    /// Customer names whose invoices are redistributed instead of billed.
    #[serde(default)]
    pub shared_cost_accounts: Vec<String>,

    /// Legal entity booked when direct billing applies.
    pub default_legal_entity: String,

    /// SAP account used when a chargeback account has none set.
    pub default_sap_account: String,

    /// Cost center used on the settlement credit side.
    pub default_cost_center: String,

    /// Vendor code used on cross-entity settlements.
    pub default_vendor: String,

    /// Prefix of generated invoice numbers.
    pub invoice_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application_attr_account_id: String::new(),
            application_attr_name: String::new(),
            application_attr_vendor: String::new(),
            application_attr_chargeback: String::new(),
            chargeback_attr_name: String::new(),
            chargeback_attr_cost_center: String::new(),
            chargeback_attr_legal_entity: String::new(),
            chargeback_attr_business_unit: String::new(),
            chargeback_attr_tenant: String::new(),
            chargeback_attr_owner: String::new(),
            chargeback_attr_controller: String::new(),
            chargeback_attr_administrator: String::new(),
            chargeback_attr_alt_administrators: String::new(),
            chargeback_attr_additional_contacts: String::new(),
            chargeback_attr_reporting_unit: String::new(),
            chargeback_attr_sap_account: String::new(),
            shared_cost_accounts: Vec::new(),
            default_legal_entity: "L323 (PS4)".to_string(),
            default_sap_account: "6226110000".to_string(),
            default_cost_center: "2013236L03".to_string(),
            default_vendor: "VLE3211".to_string(),
            invoice_prefix: "CGB".to_string(),
        }
    }
}

impl Settings {
    /// Set the customer names treated as shared-cost accounts.
    #[must_use]
    pub fn with_shared_cost_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_cost_accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fallback SAP account.
    #[must_use]
    pub fn with_default_sap_account(mut self, account: impl Into<String>) -> Self {
        self.default_sap_account = account.into();
        self
    }

    /// Check that every attribute role and default is configured.
    ///
    /// `shared_cost_accounts` may legitimately be empty (a cycle with no
    /// shared-cost customers); every other field must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ChargebackError::MissingSetting`] naming the first empty
    /// field.
    pub fn validate(&self) -> Result<()> {
        let fields: [(&str, &'static str); 21] = [
            (&self.application_attr_account_id, "application_attr_account_id"),
            (&self.application_attr_name, "application_attr_name"),
            (&self.application_attr_vendor, "application_attr_vendor"),
            (&self.application_attr_chargeback, "application_attr_chargeback"),
            (&self.chargeback_attr_name, "chargeback_attr_name"),
            (&self.chargeback_attr_cost_center, "chargeback_attr_cost_center"),
            (&self.chargeback_attr_legal_entity, "chargeback_attr_legal_entity"),
            (&self.chargeback_attr_business_unit, "chargeback_attr_business_unit"),
            (&self.chargeback_attr_tenant, "chargeback_attr_tenant"),
            (&self.chargeback_attr_owner, "chargeback_attr_owner"),
            (&self.chargeback_attr_controller, "chargeback_attr_controller"),
            (&self.chargeback_attr_administrator, "chargeback_attr_administrator"),
            (
                &self.chargeback_attr_alt_administrators,
                "chargeback_attr_alt_administrators",
            ),
            (
                &self.chargeback_attr_additional_contacts,
                "chargeback_attr_additional_contacts",
            ),
            (&self.chargeback_attr_reporting_unit, "chargeback_attr_reporting_unit"),
            (&self.chargeback_attr_sap_account, "chargeback_attr_sap_account"),
            (&self.default_legal_entity, "default_legal_entity"),
            (&self.default_sap_account, "default_sap_account"),
            (&self.default_cost_center, "default_cost_center"),
            (&self.default_vendor, "default_vendor"),
            (&self.invoice_prefix, "invoice_prefix"),
        ];

        for (value, name) in fields {
            if value.is_empty() {
                return Err(ChargebackError::MissingSetting(name));
            }
        }
        Ok(())
    }

    /// Whether a customer name belongs to a shared-cost account.
    #[must_use]
    pub fn is_shared_cost_account(&self, customer: &str) -> bool {
        self.shared_cost_accounts.iter().any(|name| name == customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Settings {
        Settings {
            application_attr_account_id: "attr-101".into(),
            application_attr_name: "attr-102".into(),
            application_attr_vendor: "attr-103".into(),
            application_attr_chargeback: "attr-104".into(),
            chargeback_attr_name: "attr-201".into(),
            chargeback_attr_cost_center: "attr-202".into(),
            chargeback_attr_legal_entity: "attr-203".into(),
            chargeback_attr_business_unit: "attr-204".into(),
            chargeback_attr_tenant: "attr-205".into(),
            chargeback_attr_owner: "attr-206".into(),
            chargeback_attr_controller: "attr-207".into(),
            chargeback_attr_administrator: "attr-208".into(),
            chargeback_attr_alt_administrators: "attr-209".into(),
            chargeback_attr_additional_contacts: "attr-210".into(),
            chargeback_attr_reporting_unit: "attr-211".into(),
            chargeback_attr_sap_account: "attr-212".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn configured_settings_validate() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn empty_shared_cost_accounts_are_allowed() {
        let settings = configured();
        assert!(settings.shared_cost_accounts.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_attribute_role_is_rejected() {
        let mut settings = configured();
        settings.chargeback_attr_sap_account = String::new();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("chargeback_attr_sap_account"));
    }

    #[test]
    fn shared_cost_account_matching_is_exact() {
        let settings = configured().with_shared_cost_accounts(["Corp-Shared"]);
        assert!(settings.is_shared_cost_account("Corp-Shared"));
        assert!(!settings.is_shared_cost_account("corp-shared"));
        assert!(!settings.is_shared_cost_account("Proj-A"));
    }
}
