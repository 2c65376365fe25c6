//! # Static Lookup
//!
//! In-memory registry for tests and offline demos: a fixed table of
//! tax id → company record, no network.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{CompanyInfo, CompanyLookup, LookupError, STATUS_ACTIVE};

/// A fixed in-memory company table.
///
/// ## Usage
/// ```rust,ignore
/// let registry = StaticLookup::new().with_active("7707083893", "Sberbank PJSC");
/// let info = registry.lookup("7707083893").await?;
/// assert!(info.is_active());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    companies: HashMap<String, CompanyInfo>,
}

impl StaticLookup {
    /// Creates an empty table.
    pub fn new() -> Self {
        StaticLookup::default()
    }

    /// Adds a company with an arbitrary record.
    pub fn with_company(mut self, tax_id: impl Into<String>, info: CompanyInfo) -> Self {
        self.companies.insert(tax_id.into(), info);
        self
    }

    /// Adds an active company with just a name.
    pub fn with_active(self, tax_id: impl Into<String>, name: impl Into<String>) -> Self {
        let info = CompanyInfo {
            name: name.into(),
            short_name: None,
            status: STATUS_ACTIVE.to_string(),
            registration_date: None,
            address: None,
            revenue_cents: None,
        };
        self.with_company(tax_id, info)
    }
}

#[async_trait]
impl CompanyLookup for StaticLookup {
    async fn lookup(&self, tax_id: &str) -> Result<CompanyInfo, LookupError> {
        self.companies
            .get(tax_id)
            .cloned()
            .ok_or_else(|| LookupError::Remote(format!("company {tax_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_company_is_returned() {
        let registry = StaticLookup::new().with_active("7707083893", "Sberbank PJSC");
        let info = registry.lookup("7707083893").await.unwrap();
        assert_eq!(info.name, "Sberbank PJSC");
        assert!(info.is_active());
    }

    #[tokio::test]
    async fn unknown_company_is_a_remote_error() {
        let registry = StaticLookup::new();
        let err = registry.lookup("0000000000").await.unwrap_err();
        assert!(matches!(err, LookupError::Remote(_)));
    }
}
