//! # tokenize-registry: Company-Registry Lookup
//!
//! Client for the external company-verification service, keyed by tax
//! identifier.
//!
//! The ledger core never sees this crate: front ends call
//! [`CompanyLookup::lookup`] before issuing tokens and reject companies
//! whose [`CompanyInfo::status`] is not the active sentinel. Everything
//! that can go wrong remotely (network, HTTP status, JSON shape,
//! registry-side business errors) surfaces as the single
//! [`LookupError::Remote`] kind with the message passed through opaquely.
//!
//! ## Implementations
//! - [`client::HttpRegistryClient`] - the real HTTP client
//! - [`stub::StaticLookup`] - in-memory table for tests and offline runs

pub mod client;
pub mod stub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::HttpRegistryClient;
pub use stub::StaticLookup;

/// Status value a company must carry for issuance to proceed.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Company record as returned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Full legal name.
    pub name: String,

    /// Abbreviated name, when the registry provides one.
    pub short_name: Option<String>,

    /// Registry status; compare against [`STATUS_ACTIVE`].
    pub status: String,

    /// Registration date as reported (opaque string, not parsed).
    pub registration_date: Option<String>,

    /// Legal address.
    pub address: Option<String>,

    /// Last reported yearly revenue, in cents.
    pub revenue_cents: Option<i64>,
}

impl CompanyInfo {
    /// True when the company may issue tokens.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// Registry lookup failures.
///
/// One generic kind on purpose: the caller's only recourse is to show
/// the message and reject the operation.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network, HTTP, parse, or registry-side failure.
    #[error("company lookup failed: {0}")]
    Remote(String),
}

/// Looks up a company by tax identifier.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    /// Fetches the company record for `tax_id`.
    async fn lookup(&self, tax_id: &str) -> Result<CompanyInfo, LookupError>;
}
