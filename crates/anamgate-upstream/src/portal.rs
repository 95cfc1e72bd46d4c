//! Portal connector traits.
//!
//! Handlers work exclusively against this trait pair. A connector turns
//! credentials into an authenticated session; a session performs read-only
//! queries and must be closed before the inbound request completes, on both
//! success and failure paths.

use async_trait::async_trait;
use serde_json::Value;

use anamgate_core::{CodeDivision, Credentials};

use crate::error::PortalError;

/// Care-history inquiry kind. The portal files ambulatory visits and
/// admission/discharge events under distinct inquiry division codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareKind {
    /// Outpatient (ambulatory) visit history.
    Ambulatory,
    /// Hospitalization and discharge history.
    Inpatient,
}

impl CareKind {
    /// The portal's `inqrDvsnCd` value for this inquiry kind.
    #[must_use]
    pub fn discriminator(self) -> u8 {
        match self {
            Self::Ambulatory => 2,
            Self::Inpatient => 3,
        }
    }
}

/// Opens authenticated portal sessions.
///
/// Credentials are taken per call; implementations must not keep them nor
/// read them from ambient process state.
#[async_trait]
pub trait PortalConnector: Send + Sync {
    /// Signs in with the given credentials and returns a live session.
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn PortalSession>, PortalError>;
}

/// A single authenticated portal session.
///
/// Sessions are scoped to one inbound request: acquire, perform one query,
/// then [`close`](PortalSession::close).
#[async_trait]
pub trait PortalSession: Send + Sync {
    /// Fetches the signed-in member's profile.
    async fn member_info(&self) -> Result<Value, PortalError>;

    /// Lists reservations whose date falls in the inclusive range.
    async fn reservations(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError>;

    /// Lists diagnostic test results in the range.
    async fn lab_results(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError>;

    /// Lists prescription history in the range.
    async fn medications(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError>;

    /// Lists care history of the given kind in the range.
    async fn care_history(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        kind: CareKind,
    ) -> Result<Value, PortalError>;

    /// Lists completed payments in the range, filtered by division.
    async fn paid_list(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        division: CodeDivision,
    ) -> Result<Value, PortalError>;

    /// Fetches a single payment record by receipt number.
    async fn paid_detail(&self, facility: &str, payment_number: i64) -> Result<Value, PortalError>;

    /// Tears the portal session down. Best effort; always consumes the
    /// session.
    async fn close(self: Box<Self>);
}
