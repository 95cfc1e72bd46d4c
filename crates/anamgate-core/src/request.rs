//! Request body schemas for the gateway endpoints.
//!
//! Dates are 8-digit numeric `YYYYMMDD` values, ranges inclusive, exactly as
//! the portal consumes them. The facility code is optional everywhere; the
//! handler substitutes the configured default when it is omitted, so leaving
//! it out is indistinguishable from passing the default explicitly.

use serde::{Deserialize, Serialize};

/// Login request body. Both fields must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Portal member identifier.
    pub identifier: String,

    /// Portal password.
    pub secret: String,
}

/// Date-range query shared by the reservation, lab-test, medication and
/// care-history endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// Range start, inclusive (`YYYYMMDD`).
    pub start_date: u32,

    /// Range end, inclusive (`YYYYMMDD`).
    pub end_date: u32,

    /// Facility (hospital branch) code.
    #[serde(default)]
    pub facility_code: Option<String>,
}

/// Payment list query: a date range plus the outpatient/inpatient division.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentListQuery {
    pub start_date: u32,

    pub end_date: u32,

    #[serde(default)]
    pub facility_code: Option<String>,

    /// Payment division filter. Defaults to outpatient.
    #[serde(default)]
    pub code_division: CodeDivision,
}

/// Single payment lookup by receipt number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetailQuery {
    /// Portal receipt number.
    pub payment_number: i64,

    #[serde(default)]
    pub facility_code: Option<String>,
}

/// Payment division: the portal files outpatient and inpatient payments
/// under separate single-letter codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeDivision {
    #[default]
    #[serde(rename = "O")]
    Outpatient,

    #[serde(rename = "I")]
    Inpatient,
}

impl CodeDivision {
    /// The single-letter code the portal expects.
    #[must_use]
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Outpatient => "O",
            Self::Inpatient => "I",
        }
    }
}
