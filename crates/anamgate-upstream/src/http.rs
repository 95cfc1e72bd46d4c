//! Reqwest-backed portal client.
//!
//! The portal's mobile-web API is cookie-bound: sign-in establishes a
//! session cookie that every subsequent query must carry, so each
//! [`HttpPortal::connect`] builds a dedicated client with its own cookie
//! store. Query parameters go on the wire under the portal's field names
//! (`hpCd`, `apstYmd`, `inqrDvsnCd`, ...). Replies wrap their payload in a
//! `{resultCode, resultMsg, data}` envelope; anything but the success code
//! is surfaced as a portal error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use anamgate_core::{CodeDivision, Credentials};

use crate::error::PortalError;
use crate::portal::{CareKind, PortalConnector, PortalSession};

const RESULT_OK: &str = "0000";

const LOGIN_PATH: &str = "/api/member/login";
const LOGOUT_PATH: &str = "/api/member/logout";
const MEMBER_INFO_PATH: &str = "/api/member/info";
const RESERVATION_PATH: &str = "/api/reservation/list";
const CHECKUP_PATH: &str = "/api/checkup/result";
const MEDICINE_PATH: &str = "/api/medicine/history";
const CARE_HISTORY_PATH: &str = "/api/care/history";
const PAYMENT_LIST_PATH: &str = "/api/payment/list";
const PAYMENT_DETAIL_PATH: &str = "/api/payment/detail";

/// Connector for the hospital portal's mobile-web API.
///
/// Holds only the endpoint and timeout configuration; every `connect` call
/// signs in from scratch with the credentials it is given. No connection or
/// session is pooled across requests.
#[derive(Debug, Clone)]
pub struct HttpPortal {
    base: Url,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl HttpPortal {
    /// Creates a connector for the portal at `base`.
    #[must_use]
    pub fn new(base: Url, connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            base,
            connect_timeout,
            request_timeout,
        }
    }
}

#[async_trait]
impl PortalConnector for HttpPortal {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn PortalSession>, PortalError> {
        // Fresh client per session: the cookie store is the portal session.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()?;

        let session = HttpSession {
            client,
            base: self.base.as_str().trim_end_matches('/').to_string(),
        };

        let reply = session
            .post_reply(
                LOGIN_PATH,
                &SignInParams {
                    member_id: &credentials.identifier,
                    member_password: &credentials.secret,
                },
            )
            .await?;

        if reply.result_code != RESULT_OK {
            return Err(PortalError::sign_in(reply.message()));
        }

        tracing::debug!(identifier = %credentials.identifier, "portal sign-in succeeded");
        Ok(Box::new(session))
    }
}

/// One authenticated, cookie-bound portal session.
struct HttpSession {
    client: reqwest::Client,
    base: String,
}

impl HttpSession {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_reply<T>(&self, path: &str, params: &T) -> Result<PortalReply, PortalError>
    where
        T: Serialize + ?Sized,
    {
        let body = self
            .client
            .post(self.endpoint(path))
            .json(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|e| PortalError::decode(e.to_string()))
    }

    /// Performs one query and unwraps the portal's reply envelope.
    async fn fetch<T>(&self, path: &str, params: &T) -> Result<Value, PortalError>
    where
        T: Serialize + ?Sized,
    {
        let reply = self.post_reply(path, params).await?;
        if reply.result_code != RESULT_OK {
            return Err(PortalError::portal(reply.message()));
        }
        Ok(reply.data.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl PortalSession for HttpSession {
    async fn member_info(&self) -> Result<Value, PortalError> {
        self.fetch(MEMBER_INFO_PATH, &Empty {}).await
    }

    async fn reservations(
        &self,
        facility: &str,
        from: u32,
        to: u32,
    ) -> Result<Value, PortalError> {
        self.fetch(
            RESERVATION_PATH,
            &ReservationParams {
                facility,
                from,
                to,
            },
        )
        .await
    }

    async fn lab_results(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError> {
        self.fetch(
            CHECKUP_PATH,
            &PeriodParams {
                facility,
                from,
                to,
            },
        )
        .await
    }

    async fn medications(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError> {
        self.fetch(
            MEDICINE_PATH,
            &OrderPeriodParams {
                facility,
                from,
                to,
            },
        )
        .await
    }

    async fn care_history(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        kind: CareKind,
    ) -> Result<Value, PortalError> {
        self.fetch(
            CARE_HISTORY_PATH,
            &CareHistoryParams {
                facility,
                from,
                to,
                kind: kind.discriminator(),
            },
        )
        .await
    }

    async fn paid_list(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        division: CodeDivision,
    ) -> Result<Value, PortalError> {
        self.fetch(
            PAYMENT_LIST_PATH,
            &PaidListParams {
                facility,
                from,
                to,
                division: division.as_code(),
            },
        )
        .await
    }

    async fn paid_detail(&self, facility: &str, payment_number: i64) -> Result<Value, PortalError> {
        self.fetch(
            PAYMENT_DETAIL_PATH,
            &PaidDetailParams {
                facility,
                payment_number,
            },
        )
        .await
    }

    async fn close(self: Box<Self>) {
        // Best-effort teardown; the cookie jar dies with the client anyway.
        if let Err(e) = self
            .client
            .post(self.endpoint(LOGOUT_PATH))
            .json(&Empty {})
            .send()
            .await
        {
            tracing::debug!(error = %e, "portal sign-out failed");
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// The portal's reply envelope.
#[derive(Debug, Deserialize)]
struct PortalReply {
    #[serde(rename = "resultCode", default)]
    result_code: String,

    #[serde(rename = "resultMsg", default)]
    result_msg: Option<String>,

    #[serde(default)]
    data: Option<Value>,
}

impl PortalReply {
    fn message(self) -> String {
        self.result_msg
            .filter(|m| !m.is_empty())
            .unwrap_or(self.result_code)
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct SignInParams<'a> {
    #[serde(rename = "memId")]
    member_id: &'a str,
    #[serde(rename = "memPwd")]
    member_password: &'a str,
}

#[derive(Serialize)]
struct ReservationParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "apstYmd")]
    from: u32,
    #[serde(rename = "apfnYmd")]
    to: u32,
}

#[derive(Serialize)]
struct PeriodParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "strtYmd")]
    from: u32,
    #[serde(rename = "fnshYmd")]
    to: u32,
}

#[derive(Serialize)]
struct OrderPeriodParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "ordrYmd1")]
    from: u32,
    #[serde(rename = "ordrYmd2")]
    to: u32,
}

#[derive(Serialize)]
struct CareHistoryParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "inqrStrtYmd")]
    from: u32,
    #[serde(rename = "inqrFnshYmd")]
    to: u32,
    #[serde(rename = "inqrDvsnCd")]
    kind: u8,
}

#[derive(Serialize)]
struct PaidListParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "strtYmd")]
    from: u32,
    #[serde(rename = "fnshYmd")]
    to: u32,
    #[serde(rename = "codvCd")]
    division: &'a str,
}

#[derive(Serialize)]
struct PaidDetailParams<'a> {
    #[serde(rename = "hpCd")]
    facility: &'a str,
    #[serde(rename = "mdrpNo")]
    payment_number: i64,
}
