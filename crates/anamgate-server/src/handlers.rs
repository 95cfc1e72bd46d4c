//! Gateway endpoint handlers.
//!
//! Every business endpoint runs the same three steps: validate the request
//! body, open a portal session with the caller's credentials, perform
//! exactly one portal query and wrap the outcome in the uniform envelope.
//! Portal failures of any kind answer HTTP 200 with `success: false`; only
//! request validation (4xx) and token rejection (401) use HTTP error codes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use futures_util::future::BoxFuture;
use serde_json::{Value, json};

use anamgate_auth::BearerAuth;
use anamgate_core::{
    ApiEnvelope, Credentials, DateRangeQuery, LoginRequest, LoginResponse, PaymentDetailQuery,
    PaymentListQuery,
};
use anamgate_upstream::{CareKind, PortalError, PortalSession};

use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

/// `POST /api/auth/login`
///
/// Validates the credentials with a live portal sign-in, then issues the
/// session token. Sign-in failure is not an HTTP error: the caller gets
/// 200 with a failure body.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    if request.identifier.is_empty() || request.secret.is_empty() {
        let detail = json!({"detail": "identifier and secret must be non-empty"});
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(detail)).into_response();
    }

    let credentials = Credentials::new(request.identifier, request.secret);
    match state.portal.connect(&credentials).await {
        Ok(session) => {
            // The session only existed to prove the credentials; drop it.
            session.close().await;
            match state.auth.tokens.issue(&credentials) {
                Ok(token) => {
                    tracing::info!(identifier = %credentials.identifier, "login succeeded");
                    Json(LoginResponse::authenticated("로그인 성공", token)).into_response()
                }
                Err(e) => {
                    tracing::error!(error = %e, "token issuance failed");
                    Json(LoginResponse::rejected(format!("로그인 실패: {e}"))).into_response()
                }
            }
        }
        Err(e) => {
            tracing::info!(identifier = %credentials.identifier, error = %e, "login rejected");
            Json(LoginResponse::rejected(format!("로그인 실패: {e}"))).into_response()
        }
    }
}

/// `GET /api/user/info`
pub async fn user_info(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
) -> Json<ApiEnvelope> {
    run_query(&state, &credentials, |s| s.member_info()).await
}

/// `POST /api/reservations`
pub async fn reservations(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<DateRangeQuery>,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move {
            s.reservations(&facility, query.start_date, query.end_date)
                .await
        })
    })
    .await
}

/// `POST /api/lab-tests`
pub async fn lab_tests(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<DateRangeQuery>,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move {
            s.lab_results(&facility, query.start_date, query.end_date)
                .await
        })
    })
    .await
}

/// `POST /api/medications`
pub async fn medications(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<DateRangeQuery>,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move {
            s.medications(&facility, query.start_date, query.end_date)
                .await
        })
    })
    .await
}

/// `POST /api/outpatient-history`
pub async fn outpatient_history(
    state: State<AppState>,
    auth: BearerAuth,
    query: Json<DateRangeQuery>,
) -> Json<ApiEnvelope> {
    care_history(state, auth, query, CareKind::Ambulatory).await
}

/// `POST /api/hospitalization-history`
pub async fn hospitalization_history(
    state: State<AppState>,
    auth: BearerAuth,
    query: Json<DateRangeQuery>,
) -> Json<ApiEnvelope> {
    care_history(state, auth, query, CareKind::Inpatient).await
}

/// Shared care-history plumbing. The inquiry kind is fixed per endpoint;
/// callers cannot override it.
async fn care_history(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<DateRangeQuery>,
    kind: CareKind,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move {
            s.care_history(&facility, query.start_date, query.end_date, kind)
                .await
        })
    })
    .await
}

/// `POST /api/payments`
pub async fn payments(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<PaymentListQuery>,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move {
            s.paid_list(
                &facility,
                query.start_date,
                query.end_date,
                query.code_division,
            )
            .await
        })
    })
    .await
}

/// `POST /api/payments/detail`
pub async fn payment_detail(
    State(state): State<AppState>,
    BearerAuth(credentials): BearerAuth,
    Json(query): Json<PaymentDetailQuery>,
) -> Json<ApiEnvelope> {
    let facility = facility_or_default(&state, query.facility_code);
    run_query(&state, &credentials, move |s| {
        Box::pin(async move { s.paid_detail(&facility, query.payment_number).await })
    })
    .await
}

fn facility_or_default(state: &AppState, facility_code: Option<String>) -> String {
    facility_code.unwrap_or_else(|| state.default_facility().to_string())
}

/// Runs one portal query inside a request-scoped session.
///
/// The session is acquired here and closed here, on success and failure
/// alike; handlers never hold portal state past their own response. Every
/// portal failure collapses into the failure envelope's message string.
async fn run_query<F>(state: &AppState, credentials: &Credentials, op: F) -> Json<ApiEnvelope>
where
    F: for<'a> FnOnce(&'a dyn PortalSession) -> BoxFuture<'a, Result<Value, PortalError>>,
{
    let session = match state.portal.connect(credentials).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "portal session could not be established");
            return Json(ApiEnvelope::failure(e.to_string()));
        }
    };

    let outcome = op(session.as_ref()).await;
    session.close().await;

    match outcome {
        Ok(data) => Json(ApiEnvelope::ok(data)),
        Err(e) => {
            tracing::warn!(error = %e, "portal query failed");
            Json(ApiEnvelope::failure(e.to_string()))
        }
    }
}
