//! Service status endpoints
//!
//! `/health` and `/health/live` answer without touching Postgres.
//! `/health/ready` round-trips the pool and answers 503 when the credential
//! store is unreachable. `{api}/ping` is the API-level smoke test.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use mini_blog_shared::MessageResponse;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Alive,
    Ready,
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Reachable,
    Unreachable,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: ServiceStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<StoreStatus>,
}

impl StatusReport {
    fn new(status: ServiceStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: None,
        }
    }

    /// Report for a completed database round-trip
    fn from_store(database: StoreStatus) -> Self {
        let status = match database {
            StoreStatus::Reachable => ServiceStatus::Ready,
            StoreStatus::Unreachable => ServiceStatus::NotReady,
        };
        Self {
            database: Some(database),
            ..Self::new(status)
        }
    }
}

pub async fn health_check() -> Json<StatusReport> {
    Json(StatusReport::new(ServiceStatus::Healthy))
}

pub async fn liveness_check() -> Json<StatusReport> {
    Json(StatusReport::new(ServiceStatus::Alive))
}

pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<StatusReport>) {
    // Failure cause is logged by db::health_check, never echoed
    let database = match db::health_check(state.db()).await {
        Ok(()) => StoreStatus::Reachable,
        Err(_) => StoreStatus::Unreachable,
    };

    let code = match database {
        StoreStatus::Reachable => StatusCode::OK,
        StoreStatus::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(StatusReport::from_store(database)))
}
