use crate::db::SharedStore;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
    timestamp: String,
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

/// Ready once the record store answers a round-trip.
pub async fn readiness_summary(store: web::Data<SharedStore>) -> HttpResponse {
    let start = Instant::now();
    let result = store.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, status, message) = match result {
        Ok(()) => (
            true,
            ComponentStatus::Healthy,
            "record store reachable".to_string(),
        ),
        Err(e) => (
            false,
            ComponentStatus::Unhealthy,
            format!("record store check failed: {}", e),
        ),
    };

    let response = ReadinessResponse {
        ready,
        status,
        message,
        latency_ms,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
