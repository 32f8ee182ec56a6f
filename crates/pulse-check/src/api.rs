use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::RegistryError;
use crate::service::{RegisterRequest, ServiceRecord};
use crate::ServiceRegistry;

type AppState = Arc<ServiceRegistry>;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn error_response(err: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        RegistryError::InvalidServiceData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::ServiceNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            detail: err.to_string(),
        }),
    )
}

pub async fn register(
    State(registry): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let name = request.name.clone();

    match registry.register(request).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: format!("Service '{}' registered.", name),
        })),
        Err(e) => {
            tracing::warn!("Failed to register service {}: {}", name, e);
            Err(error_response(e))
        }
    }
}

pub async fn list_services(
    State(registry): State<AppState>,
) -> Json<HashMap<String, ServiceRecord>> {
    Json(registry.list().await)
}

pub async fn ping(
    State(registry): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    match registry.ping_all().await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Pinged all services and updated status.".to_string(),
        })),
        Err(e) => {
            tracing::error!("Ping run failed to persist: {}", e);
            Err(error_response(e))
        }
    }
}

pub async fn remove_service(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    match registry.remove(&name).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: format!("Service '{}' removed.", name),
        })),
        Err(e) => {
            tracing::warn!("Failed to remove service {}: {}", name, e);
            Err(error_response(e))
        }
    }
}

/// Route table shared by the binary and the integration tests.
pub fn router(registry: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/services", get(list_services))
        .route("/services/{name}", delete(remove_service))
        .route("/ping", get(ping))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}
