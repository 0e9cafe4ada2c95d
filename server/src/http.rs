use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{self, HeaderName, HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post},
};
use entity::{Department, Employee, EmployeeDraft};
use platform_api::{ApiError, ApiResult};
use platform_store::{EmployeeFilter, EmployeeStore, Page, StoreError};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

const ID_NOT_FOUND: &str = "Id not found";
const NO_MATCHING_RESULT: &str = "No matching result found for the given criteria.";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EmployeeStore>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employee registry listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees/", post(create_employee))
        .route("/employees/{employee_id}", delete(delete_employee))
        .route("/employee/{id}", get(get_employee).patch(update_employee))
        .route("/find_employees/", get(find_employees))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Map a store failure onto the API taxonomy. `missing` is the
/// caller-facing message for the not-found case, which differs between
/// the id lookups and the list endpoint.
fn store_error(err: StoreError, missing: &str) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::not_found(missing),
        StoreError::InvalidArgument(message) => ApiError::InvalidArgument(message),
        other => ApiError::internal(other),
    }
}

async fn create_employee(
    State(state): State<AppState>,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<Json<Employee>> {
    draft
        .validate()
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let employee = state
        .store
        .create(draft)
        .map_err(|err| store_error(err, ID_NOT_FOUND))?;
    Ok(Json(employee))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let employee = state
        .store
        .get(&id)
        .map_err(|err| store_error(err, ID_NOT_FOUND))?;
    Ok(Json(employee))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<Json<Employee>> {
    draft
        .validate()
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let employee = state
        .store
        .update(&id, draft)
        .map_err(|err| store_error(err, ID_NOT_FOUND))?;
    Ok(Json(employee))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state
        .store
        .delete(&employee_id)
        .map_err(|err| store_error(err, ID_NOT_FOUND))?;
    Ok(Json(DeleteResponse {
        message: format!("Employee with ID {employee_id} has been deleted"),
    }))
}

#[derive(Debug, Deserialize)]
struct FindQuery {
    name: Option<String>,
    department: Option<Department>,
    offset: Option<i64>,
    limit: Option<i64>,
}

async fn find_employees(
    State(state): State<AppState>,
    Query(query): Query<FindQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let filter = EmployeeFilter {
        name: query.name,
        department: query.department,
    };
    let page = Page {
        offset: query.offset.unwrap_or(0),
        limit: query.limit.unwrap_or(10),
    };
    let employees = state
        .store
        .list(&filter, page)
        .map_err(|err| store_error(err, NO_MATCHING_RESULT))?;
    Ok(Json(employees))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.store.probe().is_ok();
    Json(HealthResponse {
        ok: store_ok,
        store_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    store_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
