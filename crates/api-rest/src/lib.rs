//! # API REST
//!
//! REST API for the TherapistHelper client directory.
//!
//! Handles:
//! - HTTP endpoints with axum under `/api/v1`
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and `therapist-core` for storage and validation.

#![warn(rust_2018_idioms)]

use api_shared::{
    ClientCountRes, ClientPayload, ClientRecord, ClientSummary, ErrorRes, Gender, HealthRes,
    HealthService, ServiceInfoRes, API_V1_PREFIX,
};
use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, Query, State},
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use therapist_core::{config::resolve_client_data_dir, ClientError, ClientService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Default bind address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

const DEFAULT_LIST_LIMIT: usize = 100;

/// REST server settings, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
    pub client_data_dir: PathBuf,
    pub allowed_origins: Vec<HeaderValue>,
}

impl ApiConfig {
    /// Reads `THERAPIST_REST_ADDR`, `CLIENT_DATA_DIR` and `ALLOWED_ORIGINS`.
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::from_values`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var("THERAPIST_REST_ADDR").ok(),
            std::env::var("CLIENT_DATA_DIR").ok(),
            std::env::var("ALLOWED_ORIGINS").ok(),
        )
    }

    /// Builds the configuration from raw values, applying defaults for missing or blank ones.
    ///
    /// The client data directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be resolved or created, or if an origin is
    /// not a valid header value.
    pub fn from_values(
        addr: Option<String>,
        client_data_dir: Option<String>,
        allowed_origins: Option<String>,
    ) -> anyhow::Result<Self> {
        let addr = addr
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_REST_ADDR.into());

        let client_data_dir = resolve_client_data_dir(client_data_dir)?;

        let origins = allowed_origins
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into());
        let allowed_origins = parse_allowed_origins(&origins)?;

        Ok(Self {
            addr,
            client_data_dir,
            allowed_origins,
        })
    }
}

/// Parses a comma-separated origin list, ignoring empty entries.
///
/// # Errors
///
/// Returns an error naming the first origin that is not a valid header value.
pub fn parse_allowed_origins(value: &str) -> anyhow::Result<Vec<HeaderValue>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("invalid origin in ALLOWED_ORIGINS: {origin} ({e})"))
        })
        .collect()
}

/// Application state for the REST API server.
///
/// Holds the client store shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    clients: ClientService,
}

impl AppState {
    pub fn new(clients: ClientService) -> Self {
        Self { clients }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TherapistHelper API",
        description = "TherapistHelper API - client directory service"
    ),
    paths(
        root,
        health,
        create_client,
        list_clients,
        get_client,
        get_client_by_uuid,
        update_client,
        delete_client,
        count_clients,
    ),
    components(schemas(
        ServiceInfoRes,
        HealthRes,
        Gender,
        ClientPayload,
        ClientRecord,
        ClientSummary,
        ClientCountRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router: service banner, health check, the versioned client
/// routes and Swagger UI, wrapped in CORS and request tracing.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let clients = Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/stats/count", get(count_clients))
        .route("/clients/uuid/:uuid", get(get_client_by_uuid))
        .route(
            "/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        );

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest(API_V1_PREFIX, clients)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(detail)))
}

/// Maps a store error onto an HTTP status and `{detail}` body.
fn client_error(context: &str, err: ClientError) -> ApiError {
    match err {
        ClientError::NotFound => error_response(StatusCode::NOT_FOUND, "Client not found"),
        ClientError::InvalidInput(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        other => {
            tracing::error!("{} error: {:?}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Unwraps a JSON request body, turning any rejection into a `422` with a `{detail}` body.
fn payload_body(
    context: &str,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> Result<ClientPayload, ApiError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            tracing::warn!("{} rejected body: {}", context, rejection.body_text());
            Err(error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                rejection.body_text(),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = ServiceInfoRes)
    )
)]
#[axum::debug_handler]
async fn root() -> Json<ServiceInfoRes> {
    Json(ServiceInfoRes {
        message: "TherapistHelper API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        status: "running".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Client created", body = ClientRecord),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 422, description = "Malformed request body", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a new client record
///
/// The service assigns `id`, `uuid` and both timestamps.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if the body is not a client payload, `400 Bad Request` if
/// the payload fails validation, or `500 Internal Server Error` if the record cannot be stored.
#[axum::debug_handler]
async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientRecord>), ApiError> {
    let payload = payload_body("Create client", payload)?;
    state
        .clients
        .create(&payload)
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(|e| client_error("Create client", e))
}

/// Pagination for the client list.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct ListParams {
    /// Number of clients to skip (default 0).
    skip: Option<usize>,
    /// Maximum number of clients to return (default 100).
    limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(ListParams),
    responses(
        (status = 200, description = "Client roster ordered by id", body = [ClientSummary]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ClientSummary>>, ApiError> {
    let records = state
        .clients
        .list(
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        )
        .map_err(|e| client_error("List clients", e))?;

    Ok(Json(records.iter().map(ClientSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = u64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client record", body = ClientRecord),
        (status = 404, description = "Client not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
) -> Result<Json<ClientRecord>, ApiError> {
    state
        .clients
        .get(id)
        .map(Json)
        .map_err(|e| client_error("Get client", e))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/uuid/{uuid}",
    params(("uuid" = String, Path, description = "Canonical 32-character client UUID")),
    responses(
        (status = 200, description = "Client record", body = ClientRecord),
        (status = 404, description = "Client not found", body = ErrorRes)
    )
)]
/// Look up a client by UUID. A malformed UUID cannot name a client, so it is reported as 404.
#[axum::debug_handler]
async fn get_client_by_uuid(
    State(state): State<AppState>,
    AxumPath(uuid): AxumPath<String>,
) -> Result<Json<ClientRecord>, ApiError> {
    match state.clients.get_by_uuid(&uuid) {
        Ok(record) => Ok(Json(record)),
        Err(ClientError::Uuid(_)) => Err(error_response(StatusCode::NOT_FOUND, "Client not found")),
        Err(e) => Err(client_error("Get client by uuid", e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    params(("id" = u64, Path, description = "Client id")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Client updated", body = ClientRecord),
        (status = 400, description = "Validation failed", body = ErrorRes),
        (status = 404, description = "Client not found", body = ErrorRes),
        (status = 422, description = "Malformed request body", body = ErrorRes)
    )
)]
/// Replace the editable fields of a client record
#[axum::debug_handler]
async fn update_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> Result<Json<ClientRecord>, ApiError> {
    let payload = payload_body("Update client", payload)?;
    state
        .clients
        .update(id, &payload)
        .map(Json)
        .map_err(|e| client_error("Update client", e))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(("id" = u64, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .clients
        .delete(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| client_error("Delete client", e))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/stats/count",
    responses(
        (status = 200, description = "Number of stored clients", body = ClientCountRes)
    )
)]
#[axum::debug_handler]
async fn count_clients(State(state): State<AppState>) -> Result<Json<ClientCountRes>, ApiError> {
    let total = state
        .clients
        .count()
        .map_err(|e| client_error("Count clients", e))?;

    Ok(Json(ClientCountRes {
        total_clients: total as u64,
    }))
}
