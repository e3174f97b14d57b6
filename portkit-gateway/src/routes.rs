//! Endpoints and router for the gateway API.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, routing::get_service, Router};
use portkit_core::{BoxError, Context, Endpoint};
use portkit_http::{
    decode_request, encode_json_response, new_endpoint, new_server, HttpConfig, HttpServer,
    JsonErrorEncoder, PathParams, StatusError,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::{
    directory::{User, UserDirectory},
    error::GatewayError,
};

// ── Shared state ─────────────────────────────────────────────────────────────

type Directory = Arc<UserDirectory>;

// ── Request / response types ──────────────────────────────────────────────────

/// `GET /health` takes no input.
#[derive(Debug, Deserialize)]
pub struct HealthRequest {}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `id` comes from the path.
#[derive(Debug, Deserialize)]
pub struct GetUserRequest {
    pub id: u64,
}

/// `id` comes from the path, the rest from the JSON body. A body `id` must
/// match the path.
#[derive(Debug, Deserialize)]
pub struct PutUserRequest {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PutUserResponse {
    pub user: User,
    pub created: bool,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given directory.
///
/// Every route reports failures as `{"error": ..}` JSON.
pub fn create_router(directory: Directory, config: &HttpConfig) -> Router {
    let health_route: HttpServer<HealthRequest, HealthResponse> = new_endpoint(health);
    let put_dir = Arc::clone(&directory);
    let put_user_route: HttpServer<PutUserRequest, PutUserResponse> = new_server(
        move |_ctx: Context, req: PutUserRequest| {
            let directory = Arc::clone(&put_dir);
            async move { put_user(&directory, req) }
        },
        decode_put_user,
        encode_json_response::<PutUserResponse>,
    );
    let get_user_route: HttpServer<GetUserRequest, User> = new_endpoint(GetUser { directory });

    Router::new()
        .route(
            "/v1/users/{id}",
            get_service(with_json_errors(get_user_route, config))
                .put_service(with_json_errors(put_user_route, config)),
        )
        .route("/health", get_service(with_json_errors(health_route, config)))
        .layer(TraceLayer::new_for_http())
}

fn with_json_errors<Req, Resp>(server: HttpServer<Req, Resp>, config: &HttpConfig) -> HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    server.with_config(config.clone()).with_error_encoder(JsonErrorEncoder)
}

/// Decode a `PUT /v1/users/{id}` request, rejecting a body `id` that names a
/// different user than the path.
async fn decode_put_user(ctx: Context, req: Request) -> Result<PutUserRequest, BoxError> {
    let (mut parts, body) = req.into_parts();
    let path_id = PathParams::from_parts(&mut parts)
        .await?
        .get("id")
        .and_then(|id| id.trim().parse::<u64>().ok());

    let put: PutUserRequest = decode_request(ctx, Request::from_parts(parts, body)).await?;
    match path_id {
        Some(id) if id != put.id => Err(invalid(&format!(
            "body id {} does not match path id {id}",
            put.id
        ))),
        _ => Ok(put),
    }
}

// ── Endpoints ─────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe.
///
/// # Errors
/// Never fails.
pub async fn health(_ctx: Context, _req: HealthRequest) -> Result<HealthResponse, BoxError> {
    Ok(HealthResponse { status: "ok" })
}

/// `GET /v1/users/{id}` — fetch one user.
pub struct GetUser {
    directory: Directory,
}

#[async_trait]
impl Endpoint<GetUserRequest, User> for GetUser {
    async fn call(&self, _ctx: Context, req: GetUserRequest) -> Result<User, BoxError> {
        self.directory
            .get(req.id)
            .ok_or_else(|| StatusError::from(GatewayError::UserNotFound(req.id)).into())
    }
}

/// `PUT /v1/users/{id}` — create or replace a user.
///
/// # Errors
/// Returns a `400` [`StatusError`] if the name is blank or the email has no
/// `@`.
pub fn put_user(directory: &UserDirectory, req: PutUserRequest) -> Result<PutUserResponse, BoxError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(invalid("name must not be blank"));
    }
    if req.email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(invalid("email must contain '@'"));
    }

    let user = User { id: req.id, name: name.to_owned(), email: req.email };
    let created = directory.upsert(user.clone());
    tracing::info!(user_id = user.id, created, "user stored");
    Ok(PutUserResponse { user, created })
}

fn invalid(reason: &str) -> BoxError {
    StatusError::from(GatewayError::InvalidRequest(reason.to_owned())).into()
}
