//! OpenAPI documentation for the JSON endpoints.
//!
//! The page routes return HTML and are not documented here.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::session::session,
    ),
    components(schemas(
        crate::api::handlers::health::Health,
        crate::api::handlers::auth::types::SessionResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Session management")
    )
)]
pub struct ApiDoc;
