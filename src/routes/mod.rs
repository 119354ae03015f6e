//! Route definitions for the SnortForge API.

pub mod export;
pub mod health;
pub mod import;
pub mod rules;
pub mod templates;
pub mod workspace;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Build the full application router with middleware.
pub fn router(state: AppState) -> Router {
    let cors = match HeaderValue::from_str(&state.config.frontend_url) {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, url = %state.config.frontend_url, "Invalid FRONTEND_URL, allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let rule_routes = Router::new()
        .route("/rules/build", post(rules::build))
        .route("/rules/validate", post(rules::validate));

    let template_routes = Router::new()
        .route("/templates", get(templates::list))
        .route("/templates/{name}", get(templates::get_by_name));

    let transfer_routes = Router::new()
        .route("/export/rules", post(export::rules))
        .route("/export/json", post(export::json))
        .route("/import/rules", post(import::rules))
        .route("/import/json", post(import::json));

    let workspace_routes = Router::new()
        .route("/workspace", get(workspace::get_workspace))
        .route("/workspace/rules", post(workspace::add_rule))
        .route("/workspace/templates/{name}", post(workspace::add_template))
        .route("/workspace/import", post(workspace::import_file))
        .route(
            "/workspace/selection",
            post(workspace::select).delete(workspace::clear_selection),
        )
        .route("/workspace/selection/all", post(workspace::select_all))
        .route("/workspace/selection/{index}", post(workspace::toggle))
        .route("/workspace/duplicate", post(workspace::duplicate))
        .route("/workspace/delete", post(workspace::delete_selected))
        .route("/workspace/edit", get(workspace::edit_target))
        .route(
            "/workspace/rules/{index}/preview",
            get(workspace::preview),
        )
        .route("/workspace/collisions", get(workspace::collisions))
        .route("/workspace/text", get(workspace::text))
        .route("/workspace/export", get(workspace::export_workspace));

    let max_body = state.config.max_upload_bytes;

    Router::new()
        .route("/health/live", get(health::live))
        .nest("/api/v1", rule_routes)
        .nest("/api/v1", template_routes)
        .nest("/api/v1", transfer_routes)
        .nest("/api/v1", workspace_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}
