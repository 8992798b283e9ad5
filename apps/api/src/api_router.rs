use axum::Router;
use axum::routing::{delete, get, post, put};
use rolegate_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let catalog_routes = Router::new()
        .route(
            "/api/catalog/roles",
            get(handlers::catalog::list_catalog_roles_handler)
                .post(handlers::catalog::create_catalog_role_handler),
        )
        .route(
            "/api/catalog/roles/{primary_name}/sub-roles",
            post(handlers::catalog::create_catalog_sub_role_handler),
        )
        .route(
            "/api/catalog/permissions",
            get(handlers::catalog::list_catalog_permissions_handler),
        )
        .route(
            "/api/catalog/families",
            get(handlers::catalog::catalog_families_handler),
        )
        .route(
            "/api/audit-events",
            get(handlers::catalog::list_audit_events_handler),
        );

    let request_routes = Router::new()
        .route(
            "/api/requests",
            get(handlers::requests::list_pending_requests_handler),
        )
        .route(
            "/api/requests/signup",
            post(handlers::requests::submit_signup_handler),
        )
        .route(
            "/api/requests/role-change",
            post(handlers::requests::submit_role_change_handler),
        )
        .route(
            "/api/requests/permission-change",
            post(handlers::requests::submit_permission_change_handler),
        )
        .route(
            "/api/requests/{request_id}",
            get(handlers::requests::get_request_handler),
        )
        .route(
            "/api/requests/{request_id}/approve",
            post(handlers::requests::approve_request_handler),
        )
        .route(
            "/api/requests/{request_id}/reject",
            post(handlers::requests::reject_request_handler),
        );

    let user_routes = Router::new()
        .route(
            "/api/users/lookup",
            get(handlers::users::find_user_by_email_handler),
        )
        .route("/api/users/{user_id}", get(handlers::users::get_user_handler))
        .route(
            "/api/users/{user_id}/status",
            put(handlers::users::update_user_status_handler),
        )
        .route(
            "/api/users/{user_id}/available-roles",
            get(handlers::users::available_roles_handler),
        )
        .route(
            "/api/users/{user_id}/available-permissions",
            get(handlers::users::available_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/removable-permissions",
            get(handlers::users::removable_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions/grant",
            post(handlers::users::grant_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions/revoke",
            post(handlers::users::revoke_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_name}",
            delete(handlers::users::remove_role_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(catalog_routes)
        .merge(request_routes)
        .merge(user_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
