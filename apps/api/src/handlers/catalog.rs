use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rolegate_domain::RoleName;
use serde::Deserialize;

use crate::dto::{
    AuditEventResponse, CatalogFamilyResponse, CreateCatalogRoleRequest,
    CreateCatalogSubRoleRequest, PermissionListResponse, RoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_permissions;

const DEFAULT_AUDIT_PAGE: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct AuditEventListQuery {
    pub limit: Option<usize>,
}

pub async fn list_catalog_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .catalog_service
        .list_catalog_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_catalog_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCatalogRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .catalog_service
        .create_catalog_role(
            RoleName::new(payload.name)?,
            parse_permissions(payload.permissions)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn create_catalog_sub_role_handler(
    State(state): State<AppState>,
    Path(primary_name): Path<String>,
    Json(payload): Json<CreateCatalogSubRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .catalog_service
        .create_catalog_sub_role(
            &RoleName::new(primary_name)?,
            payload.sub_name.as_str(),
            parse_permissions(payload.permissions)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn list_catalog_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<PermissionListResponse>> {
    let permissions = state.catalog_service.list_catalog_permissions().await?;

    Ok(Json(PermissionListResponse::from(permissions)))
}

pub async fn catalog_families_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CatalogFamilyResponse>>> {
    let families = state
        .catalog_service
        .catalog_families()
        .await?
        .into_iter()
        .map(CatalogFamilyResponse::from)
        .collect();

    Ok(Json(families))
}

pub async fn list_audit_events_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditEventListQuery>,
) -> ApiResult<Json<Vec<AuditEventResponse>>> {
    let entries = state
        .catalog_service
        .list_audit_events(query.limit.unwrap_or(DEFAULT_AUDIT_PAGE))
        .await?
        .into_iter()
        .map(AuditEventResponse::from)
        .collect();

    Ok(Json(entries))
}
