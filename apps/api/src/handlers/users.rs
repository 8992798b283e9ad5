use axum::Json;
use axum::extract::{Path, Query, State};
use rolegate_domain::{EmailAddress, RoleName, UserStatus};
use serde::Deserialize;

use crate::dto::{
    PermissionChangeBody, PermissionListResponse, RoleResponse, UpdateUserStatusRequest,
    UserProfileResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_permissions, parse_user_id};

#[derive(Debug, Deserialize)]
pub struct UserLookupQuery {
    pub email: String,
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .get_user(parse_user_id(user_id.as_str())?)
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn find_user_by_email_handler(
    State(state): State<AppState>,
    Query(query): Query<UserLookupQuery>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .find_user_by_email(&EmailAddress::new(query.email)?)
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn update_user_status_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .update_user_status(
            parse_user_id(user_id.as_str())?,
            payload.status.parse::<UserStatus>()?,
        )
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn available_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .access_service
        .available_roles_for(parse_user_id(user_id.as_str())?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn available_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PermissionListResponse>> {
    let permissions = state
        .access_service
        .available_permissions_for(parse_user_id(user_id.as_str())?)
        .await?;

    Ok(Json(PermissionListResponse::from(permissions)))
}

pub async fn removable_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PermissionListResponse>> {
    let permissions = state
        .access_service
        .removable_permissions_for(parse_user_id(user_id.as_str())?)
        .await?;

    Ok(Json(PermissionListResponse::from(permissions)))
}

pub async fn grant_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PermissionChangeBody>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .grant_permissions(
            parse_user_id(user_id.as_str())?,
            parse_permissions(payload.permissions)?,
        )
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn revoke_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PermissionChangeBody>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .revoke_permissions(
            parse_user_id(user_id.as_str())?,
            parse_permissions(payload.permissions)?,
        )
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn remove_role_handler(
    State(state): State<AppState>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .access_service
        .remove_role(parse_user_id(user_id.as_str())?, &RoleName::new(role_name)?)
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}
