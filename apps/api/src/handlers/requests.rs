use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rolegate_application::{PendingRequestQuery, SignupRequestInput};
use rolegate_core::{AppError, NonEmptyString};
use rolegate_domain::{CredentialMaterial, EmailAddress, RequestKind, RoleName};
use serde::Deserialize;

use crate::dto::{
    AccessRequestResponse, PermissionChangeRequestBody, RejectRequestBody, RoleChangeRequestBody,
    SignupRequestBody,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_permissions, parse_request_id};

#[derive(Debug, Default, Deserialize)]
pub struct PendingRequestListQuery {
    pub kind: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl TryFrom<PendingRequestListQuery> for PendingRequestQuery {
    type Error = AppError;

    fn try_from(value: PendingRequestListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: value
                .kind
                .as_deref()
                .map(str::parse::<RequestKind>)
                .transpose()?,
            email_contains: value.email.filter(|email| !email.trim().is_empty()),
            requested_role_contains: value.role.filter(|role| !role.trim().is_empty()),
        })
    }
}

pub async fn submit_signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequestBody>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    if payload.credential.trim().is_empty() {
        return Err(AppError::Validation("credential must not be empty".to_owned()).into());
    }

    let request = state
        .request_workflow_service
        .submit_signup(SignupRequestInput {
            email: EmailAddress::new(payload.email)?,
            name: NonEmptyString::new(payload.name)?,
            credential_material: CredentialMaterial::new(payload.credential),
            requested_role: RoleName::new(payload.requested_role)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccessRequestResponse::from(request))))
}

pub async fn submit_role_change_handler(
    State(state): State<AppState>,
    Json(payload): Json<RoleChangeRequestBody>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    let request = state
        .request_workflow_service
        .submit_role_change(
            EmailAddress::new(payload.email)?,
            RoleName::new(payload.requested_role)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AccessRequestResponse::from(request))))
}

pub async fn submit_permission_change_handler(
    State(state): State<AppState>,
    Json(payload): Json<PermissionChangeRequestBody>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    let request = state
        .request_workflow_service
        .submit_permission_change(
            EmailAddress::new(payload.email)?,
            parse_permissions(payload.requested_permissions)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AccessRequestResponse::from(request))))
}

pub async fn list_pending_requests_handler(
    State(state): State<AppState>,
    Query(query): Query<PendingRequestListQuery>,
) -> ApiResult<Json<Vec<AccessRequestResponse>>> {
    let query = PendingRequestQuery::try_from(query)?;
    let requests = state
        .request_workflow_service
        .list_pending_requests(&query)
        .await?
        .into_iter()
        .map(AccessRequestResponse::from)
        .collect();

    Ok(Json(requests))
}

pub async fn get_request_handler(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .request_workflow_service
        .get_request(parse_request_id(request_id.as_str())?)
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}

pub async fn approve_request_handler(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .request_workflow_service
        .approve_request(parse_request_id(request_id.as_str())?)
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}

pub async fn reject_request_handler(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(payload): Json<RejectRequestBody>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let reason = payload.reason.filter(|reason| !reason.trim().is_empty());
    let request = state
        .request_workflow_service
        .reject_request(parse_request_id(request_id.as_str())?, reason)
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}
