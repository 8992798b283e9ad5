use rolegate_core::AppError;
use rolegate_domain::{PermissionSet, RequestId, UserId};

pub mod catalog;
pub mod health;
pub mod requests;
pub mod users;


fn parse_user_id(value: &str) -> Result<UserId, AppError> {
    uuid::Uuid::parse_str(value)
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
}

fn parse_request_id(value: &str) -> Result<RequestId, AppError> {
    uuid::Uuid::parse_str(value)
        .map(RequestId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid request id '{value}': {error}")))
}

fn parse_permissions(values: Vec<String>) -> Result<PermissionSet, AppError> {
    PermissionSet::parse(values)
}
