use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{AccessRequest, EmailAddress, RequestId, RequestKind};

/// Filters for pending request listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequestQuery {
    /// Optional request kind filter.
    pub kind: Option<RequestKind>,
    /// Optional case-insensitive substring of the subject email.
    pub email_contains: Option<String>,
    /// Optional case-insensitive substring of the requested role name.
    pub requested_role_contains: Option<String>,
}

impl PendingRequestQuery {
    /// Returns true when `request` is pending and passes every filter.
    #[must_use]
    pub fn matches(&self, request: &AccessRequest) -> bool {
        if request.status().is_terminal() {
            return false;
        }

        if let Some(kind) = self.kind
            && request.kind() != kind
        {
            return false;
        }

        if let Some(needle) = self.email_contains.as_deref()
            && !contains_ignore_case(request.payload().subject_email().as_str(), needle)
        {
            return false;
        }

        if let Some(needle) = self.requested_role_contains.as_deref() {
            return request
                .payload()
                .requested_role()
                .is_some_and(|role| contains_ignore_case(role.as_str(), needle));
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Repository port for approval requests.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persists a newly submitted request.
    async fn create_request(&self, request: AccessRequest) -> AppResult<AccessRequest>;

    /// Finds a request by identifier.
    async fn find_request(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>>;

    /// Lists pending requests ordered by submission time, oldest first.
    async fn list_pending_requests(
        &self,
        query: &PendingRequestQuery,
    ) -> AppResult<Vec<AccessRequest>>;

    /// Returns true when a pending signup exists for `email`.
    async fn has_pending_signup(&self, email: &EmailAddress) -> AppResult<bool>;

    /// Stores a terminal decision.
    ///
    /// Fails with `InvalidState` unless the stored request is still pending.
    async fn save_decision(&self, request: &AccessRequest) -> AppResult<()>;
}
