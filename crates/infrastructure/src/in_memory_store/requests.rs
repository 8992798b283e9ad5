use super::*;

#[async_trait]
impl RequestRepository for InMemoryStore {
    async fn create_request(&self, request: AccessRequest) -> AppResult<AccessRequest> {
        let mut state = self.state.write().await;

        if request.kind() == RequestKind::Signup
            && state.requests.iter().any(|existing| {
                existing.kind() == RequestKind::Signup
                    && !existing.status().is_terminal()
                    && existing.payload().subject_email() == request.payload().subject_email()
            })
        {
            return Err(AppError::Conflict(format!(
                "a signup request for '{}' is already pending",
                request.payload().subject_email()
            )));
        }

        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .state
            .read()
            .await
            .requests
            .iter()
            .find(|request| request.id() == request_id)
            .cloned())
    }

    async fn list_pending_requests(
        &self,
        query: &PendingRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<AccessRequest> = state
            .requests
            .iter()
            .filter(|request| query.matches(request))
            .cloned()
            .collect();
        requests.sort_by_key(AccessRequest::submitted_at);

        Ok(requests)
    }

    async fn has_pending_signup(&self, email: &EmailAddress) -> AppResult<bool> {
        Ok(self.state.read().await.requests.iter().any(|request| {
            request.kind() == RequestKind::Signup
                && !request.status().is_terminal()
                && request.payload().subject_email() == email
        }))
    }

    async fn save_decision(&self, request: &AccessRequest) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .requests
            .iter_mut()
            .find(|stored| stored.id() == request.id())
            .ok_or_else(|| {
                AppError::NotFound(format!("request '{}' does not exist", request.id()))
            })?;

        stored.ensure_pending()?;
        *stored = request.clone();
        Ok(())
    }
}
