//! In-process mutual exclusion for per-user read-modify-write sequences.

use std::collections::HashMap;
use std::sync::Arc;

use rolegate_domain::{EmailAddress, RequestId, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Resource a guard serializes access to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// One user's role list, forks and status.
    User(UserId),
    /// An email address without a user yet (signup).
    Email(EmailAddress),
    /// One approval request.
    Request(RequestId),
}

/// Guard held for the duration of a locked section.
pub struct ScopeGuard {
    _guard: OwnedMutexGuard<()>,
}

/// Registry of per-scope async mutexes.
///
/// Entries no longer referenced by any holder are pruned on the next acquire.
#[derive(Clone, Default)]
pub struct UserLocks {
    scopes: Arc<Mutex<HashMap<LockScope, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `scope`.
    pub async fn acquire(&self, scope: LockScope) -> ScopeGuard {
        let slot = {
            let mut scopes = self.scopes.lock().await;
            scopes.retain(|_, slot| Arc::strong_count(slot) > 1);
            scopes
                .entry(scope)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        ScopeGuard {
            _guard: slot.lock_owned().await,
        }
    }

    #[cfg(test)]
    async fn tracked_scopes(&self) -> usize {
        self.scopes.lock().await.len()
    }
}
