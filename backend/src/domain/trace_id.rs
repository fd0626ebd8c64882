//! Request-scoped correlation identifier.
//!
//! The active [`TraceId`] lives in task-local storage so errors raised deep in
//! the directory service can be correlated with the request that caused them.
//! Task-locals do not follow work onto `spawn_blocking` threads or spawned
//! tasks; wrap such work in [`TraceId::scope`] when the id is needed there.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// Per-request trace identifier.
///
/// # Examples
/// ```
/// use clinic_users::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "00000000-0000-0000-0000-000000000001".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier currently in scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nothing_in_scope_outside_a_request() {
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn nested_scopes_shadow_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let (seen_inner, seen_outer) = TraceId::scope(outer, async move {
            let seen_inner = TraceId::scope(inner, async { TraceId::current() }).await;
            (seen_inner, TraceId::current())
        })
        .await;
        assert_eq!(seen_inner, Some(inner));
        assert_eq!(seen_outer, Some(outer));
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!("not-a-trace".parse::<TraceId>().is_err());
    }
}
