use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Number of broker calls a handler made, set as a response extension.
///
/// Responses without it are not charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamCalls(pub usize);

#[derive(Debug)]
struct BudgetWindow {
    started_at: Instant,
    spent: usize,
}

/// Per-window budget of broker calls shared by every route behind it.
///
/// A vehicle search costs one branch-list call plus one call per branch in
/// the city, so a single request can spend dozens of calls. Requests are
/// admitted while the budget is not exhausted and charged afterwards with the
/// [`UpstreamCalls`] their handler reports.
#[derive(Debug, Clone)]
pub struct UpstreamBudget {
    max_calls: usize,
    window: Duration,
    state: Arc<Mutex<BudgetWindow>>,
}

impl UpstreamBudget {
    #[must_use]
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            state: Arc::new(Mutex::new(BudgetWindow {
                started_at: Instant::now(),
                spent: 0,
            })),
        }
    }

    /// `Err` carries the time left until the window resets.
    async fn admit(&self) -> Result<(), Duration> {
        let mut window = self.state.lock().await;
        let elapsed = window.started_at.elapsed();
        if elapsed >= self.window {
            window.started_at = Instant::now();
            window.spent = 0;
            return Ok(());
        }
        if window.spent >= self.max_calls {
            return Err(self.window.saturating_sub(elapsed));
        }
        Ok(())
    }

    async fn charge(&self, calls: usize) {
        let mut window = self.state.lock().await;
        window.spent = window.spent.saturating_add(calls);
    }
}

/// Takes the caller's `x-request-id` when it is short printable ASCII,
/// otherwise generates a `UUIDv4`. The ID goes into request extensions as
/// [`RequestId`] and back out on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| is_usable_request_id(v))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

fn is_usable_request_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

/// Rejects with 429 and `Retry-After` once the broker-call budget is spent.
pub async fn enforce_upstream_budget(
    State(budget): State<UpstreamBudget>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(retry_in) = budget.admit().await {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|r| r.0.clone())
            .unwrap_or_default();
        tracing::warn!(
            path = %req.uri().path(),
            retry_in_secs = retry_in.as_secs(),
            "upstream call budget exhausted"
        );
        let mut res = ApiError::new(
            request_id,
            "rate_limited",
            "too many broker searches; retry later",
        )
        .into_response();
        res.headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_in.as_secs().max(1)));
        return res;
    }

    let res = next.run(req).await;
    if let Some(UpstreamCalls(calls)) = res.extensions().get::<UpstreamCalls>().copied() {
        budget.charge(calls).await;
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_accepts_short_printable_ascii() {
        assert!(is_usable_request_id("req-abc_123"));
        assert!(!is_usable_request_id(""));
        assert!(!is_usable_request_id("has space"));
        assert!(!is_usable_request_id(&"x".repeat(MAX_REQUEST_ID_LEN + 1)));
    }

    #[tokio::test]
    async fn budget_admits_until_spent_then_reports_wait() {
        let budget = UpstreamBudget::new(3, Duration::from_secs(60));
        assert!(budget.admit().await.is_ok());
        budget.charge(2).await;
        assert!(budget.admit().await.is_ok());
        budget.charge(5).await;

        let wait = budget.admit().await.unwrap_err();
        assert!(wait <= Duration::from_secs(60));
        assert!(wait > Duration::from_secs(50));
    }

    #[tokio::test]
    async fn budget_resets_after_window() {
        let budget = UpstreamBudget::new(1, Duration::from_millis(20));
        budget.charge(1).await;
        assert!(budget.admit().await.is_err());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(budget.admit().await.is_ok());
    }
}
