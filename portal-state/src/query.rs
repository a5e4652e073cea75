//! Cache bookkeeping shared by every query in the portal.
//!
//! One fixed policy applies to all queries: a short staleness window, a
//! small fixed number of retries with a fixed delay, and revalidation when
//! the window regains focus.

use jiff::{SignedDuration, Timestamp};
use payloads::{ClientError, EmployeeId, RoleId};
use std::fmt;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_after: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub refetch_on_focus: bool,
}

impl QueryPolicy {
    pub const NOTIFICATIONS: QueryPolicy = QueryPolicy {
        stale_after: Duration::from_secs(120),
        retries: 3,
        retry_delay: Duration::from_secs(1),
        refetch_on_focus: true,
    };

    pub const BILLING: QueryPolicy = QueryPolicy {
        stale_after: Duration::from_secs(60),
        retries: 3,
        retry_delay: Duration::from_secs(1),
        refetch_on_focus: true,
    };
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::NOTIFICATIONS
    }
}

/// Identifies a query, for logging and for invalidating it from elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    RoleNotifications(RoleId),
    EmployeeNotifications(EmployeeId),
    CurrentUser,
    BillingQuotas,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleNotifications(role) => {
                write!(f, "notifications/role/{role}")
            }
            Self::EmployeeNotifications(id) => {
                write!(f, "notifications/employee/{id}")
            }
            Self::CurrentUser => f.write_str("users/me"),
            Self::BillingQuotas => f.write_str("billing/quotas"),
        }
    }
}

/// Lifecycle of one cache entry.
///
/// Each request takes a generation number. Only the response to the most
/// recent request is applied, so an older request that resolves late
/// cannot overwrite a newer answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    data: Option<T>,
    error: Option<String>,
    in_flight: Option<u64>,
    generation: u64,
    fetched_at: Option<Timestamp>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: None,
            generation: 0,
            fetched_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }

    /// Start a request, superseding any request still in flight.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Record the outcome of request `generation`. Returns false, leaving
    /// the state untouched, if a newer request has started since.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<T, String>,
        now: Timestamp,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "Ignoring superseded query response"
            );
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.fetched_at = Some(now);
            }
            // Keep the previous data so the UI can still show it.
            Err(error) => self.error = Some(error),
        }
        true
    }

    /// Whether a polling tick should start a request. Ticks are skipped
    /// while a request and its retries are still running, otherwise a slow
    /// answer would be superseded by every tick and never land.
    pub fn should_poll(&self) -> bool {
        !self.is_loading()
    }

    pub fn is_stale(&self, policy: &QueryPolicy, now: Timestamp) -> bool {
        let Some(fetched_at) = self.fetched_at else {
            return true;
        };
        let stale_after = SignedDuration::try_from(policy.stale_after)
            .unwrap_or(SignedDuration::MAX);
        now.duration_since(fetched_at) >= stale_after
    }

    /// Forget everything, e.g. after logout.
    pub fn reset(&mut self) {
        self.data = None;
        self.error = None;
        self.in_flight = None;
        self.fetched_at = None;
        // Bumping the generation drops any response still on its way.
        self.generation += 1;
    }
}

/// Run `fetch`, retrying failed attempts `policy.retries` times with a
/// fixed `policy.retry_delay` between them. Unauthorized errors are
/// returned straight away since the session is gone.
pub async fn with_retry<T, F, Fut, S, SFut>(
    policy: &QueryPolicy,
    mut fetch: F,
    mut sleep: S,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt = 0;
    loop {
        match fetch().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_unauthorized() || attempt >= policy.retries => {
                return Err(e);
            }
            Err(e) => {
                attempt += 1;
                tracing::warn!(
                    "Query failed ({e}), retry {attempt}/{}",
                    policy.retries
                );
                sleep(policy.retry_delay).await;
            }
        }
    }
}
