//! Billing status orchestration: fast polling while a subscription is
//! active, quota refetches on status transitions, and the once-a-day
//! redirect to the billing page after a failed payment.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use payloads::SubscriptionStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const BILLING_ROUTE: &str = "/billing";

/// Poll interval used while the status may still settle.
pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Which status transitions should refresh the quota query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaRefresh {
    #[default]
    OnLeaveActive,
    OnEnterActive,
    OnAnyChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollDecision {
    /// Refetch the current user on this interval, if set.
    pub poll_interval: Option<Duration>,
    /// Refetch the quotas now instead of waiting for them to go stale.
    pub refetch_quotas: bool,
}

/// Watches the observed subscription status across renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillingWatch {
    refresh: QuotaRefresh,
    last: Option<Option<SubscriptionStatus>>,
}

impl BillingWatch {
    pub fn new(refresh: QuotaRefresh) -> Self {
        Self {
            refresh,
            last: None,
        }
    }

    /// Change which transitions refresh the quotas, keeping the baseline.
    pub fn set_refresh(&mut self, refresh: QuotaRefresh) {
        self.refresh = refresh;
    }

    pub fn last_status(&self) -> Option<SubscriptionStatus> {
        self.last.flatten()
    }

    /// Feed the latest status. The first observation only establishes the
    /// baseline, later ones report transitions.
    pub fn observe(
        &mut self,
        status: Option<SubscriptionStatus>,
    ) -> PollDecision {
        let is_active = status.is_some_and(|s| s.is_active());
        let poll_interval = is_active.then_some(FAST_POLL_INTERVAL);

        let refetch_quotas = match self.last.replace(status) {
            Some(previous) if previous != status => {
                let was_active = previous.is_some_and(|s| s.is_active());
                let refetch = match self.refresh {
                    QuotaRefresh::OnLeaveActive => was_active && !is_active,
                    QuotaRefresh::OnEnterActive => !was_active && is_active,
                    QuotaRefresh::OnAnyChange => true,
                };
                tracing::info!(
                    ?previous,
                    ?status,
                    refetch,
                    "Subscription status changed"
                );
                refetch
            }
            _ => false,
        };

        PollDecision {
            poll_interval,
            refetch_quotas,
        }
    }
}

pub fn is_billing_path(path: &str) -> bool {
    path == BILLING_ROUTE
        || path
            .strip_prefix(BILLING_ROUTE)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// When the user was last sent to the billing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectMarker {
    pub last_redirected_at: Option<Timestamp>,
}

impl RedirectMarker {
    /// Whether a user with `status` on `current_path` should be sent to
    /// the billing page. At most once per calendar day in `tz`.
    pub fn should_redirect(
        &self,
        status: Option<SubscriptionStatus>,
        current_path: &str,
        now: Timestamp,
        tz: &TimeZone,
    ) -> bool {
        if status != Some(SubscriptionStatus::PaymentFailed)
            || is_billing_path(current_path)
        {
            return false;
        }
        match self.last_redirected_at {
            None => true,
            Some(last) => {
                last.to_zoned(tz.clone()).date() < now.to_zoned(tz.clone()).date()
            }
        }
    }

    /// Run the guard. If a redirect is due, stamp the marker with `now` and
    /// return the route to navigate to.
    pub fn check(
        &mut self,
        status: Option<SubscriptionStatus>,
        current_path: &str,
        now: Timestamp,
        tz: &TimeZone,
    ) -> Option<&'static str> {
        if !self.should_redirect(status, current_path, now, tz) {
            return None;
        }
        tracing::info!(from = current_path, "Payment failed, redirecting to billing");
        self.last_redirected_at = Some(now);
        Some(BILLING_ROUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    fn now() -> Timestamp {
        "2025-03-12T15:30:00.123Z".parse().unwrap()
    }

    #[test]
    fn fast_poll_only_while_active() {
        let mut watch = BillingWatch::default();
        let active = watch.observe(Some(SubscriptionStatus::Active));
        assert_eq!(active.poll_interval, Some(FAST_POLL_INTERVAL));

        for status in [
            None,
            Some(SubscriptionStatus::PaymentFailed),
            Some(SubscriptionStatus::Other),
        ] {
            assert_eq!(watch.observe(status).poll_interval, None);
        }
    }

    #[test]
    fn first_observation_is_not_a_transition() {
        let mut watch = BillingWatch::default();
        let decision = watch.observe(Some(SubscriptionStatus::PaymentFailed));
        assert!(!decision.refetch_quotas);
    }

    #[test]
    fn leaving_active_refetches_quotas_once() {
        let mut watch = BillingWatch::new(QuotaRefresh::OnLeaveActive);
        watch.observe(Some(SubscriptionStatus::Active));
        assert!(!watch.observe(Some(SubscriptionStatus::Active)).refetch_quotas);

        let left = watch.observe(Some(SubscriptionStatus::Canceled));
        assert!(left.refetch_quotas);
        assert!(!watch.observe(Some(SubscriptionStatus::Canceled)).refetch_quotas);

        // Entering active is not what this page cares about.
        assert!(!watch.observe(Some(SubscriptionStatus::Active)).refetch_quotas);
    }

    #[test]
    fn entering_active_refetches_quotas() {
        let mut watch = BillingWatch::new(QuotaRefresh::OnEnterActive);
        watch.observe(Some(SubscriptionStatus::Incomplete));
        assert!(watch.observe(Some(SubscriptionStatus::Active)).refetch_quotas);
        assert!(!watch.observe(None).refetch_quotas);
    }

    #[test]
    fn any_change_refetches() {
        let mut watch = BillingWatch::new(QuotaRefresh::OnAnyChange);
        watch.observe(None);
        assert!(watch.observe(Some(SubscriptionStatus::Incomplete)).refetch_quotas);
        assert!(watch.observe(Some(SubscriptionStatus::PaymentFailed)).refetch_quotas);
        assert_eq!(
            watch.last_status(),
            Some(SubscriptionStatus::PaymentFailed)
        );
    }

    #[test]
    fn switching_mode_keeps_the_baseline() {
        // The shell's watch changes mode when the user opens the billing page.
        let mut watch = BillingWatch::new(QuotaRefresh::OnLeaveActive);
        watch.observe(Some(SubscriptionStatus::Incomplete));

        watch.set_refresh(QuotaRefresh::OnEnterActive);
        assert_eq!(watch.last_status(), Some(SubscriptionStatus::Incomplete));
        assert!(watch.observe(Some(SubscriptionStatus::Active)).refetch_quotas);

        watch.set_refresh(QuotaRefresh::OnLeaveActive);
        assert!(watch.observe(Some(SubscriptionStatus::Canceled)).refetch_quotas);
    }

    #[test]
    fn billing_paths() {
        assert!(is_billing_path("/billing"));
        assert!(is_billing_path("/billing/plans"));
        assert!(!is_billing_path("/billing-history"));
        assert!(!is_billing_path("/dashboard"));
    }

    #[test]
    fn redirects_once_when_marker_is_two_days_old() {
        let mut marker = RedirectMarker {
            last_redirected_at: Some(now() - 48.hours()),
        };
        let status = Some(SubscriptionStatus::PaymentFailed);

        assert_eq!(
            marker.check(status, "/dashboard", now(), &TimeZone::UTC),
            Some(BILLING_ROUTE)
        );
        assert_eq!(marker.last_redirected_at, Some(now()));
        assert_eq!(
            marker.check(status, "/dashboard", now(), &TimeZone::UTC),
            None
        );
    }

    #[test]
    fn marker_serializes_as_iso_8601() {
        let marker = RedirectMarker {
            last_redirected_at: Some(now()),
        };
        let json = serde_json::to_string(&marker).unwrap();
        assert_eq!(json, r#"{"last_redirected_at":"2025-03-12T15:30:00.123Z"}"#);
    }

    #[test]
    fn no_redirect_when_already_redirected_today() {
        let earlier_today: Timestamp = "2025-03-12T00:05:00Z".parse().unwrap();
        let mut marker = RedirectMarker {
            last_redirected_at: Some(earlier_today),
        };
        assert_eq!(
            marker.check(
                Some(SubscriptionStatus::PaymentFailed),
                "/dashboard",
                now(),
                &TimeZone::UTC,
            ),
            None
        );
        assert_eq!(marker.last_redirected_at, Some(earlier_today));
    }

    #[test]
    fn redirect_from_yesterday_allows_another() {
        let late_yesterday: Timestamp = "2025-03-11T23:59:00Z".parse().unwrap();
        let marker = RedirectMarker {
            last_redirected_at: Some(late_yesterday),
        };
        assert!(marker.should_redirect(
            Some(SubscriptionStatus::PaymentFailed),
            "/dashboard",
            now(),
            &TimeZone::UTC,
        ));
    }

    #[test]
    fn no_redirect_on_billing_pages_or_other_statuses() {
        let marker = RedirectMarker::default();
        assert!(!marker.should_redirect(
            Some(SubscriptionStatus::PaymentFailed),
            "/billing/plans",
            now(),
            &TimeZone::UTC,
        ));
        for status in [
            None,
            Some(SubscriptionStatus::Active),
            Some(SubscriptionStatus::Canceled),
        ] {
            assert!(!marker.should_redirect(
                status,
                "/dashboard",
                now(),
                &TimeZone::UTC
            ));
        }
    }

    #[test]
    fn calendar_day_depends_on_timezone() {
        // Both instants fall on the 12th in Tokyo but not in UTC.
        let marker = RedirectMarker {
            last_redirected_at: Some("2025-03-11T23:30:00Z".parse().unwrap()),
        };
        let now: Timestamp = "2025-03-12T10:00:00Z".parse().unwrap();
        let tokyo = TimeZone::fixed(jiff::tz::offset(9));
        let status = Some(SubscriptionStatus::PaymentFailed);

        assert!(!marker.should_redirect(status, "/dashboard", now, &tokyo));
        assert!(marker.should_redirect(
            status,
            "/dashboard",
            now,
            &TimeZone::UTC
        ));
    }
}
