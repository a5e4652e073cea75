//! Client-side state for the HR portal, independent of the browser.
//!
//! Everything here is a plain value or an async function over the
//! [`fetch::NotificationApi`] seam, so the same code runs inside Yew hooks
//! and in native tests.

pub mod actions;
pub mod billing;
pub mod fetch;
pub mod notifications;
pub mod query;
pub mod session;

pub use actions::{
    BulkReadOutcome, Feedback, MarkReadOptions, ReadOutcome, mark_all_as_read,
    mark_as_read,
};
pub use billing::{
    BILLING_ROUTE, BillingWatch, FAST_POLL_INTERVAL, PollDecision,
    QuotaRefresh, RedirectMarker,
};
pub use fetch::{
    Gated, NotificationApi, NotificationScope, fetch_for_employee,
    fetch_for_role, refresh_notifications,
};
pub use notifications::{FetchTicket, NotificationSink, NotificationStore};
pub use query::{QueryKey, QueryPolicy, QueryState, with_retry};
pub use session::{AuthSession, SessionError};
