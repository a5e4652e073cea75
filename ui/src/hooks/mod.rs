pub mod use_authentication;
pub mod use_billing;
pub mod use_notification_actions;
pub mod use_notifications;
pub mod use_query;
pub mod use_refetch_flag;
pub mod use_window_focus;

pub use use_authentication::{use_authentication, use_logout, use_sign_in};
pub use use_billing::{
    BillingActions, BillingStatus, use_billing_actions, use_billing_quotas,
    use_billing_redirect, use_billing_status, use_shared_billing_status,
};
pub use use_notification_actions::{
    NotificationActions, use_notification_actions,
};
pub use use_notifications::{
    use_notifications_for_employee, use_notifications_for_role,
};
pub use use_query::{QueryHandle, use_query, use_query_with_interval};
pub use use_refetch_flag::{use_raise_refetch, use_refetch_on_flag};
pub use use_window_focus::use_window_focus;

/// Distinguishes "not fetched yet" from "fetched, possibly empty".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    NotFetched,
    Fetched(T),
}

impl<T> FetchState<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Fetched(data) => Some(data),
            Self::NotFetched => None,
        }
    }
}
