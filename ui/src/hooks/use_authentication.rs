use jiff::Timestamp;
use portal_state::Feedback;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::Route;
use crate::contexts::toast::{Toast, use_toast};
use crate::state::{
    AuthStore, NotificationState, NotificationsRefetch, QuotasRefetch,
};

/// Session lifecycle, mounted once at the root.
///
/// Drops a stored session that expired while the tab was away, and clears
/// user specific state whenever the session changes, whether by sign-in,
/// logout or an unauthorized response.
#[hook]
pub fn use_authentication() {
    let (auth, auth_dispatch) = use_store::<AuthStore>();
    let notifications = use_dispatch::<NotificationState>();
    let notifications_refetch = use_dispatch::<NotificationsRefetch>();
    let quotas_refetch = use_dispatch::<QuotasRefetch>();
    let toasts = use_toast();

    use_effect_with((), move |_| {
        if auth_dispatch.get().session.is_expired(Timestamp::now()) {
            tracing::info!("Stored session expired");
            auth_dispatch.reduce_mut(|auth| auth.session.reset());
            toasts.add(
                Toast::from(Feedback::Info(
                    "Your session has expired. Please sign in again.".into(),
                ))
                .sticky(),
            );
        }
    });

    let token = auth.session.token().map(str::to_string);
    use_effect_with(token, move |token| {
        notifications.reduce_mut(|state| state.store.clear());
        if token.is_none() {
            notifications_refetch.set(NotificationsRefetch::default());
            quotas_refetch.set(QuotasRefetch::default());
        }
    });
}

/// Start a session from a pasted token.
#[hook]
pub fn use_sign_in() -> Callback<String> {
    let auth = use_dispatch::<AuthStore>();
    let toasts = use_toast();

    Callback::from(move |token: String| {
        let mut next = (*auth.get()).clone();
        match next.session.set_user(token.trim()) {
            Ok(()) => auth.set(next),
            Err(e) => {
                tracing::warn!("Rejected sign-in token: {e}");
                toasts.error(format!("Could not sign in: {e}"));
            }
        }
    })
}

#[hook]
pub fn use_logout() -> Callback<MouseEvent> {
    let auth = use_dispatch::<AuthStore>();
    let navigator = use_navigator();

    Callback::from(move |_| {
        auth.reduce_mut(|auth| auth.session.reset());
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Home);
        }
    })
}
