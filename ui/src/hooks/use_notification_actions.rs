use payloads::NotificationId;
use portal_state::{MarkReadOptions, mark_all_as_read, mark_as_read};
use yew::prelude::*;
use yewdux::prelude::*;

use super::use_raise_refetch;
use crate::contexts::use_toast;
use crate::get_api_client;
use crate::state::{
    AuthStore, NotificationDispatch, NotificationState, NotificationsRefetch,
};

pub struct NotificationActions {
    pub mark_as_read: Callback<NotificationId>,
    pub mark_all_as_read: Callback<()>,
    /// A bulk mark is still settling.
    pub is_marking_all: bool,
}

/// Read-state mutations on the notification store, with toast feedback.
#[hook]
pub fn use_notification_actions() -> NotificationActions {
    let (auth, auth_dispatch) = use_store::<AuthStore>();
    let notifications = use_dispatch::<NotificationState>();
    let toasts = use_toast();
    let raise_refetch = use_raise_refetch::<NotificationsRefetch>();
    let is_marking_all = use_state(|| false);

    let mark_one = {
        let session = auth.session.clone();
        let sink = NotificationDispatch(notifications.clone());
        let auth_dispatch = auth_dispatch.clone();
        let toasts = toasts.clone();
        Callback::from(move |id: NotificationId| {
            let api = get_api_client(&session);
            let sink = sink.clone();
            let auth_dispatch = auth_dispatch.clone();
            let toasts = toasts.clone();
            yew::platform::spawn_local(async move {
                let outcome =
                    mark_as_read(&api, &sink, &id, MarkReadOptions::default())
                        .await;
                if let Err(e) = &outcome.result {
                    auth_dispatch.reduce_mut(|auth| {
                        auth.session.observe_error(e);
                    });
                }
                if let Some(feedback) = outcome.feedback {
                    toasts.feedback(feedback);
                }
            });
        })
    };

    let mark_all = {
        let session = auth.session.clone();
        let sink = NotificationDispatch(notifications);
        let is_marking_all = is_marking_all.clone();
        Callback::from(move |()| {
            if *is_marking_all {
                return;
            }
            let api = get_api_client(&session);
            let sink = sink.clone();
            let auth_dispatch = auth_dispatch.clone();
            let toasts = toasts.clone();
            let raise_refetch = raise_refetch.clone();
            let is_marking_all = is_marking_all.clone();
            let list = sink.0.get().store.notifications().to_vec();
            is_marking_all.set(true);
            yew::platform::spawn_local(async move {
                let outcome = mark_all_as_read(&api, &sink, &list).await;
                is_marking_all.set(false);
                if !outcome.is_success() {
                    tracing::warn!(
                        failed = outcome.failures.len(),
                        of = outcome.targeted.len(),
                        "Bulk mark as read incomplete"
                    );
                    auth_dispatch.reduce_mut(|auth| {
                        for (_, e) in &outcome.failures {
                            auth.session.observe_error(e);
                        }
                    });
                    // Resync the screen with what the backend accepted.
                    raise_refetch.emit(());
                }
                toasts.feedback(outcome.feedback());
            });
        })
    };

    NotificationActions {
        mark_as_read: mark_one,
        mark_all_as_read: mark_all,
        is_marking_all: *is_marking_all,
    }
}
