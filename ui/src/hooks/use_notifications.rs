use payloads::{EmployeeId, Notification, RoleId};
use portal_state::{NotificationScope, QueryKey, QueryPolicy, refresh_notifications};
use yew::prelude::*;
use yewdux::prelude::*;

use super::{QueryHandle, use_query, use_refetch_on_flag};
use crate::get_api_client;
use crate::state::{
    AuthStore, NotificationDispatch, NotificationState, NotificationsRefetch,
};

/// The notification feed of `role`, mirrored into the notification store.
///
/// A session with a different role gets an unauthorized, empty result
/// without a request being made.
#[hook]
pub fn use_notifications_for_role(
    role: RoleId,
) -> QueryHandle<Vec<Notification>> {
    let (auth, _) = use_store::<AuthStore>();
    let notifications = NotificationDispatch(use_dispatch::<NotificationState>());
    let session = auth.session.clone();

    let query = use_query(
        QueryKey::RoleNotifications(role),
        QueryPolicy::NOTIFICATIONS,
        true,
        move || {
            let session = session.clone();
            let sink = notifications.clone();
            async move {
                let api = get_api_client(&session);
                refresh_notifications(
                    &api,
                    &session,
                    &NotificationScope::Role(role),
                    &sink,
                )
                .await
            }
        },
    );
    use_refetch_on_flag::<NotificationsRefetch>(query.refetch.clone());
    query
}

/// The feed of one employee. Does nothing until `employee_id` is set.
#[hook]
pub fn use_notifications_for_employee(
    employee_id: EmployeeId,
) -> QueryHandle<Vec<Notification>> {
    let (auth, _) = use_store::<AuthStore>();
    let notifications = NotificationDispatch(use_dispatch::<NotificationState>());
    let session = auth.session.clone();
    let enabled = !employee_id.is_empty();

    let query = use_query(
        QueryKey::EmployeeNotifications(employee_id.clone()),
        QueryPolicy::NOTIFICATIONS,
        enabled,
        move || {
            let session = session.clone();
            let sink = notifications.clone();
            let scope = NotificationScope::Employee(employee_id.clone());
            async move {
                let api = get_api_client(&session);
                refresh_notifications(&api, &session, &scope, &sink).await
            }
        },
    );
    use_refetch_on_flag::<NotificationsRefetch>(query.refetch.clone());
    query
}
