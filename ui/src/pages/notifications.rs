use payloads::{EmployeeId, RoleId};
use yew::prelude::*;
use yewdux::prelude::*;

use crate::components::NotificationList;
use crate::hooks::{
    use_notifications_for_employee, use_notifications_for_role,
};
use crate::state::AuthStore;

#[function_component]
pub fn NotificationsPage() -> Html {
    let (auth, _) = use_store::<AuthStore>();

    let feed = match auth.session.user() {
        None => html! {
            <p class="text-neutral-600 dark:text-neutral-400">
                {"Sign in to see your notifications"}
            </p>
        },
        Some(user) if user.role_id == RoleId::HR => html! { <HrFeed /> },
        Some(user) => html! { <EmployeeFeed employee_id={user.employee_id()} /> },
    };

    html! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">{"Notifications"}</h1>
            {feed}
        </div>
    }
}

#[function_component]
fn HrFeed() -> Html {
    let query = use_notifications_for_role(RoleId::HR);
    query.render("notifications", |_, is_loading, error| html! {
        <>
            if let Some(error) = error {
                <p class="text-sm text-red-700 dark:text-red-400">{error.clone()}</p>
            }
            <NotificationList {is_loading} />
        </>
    })
}

#[derive(Properties, PartialEq)]
struct EmployeeFeedProps {
    employee_id: EmployeeId,
}

#[function_component]
fn EmployeeFeed(props: &EmployeeFeedProps) -> Html {
    let query = use_notifications_for_employee(props.employee_id.clone());
    query.render("notifications", |_, is_loading, error| html! {
        <>
            if let Some(error) = error {
                <p class="text-sm text-red-700 dark:text-red-400">{error.clone()}</p>
            }
            <NotificationList {is_loading} />
        </>
    })
}
