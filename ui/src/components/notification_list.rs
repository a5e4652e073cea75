use jiff::Timestamp;
use jiff::tz::TimeZone;
use payloads::Notification;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::hooks::use_notification_actions;
use crate::state::NotificationState;

fn format_created_at(created_at: Timestamp) -> String {
    created_at
        .to_zoned(TimeZone::system())
        .strftime("%b %-d, %H:%M")
        .to_string()
}

#[derive(Properties, PartialEq)]
pub struct NotificationListProps {
    /// A refetch is in flight.
    #[prop_or_default]
    pub is_loading: bool,
}

/// The notifications in the store, newest first, with read actions.
#[function_component]
pub fn NotificationList(props: &NotificationListProps) -> Html {
    let (state, _) = use_store::<NotificationState>();
    let actions = use_notification_actions();

    let mut notifications: Vec<Notification> =
        state.store.notifications().to_vec();
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if notifications.is_empty() {
        return html! {
            <p class="text-neutral-600 dark:text-neutral-400">
                {"You have no notifications"}
            </p>
        };
    }

    let on_mark_all = {
        let mark_all = actions.mark_all_as_read.clone();
        Callback::from(move |_: MouseEvent| mark_all.emit(()))
    };

    html! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <p class="text-sm text-neutral-600 dark:text-neutral-400">
                    {format!("{} unread", state.store.unread_count())}
                    if props.is_loading {
                        <span class="ml-2">{"Refreshing..."}</span>
                    }
                </p>
                <button
                    onclick={on_mark_all}
                    disabled={actions.is_marking_all || state.store.unread_count() == 0}
                    class="px-3 py-1.5 text-sm rounded-md bg-blue-600 text-white disabled:opacity-50"
                >
                    {"Mark all as read"}
                </button>
            </div>
            <ul class="divide-y divide-gray-200 dark:divide-gray-700">
                {for notifications.into_iter().map(|notification| {
                    let on_read = {
                        let mark_one = actions.mark_as_read.clone();
                        let id = notification.id.clone();
                        Callback::from(move |_: MouseEvent| mark_one.emit(id.clone()))
                    };
                    let weight = if notification.read { "font-normal" } else { "font-semibold" };
                    html! {
                        <li key={notification.id.to_string()} class="py-3 flex items-start justify-between">
                            <div>
                                if let Some(title) = &notification.title {
                                    <p class={classes!("text-sm", weight)}>{title}</p>
                                }
                                <p class={classes!("text-sm", weight)}>{&notification.message}</p>
                                <p class="text-xs text-neutral-500">
                                    {format_created_at(notification.created_at)}
                                </p>
                            </div>
                            if !notification.read {
                                <button onclick={on_read}
                                    class="text-xs text-blue-600 dark:text-blue-400 hover:underline">
                                    {"Mark as read"}
                                </button>
                            }
                        </li>
                    }
                })}
            </ul>
        </div>
    }
}
