use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::Route;
use crate::hooks::use_logout;
use crate::state::{AuthStore, NotificationState};

#[function_component]
pub fn Header() -> Html {
    let (auth, _) = use_store::<AuthStore>();
    let unread = use_selector(|state: &NotificationState| {
        state.store.unread_count()
    });
    let on_logout = use_logout();

    let nav = match auth.session.user() {
        Some(user) => html! {
            <div class="flex items-center space-x-6">
                <Link<Route> to={Route::Notifications}
                    classes="text-sm font-medium hover:text-blue-600 dark:hover:text-blue-400">
                    {"Notifications"}
                    if *unread > 0 {
                        <span class="ml-2 inline-flex items-center px-2 py-0.5 rounded-full text-xs bg-blue-600 text-white">
                            {*unread}
                        </span>
                    }
                </Link<Route>>
                <Link<Route> to={Route::Billing}
                    classes="text-sm font-medium hover:text-blue-600 dark:hover:text-blue-400">
                    {"Billing"}
                </Link<Route>>
                <span class="text-sm text-gray-600 dark:text-gray-300">
                    {user.full_name()}
                </span>
                <button onclick={on_logout}
                    class="text-sm text-gray-600 hover:text-gray-900 dark:text-gray-300 dark:hover:text-white">
                    {"Sign out"}
                </button>
            </div>
        },
        None => html! {},
    };

    html! {
        <header class="bg-white dark:bg-gray-800 border-b border-gray-200 dark:border-gray-700">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <Link<Route> to={Route::Home}
                        classes="text-xl font-semibold text-gray-900 dark:text-white">
                        {"People Portal"}
                    </Link<Route>>
                    {nav}
                </div>
            </div>
        </header>
    }
}
