use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::Route;
use crate::components::SignInForm;
use crate::state::AuthStore;

/// Areas of the portal and the permission that opens each of them.
const AREAS: &[(&str, &str)] = &[
    ("Attendance", "attendance"),
    ("Leave", "leave"),
    ("Payroll", "payroll"),
    ("Perks", "perks"),
    ("Announcements", "announcements"),
    ("Replicas", "replicas"),
];

#[function_component]
pub fn HomePage() -> Html {
    let (auth, _) = use_store::<AuthStore>();

    let Some(user) = auth.session.user() else {
        return html! {
            <div class="space-y-6">
                <h1 class="text-2xl font-bold">{"Sign in"}</h1>
                <SignInForm />
            </div>
        };
    };

    html! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">{format!("Welcome, {}", user.first_name)}</h1>
            <ul class="grid grid-cols-2 md:grid-cols-3 gap-4">
                {for AREAS.iter().map(|(label, permission)| {
                    let (state, tone) = match (
                        auth.session.read_permission(permission),
                        auth.session.write_permission(permission),
                    ) {
                        (_, true) => ("Full access", "text-green-700 dark:text-green-400"),
                        (true, false) => ("Read only", "text-neutral-600 dark:text-neutral-400"),
                        (false, false) => ("No access", "text-neutral-400 dark:text-neutral-500"),
                    };
                    html! {
                        <li class="p-4 rounded-lg border border-gray-200 dark:border-gray-700">
                            <p class="font-medium">{*label}</p>
                            <p class={classes!("text-sm", tone)}>{state}</p>
                        </li>
                    }
                })}
            </ul>
            <Link<Route> to={Route::Notifications}
                classes="inline-block text-blue-600 dark:text-blue-400 hover:underline">
                {"View notifications"}
            </Link<Route>>
        </div>
    }
}
