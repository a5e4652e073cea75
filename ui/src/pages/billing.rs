use payloads::SubscriptionStatus;
use yew::prelude::*;

use crate::components::UsageMeter;
use crate::hooks::{
    use_billing_actions, use_billing_quotas, use_shared_billing_status,
};

const PLANS: &[(&str, &str)] = &[("starter", "Starter"), ("team", "Team")];

fn status_label(status: Option<SubscriptionStatus>) -> &'static str {
    match status {
        Some(SubscriptionStatus::Active) => "Active",
        Some(SubscriptionStatus::PaymentFailed) => "Payment failed",
        Some(SubscriptionStatus::Canceled) => "Canceled",
        Some(SubscriptionStatus::Incomplete) => "Waiting for checkout",
        Some(SubscriptionStatus::Other) => "Unknown",
        None => "No subscription",
    }
}

#[function_component]
pub fn BillingPage() -> Html {
    let quotas = use_billing_quotas();
    let actions = use_billing_actions();
    let Some(billing) = use_shared_billing_status() else {
        tracing::error!("Billing page rendered outside the app shell");
        return html! {};
    };
    let is_active = billing.status.is_some_and(|s| s.is_active());

    let plan_buttons = PLANS.iter().map(|(plan_id, label)| {
        let plan_id = plan_id.to_string();
        let (text, onclick) = if is_active {
            let change_plan = actions.change_plan.clone();
            (format!("Switch to {label}"), Callback::from(move |_: MouseEvent| {
                change_plan.emit(plan_id.clone())
            }))
        } else {
            let subscribe = actions.subscribe.clone();
            (format!("Subscribe to {label}"), Callback::from(move |_: MouseEvent| {
                subscribe.emit(plan_id.clone())
            }))
        };
        html! {
            <button {onclick} disabled={actions.is_pending}
                class="px-3 py-1.5 text-sm rounded-md border border-blue-600 text-blue-600 dark:text-blue-400 disabled:opacity-50">
                {text}
            </button>
        }
    });

    let on_cancel = {
        let cancel = actions.cancel.clone();
        Callback::from(move |_: MouseEvent| cancel.emit(()))
    };
    let on_portal = {
        let open_portal = actions.open_portal.clone();
        Callback::from(move |_: MouseEvent| open_portal.emit(()))
    };

    html! {
        <div class="space-y-8">
            <h1 class="text-2xl font-bold">{"Billing"}</h1>

            <section class="space-y-2">
                <h2 class="text-lg font-semibold">{"Subscription"}</h2>
                {billing.user.render("subscription", |user, _, _| html! {
                    <p>
                        {status_label(user.subscription_status)}
                        if let Some(plan) = &user.plan_id {
                            <span class="ml-2 text-neutral-600 dark:text-neutral-400">
                                {format!("({plan})")}
                            </span>
                        }
                    </p>
                })}
                if billing.status == Some(SubscriptionStatus::PaymentFailed) {
                    <p class="text-sm text-red-700 dark:text-red-400">
                        {"Your last payment did not go through. Update your payment method to keep your plan."}
                    </p>
                }
                if billing.poll_interval.is_some() {
                    <p class="text-xs text-neutral-500">{"Watching for changes"}</p>
                }
            </section>

            <section class="space-y-3">
                <h2 class="text-lg font-semibold">{"Usage"}</h2>
                {quotas.render("usage", |quotas, _, _| html! {
                    <div class="space-y-3 max-w-md">
                        {for quotas.counters.iter().map(|counter| html! {
                            <UsageMeter key={counter.name.clone()} counter={counter.clone()} />
                        })}
                    </div>
                })}
            </section>

            <section class="flex flex-wrap gap-3">
                {for plan_buttons}
                if is_active {
                    <button onclick={on_cancel} disabled={actions.is_pending}
                        class="px-3 py-1.5 text-sm rounded-md border border-red-600 text-red-600 disabled:opacity-50">
                        {"Cancel subscription"}
                    </button>
                }
                if billing.status.is_some() {
                    <button onclick={on_portal} disabled={actions.is_pending}
                        class="px-3 py-1.5 text-sm rounded-md bg-blue-600 text-white disabled:opacity-50">
                        {"Manage payment details"}
                    </button>
                }
            </section>
        </div>
    }
}
