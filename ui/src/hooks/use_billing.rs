//! Billing status polling, quota queries, the payment-failed redirect and
//! subscription actions.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use payloads::responses::{BillingQuotas, CurrentUser};
use payloads::{APIClient, ClientError, SubscriptionStatus, requests};
use portal_state::{
    AuthSession, BILLING_ROUTE, BillingWatch, Gated, QueryKey, QueryPolicy,
    QuotaRefresh,
};
use std::future::Future;
use std::time::Duration;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use super::{
    QueryHandle, use_query, use_query_with_interval, use_raise_refetch,
    use_refetch_on_flag,
};
use crate::contexts::{ToastHandle, use_toast};
use crate::state::{
    AuthStore, BillingRedirectStore, QueryInvalidations, QuotasRefetch,
};
use crate::{Route, get_api_client};

/// Shared with every page through a context provided by the app shell, so
/// the status is polled once.
#[derive(Clone, PartialEq)]
pub struct BillingStatus {
    /// The latest observed subscription status, if any.
    pub status: Option<SubscriptionStatus>,
    pub user: QueryHandle<CurrentUser>,
    /// Set while the status is polled quickly.
    pub poll_interval: Option<Duration>,
}

/// Gate a billing call on there being a session at all.
async fn signed_in<T, Fut>(
    session: AuthSession,
    call: impl FnOnce(APIClient) -> Fut,
) -> Result<Gated<T>, ClientError>
where
    Fut: Future<Output = Result<T, ClientError>>,
{
    if !session.is_authenticated() {
        return Ok(Gated::Unauthorized);
    }
    call(get_api_client(&session)).await.map(Gated::Authorized)
}

/// The status query for the app shell. On the billing page, e.g. when
/// returning from checkout, quotas refresh as soon as the plan turns
/// active; elsewhere when it stops being active.
#[hook]
pub fn use_billing_status() -> BillingStatus {
    let refresh = match use_route::<Route>() {
        Some(Route::Billing) => QuotaRefresh::OnEnterActive,
        _ => QuotaRefresh::default(),
    };
    use_billing_status_with(refresh)
}

/// The status polled by the app shell.
#[hook]
pub fn use_shared_billing_status() -> Option<BillingStatus> {
    use_context::<BillingStatus>()
}

/// The current user's subscription status.
///
/// Polls every few seconds while the subscription is active, and asks the
/// quota query to refetch when the status makes a transition `refresh`
/// cares about.
#[hook]
pub fn use_billing_status_with(refresh: QuotaRefresh) -> BillingStatus {
    let (auth, _) = use_store::<AuthStore>();
    let invalidations = use_dispatch::<QueryInvalidations>();
    let watch = use_mut_ref(|| BillingWatch::new(refresh));
    watch.borrow_mut().set_refresh(refresh);
    let poll_interval = use_state_eq(|| None::<Duration>);

    let session = auth.session.clone();
    let user = use_query_with_interval(
        QueryKey::CurrentUser,
        QueryPolicy::BILLING,
        session.is_authenticated(),
        *poll_interval,
        move || signed_in(session.clone(), |api| async move {
            api.current_user().await
        }),
    );

    let observed = user.data.as_ref().map(|user| user.subscription_status);
    {
        let poll_interval = poll_interval.clone();
        use_effect_with(observed, move |observed| match observed {
            Some(status) => {
                let decision = watch.borrow_mut().observe(*status);
                poll_interval.set(decision.poll_interval);
                if decision.refetch_quotas {
                    invalidations.reduce_mut(|invalidations| {
                        invalidations.invalidate(QueryKey::BillingQuotas)
                    });
                }
            }
            // The query was reset, e.g. by a new session.
            None => {
                *watch.borrow_mut() = BillingWatch::new(refresh);
                poll_interval.set(None);
            }
        });
    }

    BillingStatus {
        status: observed.flatten(),
        user,
        poll_interval: *poll_interval,
    }
}

#[hook]
pub fn use_billing_quotas() -> QueryHandle<BillingQuotas> {
    let (auth, _) = use_store::<AuthStore>();
    let session = auth.session.clone();

    let quotas = use_query(
        QueryKey::BillingQuotas,
        QueryPolicy::BILLING,
        session.is_authenticated(),
        move || signed_in(session.clone(), |api| async move {
            api.billing_quotas().await
        }),
    );
    use_refetch_on_flag::<QuotasRefetch>(quotas.refetch.clone());
    quotas
}

/// Send a user whose payment failed to the billing page, at most once a
/// day. Runs on every render.
#[hook]
pub fn use_billing_redirect(status: Option<SubscriptionStatus>) {
    let dispatch = use_dispatch::<BillingRedirectStore>();
    let navigator = use_navigator();
    let path = use_location()
        .map(|location| location.path().to_string())
        .unwrap_or_default();

    use_effect(move || {
        let mut marker = dispatch.get().marker.clone();
        let due = marker.check(status, &path, Timestamp::now(), &TimeZone::system());
        if let Some(target) = due {
            dispatch.set(BillingRedirectStore { marker });
            match (Route::recognize(target), navigator) {
                (Some(route), Some(navigator)) => navigator.push(&route),
                _ => tracing::error!(target, "Cannot navigate to billing"),
            }
        }
    });
}

pub struct BillingActions {
    /// Start a subscription to a plan and go to checkout.
    pub subscribe: Callback<String>,
    pub change_plan: Callback<String>,
    pub cancel: Callback<()>,
    pub open_portal: Callback<()>,
    pub is_pending: bool,
}

/// How a billing action finished.
enum Settled {
    /// Continue at the payment processor.
    Redirect(String),
    /// The subscription changed in place.
    Changed(&'static str),
}

#[derive(Clone)]
struct ActionContext {
    session: AuthSession,
    auth: Dispatch<AuthStore>,
    invalidations: Dispatch<QueryInvalidations>,
    raise_quotas_refetch: Callback<()>,
    toasts: ToastHandle,
    pending: UseStateHandle<bool>,
}

impl ActionContext {
    fn run<Fut>(&self, action: impl FnOnce(APIClient) -> Fut + 'static)
    where
        Fut: Future<Output = Result<Settled, ClientError>> + 'static,
    {
        if *self.pending {
            return;
        }
        self.pending.set(true);
        let ctx = self.clone();
        yew::platform::spawn_local(async move {
            let result = action(get_api_client(&ctx.session)).await;
            ctx.pending.set(false);
            match result {
                Ok(Settled::Redirect(url)) => navigate_away(&url),
                Ok(Settled::Changed(message)) => {
                    ctx.invalidations.reduce_mut(|invalidations| {
                        invalidations.invalidate(QueryKey::CurrentUser);
                        invalidations.invalidate(QueryKey::BillingQuotas);
                    });
                    ctx.raise_quotas_refetch.emit(());
                    ctx.toasts.success(message);
                }
                Err(e) => {
                    tracing::error!("Billing action failed: {e}");
                    ctx.auth.reduce_mut(|auth| {
                        auth.session.observe_error(&e);
                    });
                    ctx.toasts.error(e.to_string());
                }
            }
        });
    }
}

fn billing_page_url() -> String {
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}{BILLING_ROUTE}")
}

fn navigate_away(url: &str) {
    let result = web_sys::window()
        .map(|window| window.location().set_href(url))
        .transpose();
    if let Err(e) = result {
        tracing::error!(url, "Failed to leave for payment page: {e:?}");
    }
}

#[hook]
pub fn use_billing_actions() -> BillingActions {
    let (auth, auth_dispatch) = use_store::<AuthStore>();
    let ctx = ActionContext {
        session: auth.session.clone(),
        auth: auth_dispatch,
        invalidations: use_dispatch::<QueryInvalidations>(),
        raise_quotas_refetch: use_raise_refetch::<QuotasRefetch>(),
        toasts: use_toast(),
        pending: use_state(|| false),
    };

    let subscribe = {
        let ctx = ctx.clone();
        Callback::from(move |plan_id: String| {
            ctx.run(|api| async move {
                let details = requests::CreateSubscription {
                    plan_id,
                    success_url: billing_page_url(),
                    cancel_url: billing_page_url(),
                };
                let checkout = api.create_subscription(&details).await?;
                Ok(Settled::Redirect(checkout.url))
            })
        })
    };

    let change_plan = {
        let ctx = ctx.clone();
        Callback::from(move |plan_id: String| {
            ctx.run(|api| async move {
                let details = requests::UpdateSubscription { plan_id };
                api.update_subscription(&details).await?;
                Ok(Settled::Changed("Plan updated"))
            })
        })
    };

    let cancel = {
        let ctx = ctx.clone();
        Callback::from(move |()| {
            ctx.run(|api| async move {
                api.cancel_subscription().await?;
                Ok(Settled::Changed("Subscription canceled"))
            })
        })
    };

    let open_portal = {
        let ctx = ctx.clone();
        Callback::from(move |()| {
            ctx.run(|api| async move {
                let details = requests::BillingPortal {
                    return_url: billing_page_url(),
                };
                let portal = api.billing_portal(&details).await?;
                Ok(Settled::Redirect(portal.url))
            })
        })
    };

    BillingActions {
        subscribe,
        change_plan,
        cancel,
        open_portal,
        is_pending: *ctx.pending,
    }
}
