use gloo_timers::callback::Interval;
use gloo_timers::future::sleep;
use jiff::Timestamp;
use payloads::ClientError;
use portal_state::{Gated, QueryKey, QueryPolicy, QueryState, with_retry};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use yew::prelude::*;
use yewdux::prelude::*;

use super::{FetchState, use_window_focus};
use crate::state::{AuthStore, QueryInvalidations};

/// How often a mounted query checks whether its data went stale.
const STALENESS_CHECK: Duration = Duration::from_secs(30);

/// What a query hook hands back to components.
#[derive(Clone, PartialEq)]
pub struct QueryHandle<T> {
    pub data: FetchState<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// False when the session was not allowed to ask for this data.
    pub is_authorized: bool,
    pub refetch: Callback<()>,
}

impl<T> QueryHandle<T> {
    /// Render the data once it is there, with loading and error states for
    /// the first fetch. Later refetches keep showing the previous data and
    /// pass their loading flag and error to `render_fn`.
    pub fn render<F>(&self, context: &str, render_fn: F) -> Html
    where
        F: Fn(&T, bool, Option<&String>) -> Html,
    {
        match self.data.as_ref() {
            Some(data) => render_fn(data, self.is_loading, self.error.as_ref()),
            None if !self.is_authorized => html! {
                <p class="text-neutral-600 dark:text-neutral-400">
                    {format!("No {context} available for this account")}
                </p>
            },
            None if self.error.is_some() => html! {
                <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 border border-red-200 dark:border-red-800">
                    <p class="text-sm text-red-700 dark:text-red-400">
                        {format!(
                            "Error loading {context}: {}",
                            self.error.as_deref().unwrap_or_default()
                        )}
                    </p>
                </div>
            },
            None => html! {
                <div class="text-center py-12">
                    <p class="text-neutral-600 dark:text-neutral-400">
                        {format!("Loading {context}...")}
                    </p>
                </div>
            },
        }
    }
}

/// A cached query with the portal's fixed policy.
///
/// Fetches on mount and whenever the key, `enabled` or the session token
/// changes. Refetches when the window regains focus or the data goes
/// stale, and when another hook invalidates the key. Failed fetches are
/// retried per `policy`; a response to a superseded request is dropped.
/// An unauthorized response ends the session.
#[hook]
pub fn use_query<T, F, Fut>(
    key: QueryKey,
    policy: QueryPolicy,
    enabled: bool,
    fetch: F,
) -> QueryHandle<T>
where
    T: Clone + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<Gated<T>, ClientError>> + 'static,
{
    use_query_with_interval(key, policy, enabled, None, fetch)
}

/// [`use_query`], additionally refetching every `interval` while set.
#[hook]
pub fn use_query_with_interval<T, F, Fut>(
    key: QueryKey,
    policy: QueryPolicy,
    enabled: bool,
    interval: Option<Duration>,
    fetch: F,
) -> QueryHandle<T>
where
    T: Clone + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<Gated<T>, ClientError>> + 'static,
{
    let (auth, auth_dispatch) = use_store::<AuthStore>();
    let state = use_mut_ref(QueryState::<Gated<T>>::default);
    let rerender = use_force_update();

    // Always run the closure from the latest render, it captures the session.
    let latest_fetch = use_mut_ref(|| None::<Rc<F>>);
    *latest_fetch.borrow_mut() = Some(Rc::new(fetch));

    let refetch = {
        let state = state.clone();
        let rerender = rerender.clone();
        use_callback(key.clone(), move |_, key: &QueryKey| {
            let Some(fetch) = latest_fetch.borrow().clone() else {
                return;
            };
            let generation = state.borrow_mut().begin();
            rerender.force_update();

            let key = key.clone();
            let state = state.clone();
            let rerender = rerender.clone();
            let auth_dispatch = auth_dispatch.clone();
            yew::platform::spawn_local(async move {
                let result = with_retry(&policy, || fetch(), sleep).await;
                if let Err(e) = &result {
                    tracing::error!(%key, "Query failed: {e}");
                    auth_dispatch.reduce_mut(|auth| {
                        auth.session.observe_error(e);
                    });
                }
                let applied = state.borrow_mut().resolve(
                    generation,
                    result.map_err(|e| e.to_string()),
                    Timestamp::now(),
                );
                if applied {
                    rerender.force_update();
                }
            });
        })
    };

    // Fetch on mount, and start over when the key or the session changes.
    {
        let refetch = refetch.clone();
        let state = state.clone();
        let token = auth.session.token().map(str::to_string);
        use_effect_with((key.clone(), enabled, token), move |(_, enabled, _)| {
            state.borrow_mut().reset();
            if *enabled {
                refetch.emit(());
            }
        });
    }

    let refetch_if_stale = {
        let refetch = refetch.clone();
        let state = state.clone();
        use_callback((enabled, refetch), move |(), (enabled, refetch)| {
            let due = {
                let state = state.borrow();
                !state.is_loading()
                    && state.is_stale(&policy, Timestamp::now())
            };
            if *enabled && due {
                refetch.emit(());
            }
        })
    };

    let on_focus = use_callback(
        refetch_if_stale.clone(),
        move |(), refetch_if_stale| {
            if policy.refetch_on_focus {
                refetch_if_stale.emit(());
            }
        },
    );
    use_window_focus(on_focus);

    use_effect_with(refetch_if_stale, |refetch_if_stale| {
        let refetch_if_stale = refetch_if_stale.clone();
        let check = Interval::new(STALENESS_CHECK.as_millis() as u32, move || {
            refetch_if_stale.emit(())
        });
        move || drop(check)
    });

    {
        let refetch = refetch.clone();
        let state = state.clone();
        use_effect_with((interval, enabled, refetch), move |(interval, enabled, refetch)| {
            let poll = interval.filter(|_| *enabled).map(|interval| {
                tracing::debug!(?interval, "Polling query");
                let refetch = refetch.clone();
                Interval::new(interval.as_millis() as u32, move || {
                    let due = state.borrow().should_poll();
                    if due {
                        refetch.emit(());
                    }
                })
            });
            move || drop(poll)
        });
    }

    // Refetch when another hook invalidates this key.
    {
        let version = use_selector_with_deps(
            |invalidations: &QueryInvalidations, key: &QueryKey| {
                invalidations.version(key)
            },
            key.clone(),
        );
        let seen = use_mut_ref(|| *version);
        let refetch = refetch.clone();
        use_effect_with(*version, move |version| {
            if *seen.borrow() != *version {
                *seen.borrow_mut() = *version;
                if enabled {
                    refetch.emit(());
                }
            }
        });
    }

    let state = state.borrow();
    let (data, is_authorized) = match state.data() {
        Some(Gated::Authorized(data)) => (FetchState::Fetched(data.clone()), true),
        Some(Gated::Unauthorized) => (FetchState::NotFetched, false),
        None => (FetchState::NotFetched, true),
    };

    QueryHandle {
        data,
        is_loading: state.is_loading(),
        error: state.error().map(str::to_string),
        is_authorized,
        refetch,
    }
}
