use portal_state::{
    AuthSession, FetchTicket, NotificationSink, NotificationStore, QueryKey,
    RedirectMarker,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use yewdux::prelude::*;

/// The signed-in session, kept across reloads for the lifetime of the tab.
#[derive(Default, Clone, PartialEq, Serialize, Deserialize, Store)]
#[store(storage = "session")]
pub struct AuthStore {
    pub session: AuthSession,
}

#[derive(Default, Clone, PartialEq, Store)]
pub struct NotificationState {
    pub store: NotificationStore,
}

/// Lets the async fetchers and actions write into the yewdux store.
#[derive(Clone)]
pub struct NotificationDispatch(pub Dispatch<NotificationState>);

impl NotificationSink for NotificationDispatch {
    fn ticket(&self) -> FetchTicket {
        let mut state = NotificationState::clone(&self.0.get());
        let ticket = state.store.begin_fetch();
        self.0.set(state);
        ticket
    }

    fn update(&self, f: impl FnOnce(&mut NotificationStore)) {
        self.0.reduce_mut(|state| f(&mut state.store));
    }
}

#[derive(Default, Clone, PartialEq, Serialize, Deserialize, Store)]
#[store(storage = "session")]
pub struct BillingRedirectStore {
    pub marker: RedirectMarker,
}

/// Explicit invalidations, so one query can ask another to refetch now
/// instead of waiting for it to go stale.
#[derive(Default, Clone, PartialEq, Store)]
pub struct QueryInvalidations {
    versions: HashMap<QueryKey, u64>,
}

impl QueryInvalidations {
    pub fn version(&self, key: &QueryKey) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    pub fn invalidate(&mut self, key: QueryKey) {
        tracing::debug!(%key, "Invalidating query");
        *self.versions.entry(key).or_default() += 1;
    }
}

/// A persisted "this list changed elsewhere, refetch it when shown" flag.
pub trait RefetchFlag: Store + Clone + PartialEq + Default {
    fn is_raised(&self) -> bool;
    fn set_raised(&mut self, raised: bool);
}

macro_rules! refetch_flags {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Default, Clone, PartialEq, Serialize, Deserialize, Store)]
            #[store(storage = "session")]
            pub struct $name {
                raised: bool,
            }

            impl RefetchFlag for $name {
                fn is_raised(&self) -> bool {
                    self.raised
                }

                fn set_raised(&mut self, raised: bool) {
                    self.raised = raised;
                }
            }
        )*
    };
}

refetch_flags!(
    /// The notifications screen.
    NotificationsRefetch,
    /// Plan and usage on the billing screen.
    QuotasRefetch,
);
