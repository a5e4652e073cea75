use payloads::APIClient;
use portal_state::AuthSession;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

mod components;
mod contexts;
mod hooks;
mod logs;
mod pages;
mod state;

use components::MainLayout;
use contexts::ToastProvider;
use hooks::{
    BillingStatus, use_authentication, use_billing_redirect, use_billing_status,
};
use pages::{BillingPage, HomePage, NotFoundPage, NotificationsPage};
use state::AuthStore;

/// API client for the current session. The backend address comes from
/// `BACKEND_URL` at build time, falling back to the page's own origin.
pub fn get_api_client(session: &AuthSession) -> APIClient {
    let address = option_env!("BACKEND_URL")
        .map(|url| url.to_string())
        .unwrap_or_else(|| {
            web_sys::window()
                .and_then(|window| window.location().origin().ok())
                .unwrap_or_default()
        });

    APIClient::new(address).with_token(session.token().map(str::to_string))
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <ToastProvider>
            <BrowserRouter>
                <Shell />
            </BrowserRouter>
        </ToastProvider>
    }
}

/// Session lifecycle and the shared billing status, for every route.
#[function_component]
fn Shell() -> Html {
    use_authentication();
    let (auth, _) = use_store::<AuthStore>();
    let billing = use_billing_status();
    use_billing_redirect(billing.status);

    // Remount pages on session change so their queries start clean.
    let session_key = auth.session.user().map(|user| user.id.clone());

    html! {
        <ContextProvider<BillingStatus> context={billing}>
            <MainLayout>
                <Switch<Route> key={session_key.unwrap_or_default()} render={switch} />
            </MainLayout>
        </ContextProvider<BillingStatus>>
    }
}

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/notifications")]
    Notifications,
    #[at("/billing")]
    Billing,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <HomePage /> },
        Route::Notifications => html! { <NotificationsPage /> },
        Route::Billing => html! { <BillingPage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}
