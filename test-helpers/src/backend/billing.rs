use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use payloads::{SubscriptionStatus, requests, responses};

use super::{BackendError, BackendState, authenticate};

#[tracing::instrument(skip(req, state), fields(user_id))]
#[get("/users/me")]
pub async fn current_user(
    req: HttpRequest,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let account = state
        .lock()
        .accounts
        .get(&user.id)
        .cloned()
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(responses::CurrentUser {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        role_id: user.role_id,
        subscription_status: account.status,
        plan_id: account.plan_id,
    }))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[get("/v2/billing/quotas")]
pub async fn quotas(
    req: HttpRequest,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let account = state
        .lock()
        .accounts
        .get(&user.id)
        .cloned()
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(responses::BillingQuotas {
        plan_id: account.plan_id,
        subscription_status: account.status,
        counters: account.counters,
    }))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[post("/v2/billing/subscriptions")]
pub async fn create_subscription(
    req: HttpRequest,
    details: web::Json<requests::CreateSubscription>,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let details = details.into_inner();
    if details.plan_id.is_empty() {
        return Err(BackendError::BadRequest("plan_id is required".into()));
    }
    let mut inner = state.lock();
    let account = inner.accounts.entry(user.id).or_default();
    account.plan_id = Some(details.plan_id.clone());
    // Becomes active once the payment processor confirms checkout.
    account.status = Some(SubscriptionStatus::Incomplete);
    Ok(HttpResponse::Ok().json(responses::RedirectUrl {
        url: format!("https://checkout.example.test/{}", details.plan_id),
    }))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[patch("/v2/billing/subscriptions")]
pub async fn update_subscription(
    req: HttpRequest,
    details: web::Json<requests::UpdateSubscription>,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let mut inner = state.lock();
    let account = inner
        .accounts
        .get_mut(&user.id)
        .filter(|a| a.plan_id.is_some())
        .ok_or_else(|| {
            BackendError::BadRequest("no subscription to update".into())
        })?;
    account.plan_id = Some(details.plan_id.clone());
    Ok(HttpResponse::Ok().json(responses::Subscription {
        plan_id: details.into_inner().plan_id,
        status: account.status.unwrap_or(SubscriptionStatus::Other),
    }))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[post("/v2/billing/subscriptions/cancel")]
pub async fn cancel_subscription(
    req: HttpRequest,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let mut inner = state.lock();
    let account = inner
        .accounts
        .get_mut(&user.id)
        .ok_or(BackendError::NotFound)?;
    account.status = Some(SubscriptionStatus::Canceled);
    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[post("/v2/billing/stripe/billing-portal")]
pub async fn billing_portal(
    req: HttpRequest,
    details: web::Json<requests::BillingPortal>,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    authenticate(&req, &state)?;
    Ok(HttpResponse::Ok().json(responses::RedirectUrl {
        url: format!(
            "https://billing.example.test/portal?return_to={}",
            details.return_url
        ),
    }))
}
