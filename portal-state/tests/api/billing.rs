use payloads::{SubscriptionStatus, requests};
use portal_state::{BillingWatch, QuotaRefresh};
use payloads::StatusCode;
use test_helpers::{
    assert_status_code, backend::BillingAccount, counter, employee_claims,
    spawn_backend,
};

#[tokio::test]
async fn current_user_reports_subscription_status() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.set_subscription_status("emp-42", Some(SubscriptionStatus::Active));
    app.sign_in(&employee_claims("emp-42"));

    let user = app.client.current_user().await?;

    assert_eq!(user.id, "emp-42");
    assert_eq!(user.subscription_status, Some(SubscriptionStatus::Active));
    assert_eq!(app.request_lines(), vec!["GET /users/me"]);
    Ok(())
}

#[tokio::test]
async fn quotas_expose_usage_counters() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.set_account(
        "emp-42",
        BillingAccount {
            status: Some(SubscriptionStatus::Active),
            plan_id: Some("team".into()),
            counters: vec![
                counter("replicas", 5, Some(5)),
                counter("video_minutes", 10, None),
            ],
        },
    );
    app.sign_in(&employee_claims("emp-42"));

    let quotas = app.client.billing_quotas().await?;

    assert_eq!(quotas.plan_id.as_deref(), Some("team"));
    assert!(quotas.counter("replicas").is_some_and(|c| c.is_exhausted()));
    assert!(
        quotas
            .counter("video_minutes")
            .is_some_and(|c| !c.is_exhausted())
    );
    Ok(())
}

#[tokio::test]
async fn subscription_lifecycle() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.sign_in(&employee_claims("emp-42"));
    let mut watch = BillingWatch::new(QuotaRefresh::default());

    let checkout = app
        .client
        .create_subscription(&requests::CreateSubscription {
            plan_id: "starter".into(),
            success_url: "http://localhost/billing?ok".into(),
            cancel_url: "http://localhost/billing".into(),
        })
        .await?;
    assert!(checkout.url.ends_with("/starter"));
    let user = app.client.current_user().await?;
    let decision = watch.observe(user.subscription_status);
    assert_eq!(decision.poll_interval, None);

    // checkout completes out of band
    app.set_subscription_status("emp-42", Some(SubscriptionStatus::Active));
    let user = app.client.current_user().await?;
    let decision = watch.observe(user.subscription_status);
    assert!(decision.poll_interval.is_some());

    let updated = app
        .client
        .update_subscription(&requests::UpdateSubscription {
            plan_id: "team".into(),
        })
        .await?;
    assert_eq!(updated.plan_id, "team");
    assert_eq!(updated.status, SubscriptionStatus::Active);

    app.client.cancel_subscription().await?;
    let user = app.client.current_user().await?;
    let decision = watch.observe(user.subscription_status);
    assert_eq!(user.subscription_status, Some(SubscriptionStatus::Canceled));
    assert!(decision.refetch_quotas);
    assert_eq!(decision.poll_interval, None);
    Ok(())
}

#[tokio::test]
async fn update_without_subscription_is_rejected() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.sign_in(&employee_claims("emp-42"));

    let result = app
        .client
        .update_subscription(&requests::UpdateSubscription {
            plan_id: "team".into(),
        })
        .await;

    assert_status_code(result, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn billing_portal_returns_redirect() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.sign_in(&employee_claims("emp-42"));

    let portal = app
        .client
        .billing_portal(&requests::BillingPortal {
            return_url: "http://localhost/billing".into(),
        })
        .await?;

    assert!(portal.url.starts_with("https://billing.example.test/portal"));
    assert_eq!(
        app.request_lines(),
        vec!["POST /v2/billing/stripe/billing-portal"]
    );
    Ok(())
}
