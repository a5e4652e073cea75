use payloads::{ClientError, RoleId};
use portal_state::{AuthSession, fetch_for_role};
use test_helpers::{employee_claims, hr_claims, spawn_backend};

#[tokio::test]
async fn issued_token_decodes_into_session() -> anyhow::Result<()> {
    let app = spawn_backend().await;
    let token = app.issue_token(&hr_claims());

    let session = AuthSession::from_token(&token)?;

    assert_eq!(session.token(), Some(token.as_str()));
    assert_eq!(session.role(), Some(RoleId::HR));
    assert!(session.read_permission("notifications"));
    assert!(!session.write_permission("notifications"));
    Ok(())
}

#[tokio::test]
async fn revoked_token_resets_the_session() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let token = app.sign_in(&employee_claims("emp-42"));
    let mut session = AuthSession::from_token(&token)?;
    app.revoke(&token);

    let error = fetch_for_role(&app.client, &session, RoleId::EMPLOYEE)
        .await
        .expect_err("revoked token must be rejected");

    assert!(matches!(error, ClientError::Unauthorized));
    assert!(session.observe_error(&error));
    assert!(!session.is_authenticated());
    assert_eq!(session.user(), None);
    Ok(())
}
