mod billing;
mod notifications;
mod session;

use test_helpers::spawn_backend;

#[tokio::test]
async fn unauthenticated_requests_are_rejected() -> anyhow::Result<()> {
    let app = spawn_backend().await;

    let result = app.client.list_notifications().await;

    assert!(matches!(result, Err(payloads::ClientError::Unauthorized)));
    let requests = app.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].has_token);
    Ok(())
}
