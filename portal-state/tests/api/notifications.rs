use std::cell::RefCell;

use payloads::{EmployeeId, NotificationId, RoleId};
use portal_state::{
    AuthSession, Feedback, Gated, MarkReadOptions, NotificationScope,
    NotificationStore, fetch_for_employee, fetch_for_role, mark_all_as_read,
    mark_as_read, refresh_notifications,
};
use payloads::StatusCode;
use test_helpers::{
    assert_status_code, employee_claims, hr_claims, notification,
    spawn_backend,
};

#[tokio::test]
async fn employee_feed_lands_in_store_verbatim() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let feed = vec![
        notification("n1", "Your leave request was approved", false),
        notification("n2", "Welcome aboard", true),
    ];
    app.set_employee_notifications("emp-42", feed.clone());
    let token = app.sign_in(&employee_claims("emp-42"));
    let session = AuthSession::from_token(&token)?;
    let store = RefCell::new(NotificationStore::default());

    let result = refresh_notifications(
        &app.client,
        &session,
        &NotificationScope::Employee(EmployeeId::from("emp-42")),
        &store,
    )
    .await?;

    assert_eq!(result, Gated::Authorized(feed.clone()));
    assert_eq!(store.borrow().notifications(), feed.as_slice());
    assert_eq!(
        app.request_lines(),
        vec!["GET /notifications/employee/emp-42"]
    );
    assert!(app.requests()[0].has_token);
    Ok(())
}

#[tokio::test]
async fn hr_feed_accepts_wrapped_and_bare_bodies() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let feed = vec![
        notification("h1", "Payroll approved", false),
        notification("h2", "Perk catalogue published", false),
    ];
    app.set_hr_notifications(feed.clone());
    let token = app.sign_in(&hr_claims());
    let session = AuthSession::from_token(&token)?;

    let wrapped = fetch_for_role(&app.client, &session, RoleId::HR).await?;
    app.serve_bare_hr_list(true);
    let bare = fetch_for_role(&app.client, &session, RoleId::HR).await?;

    assert_eq!(wrapped, Gated::Authorized(feed.clone()));
    assert_eq!(bare, Gated::Authorized(feed));
    assert_eq!(
        app.request_lines(),
        vec!["GET /notifications", "GET /notifications"]
    );
    Ok(())
}

#[tokio::test]
async fn role_mismatch_never_reaches_the_backend() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let token = app.sign_in(&employee_claims("emp-42"));
    let session = AuthSession::from_token(&token)?;

    let result = fetch_for_role(&app.client, &session, RoleId::HR).await?;

    assert_eq!(result, Gated::Unauthorized);
    assert!(result.into_list().is_empty());
    assert!(app.request_lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn signed_out_session_never_reaches_the_backend() -> anyhow::Result<()> {
    let app = spawn_backend().await;
    let session = AuthSession::default();

    let employee = fetch_for_employee(
        &app.client,
        &session,
        &EmployeeId::from("emp-42"),
    )
    .await?;
    let hr = fetch_for_role(&app.client, &session, RoleId::HR).await?;

    assert_eq!(employee, Gated::Unauthorized);
    assert_eq!(hr, Gated::Unauthorized);
    assert!(app.request_lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn employee_cannot_read_a_colleagues_feed() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let token = app.sign_in(&employee_claims("emp-42"));
    let session = AuthSession::from_token(&token)?;

    let result = fetch_for_employee(
        &app.client,
        &session,
        &EmployeeId::from("emp-77"),
    )
    .await;

    assert_status_code(result, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn mark_as_read_round_trip() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.set_employee_notifications(
        "emp-42",
        vec![
            notification("n1", "First", false),
            notification("n2", "Second", false),
        ],
    );
    let token = app.sign_in(&employee_claims("emp-42"));
    let session = AuthSession::from_token(&token)?;
    let store = RefCell::new(NotificationStore::default());
    refresh_notifications(
        &app.client,
        &session,
        &NotificationScope::Role(RoleId::EMPLOYEE),
        &store,
    )
    .await?;
    app.clear_requests();

    let id = NotificationId::from("n1");
    let outcome = mark_as_read(
        &app.client,
        &store,
        &id,
        MarkReadOptions::default(),
    )
    .await;

    outcome.result?;
    assert_eq!(outcome.feedback, None);
    assert_eq!(app.request_lines(), vec!["PATCH /notifications/n1/read"]);
    assert!(app.notification("n1").is_some_and(|n| n.read));
    let store = store.borrow();
    assert!(store.get(&id).is_some_and(|n| n.read));
    assert!(store.get(&NotificationId::from("n2")).is_some_and(|n| !n.read));
    Ok(())
}

#[tokio::test]
async fn reserved_characters_in_ids_are_escaped() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let employee = "emp#9?x";
    let odd = "n#1?x";
    app.set_employee_notifications(
        employee,
        vec![
            notification(odd, "Odd id", false),
            notification("n2", "Plain id", false),
        ],
    );
    let token = app.sign_in(&employee_claims(employee));
    let session = AuthSession::from_token(&token)?;
    let store = RefCell::new(NotificationStore::default());

    let feed = fetch_for_employee(&app.client, &session, &employee.into())
        .await?
        .into_list();
    assert_eq!(feed.len(), 2);
    store.borrow_mut().set_notifications(feed);

    let outcome = mark_as_read(
        &app.client,
        &store,
        &NotificationId::from(odd),
        MarkReadOptions::default(),
    )
    .await;

    outcome.result?;
    assert!(app.notification(odd).is_some_and(|n| n.read));
    assert!(app.notification("n2").is_some_and(|n| !n.read));
    Ok(())
}

#[tokio::test]
async fn missing_notification_is_reported() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    app.sign_in(&hr_claims());
    let store = RefCell::new(NotificationStore::default());

    let outcome = mark_as_read(
        &app.client,
        &store,
        &NotificationId::from("ghost"),
        MarkReadOptions::default(),
    )
    .await;

    assert!(matches!(outcome.feedback, Some(Feedback::Error(_))));
    assert_status_code(outcome.result, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn mark_all_with_one_failing_entry() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let feed = vec![
        notification("h1", "One", false),
        notification("h2", "Two", false),
        notification("h3", "Three", true),
    ];
    app.set_hr_notifications(feed.clone());
    app.fail_reads_of("h2");
    app.sign_in(&hr_claims());
    let store = RefCell::new(NotificationStore::new(feed.clone()));

    let outcome = mark_all_as_read(&app.client, &store, &feed).await;

    assert!(!outcome.is_success());
    assert!(matches!(outcome.feedback(), Feedback::Error(_)));
    assert_eq!(outcome.succeeded, vec![NotificationId::from("h1")]);
    let mut lines = app.request_lines();
    lines.sort();
    assert_eq!(
        lines,
        vec!["PATCH /notifications/h1/read", "PATCH /notifications/h2/read"]
    );

    let store = store.borrow();
    assert!(store.get(&NotificationId::from("h1")).is_some_and(|n| n.read));
    assert!(store.get(&NotificationId::from("h2")).is_some_and(|n| !n.read));
    assert_eq!(store.unread_count(), 1);
    Ok(())
}

#[tokio::test]
async fn mark_all_clears_every_unread_entry() -> anyhow::Result<()> {
    let mut app = spawn_backend().await;
    let feed = vec![
        notification("e1", "One", false),
        notification("e2", "Two", false),
    ];
    app.set_employee_notifications("emp-42", feed.clone());
    app.sign_in(&employee_claims("emp-42"));
    let store = RefCell::new(NotificationStore::new(feed.clone()));

    let outcome = mark_all_as_read(&app.client, &store, &feed).await;

    assert!(outcome.is_success());
    assert_eq!(store.borrow().unread_count(), 0);
    assert!(app.notification("e1").is_some_and(|n| n.read));
    assert!(app.notification("e2").is_some_and(|n| n.read));
    Ok(())
}
