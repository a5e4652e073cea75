//! Role-gated notification fetchers.
//!
//! A call that the session is not allowed to make is skipped without
//! touching the network and reported as [`Gated::Unauthorized`]. Transport
//! and HTTP errors are returned to the caller.

use payloads::{APIClient, ClientError, EmployeeId, Notification, NotificationId, RoleId};

use crate::notifications::NotificationSink;
use crate::session::AuthSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Authorized(T),
    /// No token, or the session role does not match the endpoint.
    Unauthorized,
}

impl<T> Gated<T> {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    pub fn authorized(self) -> Option<T> {
        match self {
            Self::Authorized(value) => Some(value),
            Self::Unauthorized => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Self::Authorized(value) => Gated::Authorized(f(value)),
            Self::Unauthorized => Gated::Unauthorized,
        }
    }
}

impl<T: Default> Gated<T> {
    /// The soft-skip view: not being allowed to ask looks like an empty
    /// result.
    pub fn into_list(self) -> T {
        self.authorized().unwrap_or_default()
    }
}

/// The notification endpoints, as consumed by the fetchers and actions.
#[allow(async_fn_in_trait)]
pub trait NotificationApi {
    async fn list_notifications(
        &self,
    ) -> Result<Vec<Notification>, ClientError>;

    async fn list_employee_notifications(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Notification>, ClientError>;

    async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<(), ClientError>;
}

impl NotificationApi for APIClient {
    async fn list_notifications(
        &self,
    ) -> Result<Vec<Notification>, ClientError> {
        APIClient::list_notifications(self).await
    }

    async fn list_employee_notifications(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Notification>, ClientError> {
        APIClient::list_employee_notifications(self, employee_id).await
    }

    async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<(), ClientError> {
        APIClient::mark_notification_read(self, notification_id).await
    }
}

/// Which feed a query reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationScope {
    Role(RoleId),
    Employee(EmployeeId),
}

/// Fetch the feed that belongs to `expected`: the organisation-wide feed
/// for HR, the session user's own feed for employees.
pub async fn fetch_for_role<A: NotificationApi>(
    api: &A,
    session: &AuthSession,
    expected: RoleId,
) -> Result<Gated<Vec<Notification>>, ClientError> {
    let Some(user) = session.gate(expected) else {
        tracing::debug!(role = %expected, "Skipping notification fetch for role");
        return Ok(Gated::Unauthorized);
    };
    let list = if expected == RoleId::HR {
        api.list_notifications().await?
    } else {
        api.list_employee_notifications(&user.employee_id()).await?
    };
    Ok(Gated::Authorized(list))
}

pub async fn fetch_for_employee<A: NotificationApi>(
    api: &A,
    session: &AuthSession,
    employee_id: &EmployeeId,
) -> Result<Gated<Vec<Notification>>, ClientError> {
    if session.gate(RoleId::EMPLOYEE).is_none() {
        tracing::debug!(%employee_id, "Skipping employee notification fetch");
        return Ok(Gated::Unauthorized);
    }
    let list = api.list_employee_notifications(employee_id).await?;
    Ok(Gated::Authorized(list))
}

/// Fetch a feed and forward the result into the store, unless a newer
/// fetch or a clear got there first.
pub async fn refresh_notifications<A, S>(
    api: &A,
    session: &AuthSession,
    scope: &NotificationScope,
    sink: &S,
) -> Result<Gated<Vec<Notification>>, ClientError>
where
    A: NotificationApi,
    S: NotificationSink,
{
    let ticket = sink.ticket();
    let result = match scope {
        NotificationScope::Role(role) => {
            fetch_for_role(api, session, *role).await?
        }
        NotificationScope::Employee(id) => {
            fetch_for_employee(api, session, id).await?
        }
    };
    if let Gated::Authorized(list) = &result {
        let list = list.clone();
        sink.update(|store| {
            store.apply_fetch(ticket, list);
        });
    }
    Ok(result)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::notifications::NotificationStore;
    use crate::notifications::tests::notification;
    use crate::session::tests::session_with_role;
    use std::cell::RefCell;
    use std::collections::{HashSet, VecDeque};
    use tokio::sync::oneshot;

    /// In-memory API that records every call it receives.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub(crate) notifications: Vec<Notification>,
        pub(crate) failing: HashSet<NotificationId>,
        pub(crate) calls: RefCell<Vec<String>>,
        pub(crate) fail_lists: bool,
    }

    impl NotificationApi for FakeApi {
        async fn list_notifications(
            &self,
        ) -> Result<Vec<Notification>, ClientError> {
            self.calls.borrow_mut().push("GET /notifications".into());
            if self.fail_lists {
                return Err(ClientError::APIError(
                    payloads::StatusCode::BAD_GATEWAY,
                    "upstream".into(),
                ));
            }
            Ok(self.notifications.clone())
        }

        async fn list_employee_notifications(
            &self,
            employee_id: &EmployeeId,
        ) -> Result<Vec<Notification>, ClientError> {
            self.calls
                .borrow_mut()
                .push(format!("GET /notifications/employee/{employee_id}"));
            Ok(self.notifications.clone())
        }

        async fn mark_notification_read(
            &self,
            notification_id: &NotificationId,
        ) -> Result<(), ClientError> {
            self.calls
                .borrow_mut()
                .push(format!("PATCH /notifications/{notification_id}/read"));
            if self.failing.contains(notification_id) {
                return Err(ClientError::APIError(
                    payloads::StatusCode::INTERNAL_SERVER_ERROR,
                    "could not update".into(),
                ));
            }
            Ok(())
        }
    }

    /// Answers each list call with whatever its channel eventually sends.
    struct ScriptedApi {
        responses: RefCell<VecDeque<oneshot::Receiver<Vec<Notification>>>>,
    }

    impl ScriptedApi {
        async fn next(&self) -> Result<Vec<Notification>, ClientError> {
            let Some(response) = self.responses.borrow_mut().pop_front() else {
                panic!("unexpected list call");
            };
            Ok(response.await.unwrap())
        }
    }

    impl NotificationApi for ScriptedApi {
        async fn list_notifications(
            &self,
        ) -> Result<Vec<Notification>, ClientError> {
            self.next().await
        }

        async fn list_employee_notifications(
            &self,
            _employee_id: &EmployeeId,
        ) -> Result<Vec<Notification>, ClientError> {
            self.next().await
        }

        async fn mark_notification_read(
            &self,
            _notification_id: &NotificationId,
        ) -> Result<(), ClientError> {
            Ok(())
        }
    }

    fn api() -> FakeApi {
        FakeApi {
            notifications: vec![notification("a", false)],
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn non_hr_session_skips_hr_feed_without_calling() {
        let api = api();
        for role in [2, 3, 7] {
            let result = fetch_for_role(&api, &session_with_role(role), RoleId::HR)
                .await
                .unwrap();
            assert_eq!(result, Gated::Unauthorized);
            assert!(result.into_list().is_empty());
        }
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn missing_token_skips_every_fetcher() {
        let api = api();
        let session = AuthSession::default();
        assert_eq!(
            fetch_for_role(&api, &session, RoleId::HR).await.unwrap(),
            Gated::Unauthorized
        );
        assert_eq!(
            fetch_for_role(&api, &session, RoleId::EMPLOYEE).await.unwrap(),
            Gated::Unauthorized
        );
        assert_eq!(
            fetch_for_employee(&api, &session, &"emp-42".into())
                .await
                .unwrap(),
            Gated::Unauthorized
        );
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn employee_role_feed_uses_session_user_id() {
        let api = api();
        let result =
            fetch_for_role(&api, &session_with_role(2), RoleId::EMPLOYEE)
                .await
                .unwrap();
        assert!(result.is_authorized());
        assert_eq!(
            *api.calls.borrow(),
            vec!["GET /notifications/employee/emp-42".to_string()]
        );
    }

    #[tokio::test]
    async fn http_errors_propagate() {
        let api = FakeApi {
            fail_lists: true,
            ..FakeApi::default()
        };
        let result =
            fetch_for_role(&api, &session_with_role(1), RoleId::HR).await;
        assert!(matches!(result, Err(ClientError::APIError(_, _))));
    }

    #[tokio::test]
    async fn refresh_forwards_results_into_the_store() {
        let api = FakeApi {
            notifications: vec![notification("x", false), notification("y", true)],
            ..FakeApi::default()
        };
        let sink = RefCell::new(NotificationStore::default());
        let scope = NotificationScope::Employee("emp-42".into());

        let result =
            refresh_notifications(&api, &session_with_role(2), &scope, &sink)
                .await
                .unwrap();

        assert_eq!(result, Gated::Authorized(api.notifications.clone()));
        assert_eq!(sink.borrow().notifications(), api.notifications.as_slice());
    }

    #[tokio::test]
    async fn refresh_leaves_store_alone_when_skipped() {
        let api = api();
        let sink = RefCell::new(NotificationStore::new(vec![notification(
            "kept", false,
        )]));
        let scope = NotificationScope::Role(RoleId::HR);

        let result =
            refresh_notifications(&api, &session_with_role(2), &scope, &sink)
                .await
                .unwrap();

        assert_eq!(result, Gated::Unauthorized);
        assert_eq!(sink.borrow().notifications().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_refreshes_keep_the_newest_answer() {
        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        newer_tx
            .send(vec![notification("a", false), notification("x", false)])
            .unwrap();
        let api = ScriptedApi {
            responses: RefCell::new(VecDeque::from([older_rx, newer_rx])),
        };
        let sink = RefCell::new(NotificationStore::default());
        let session = session_with_role(1);
        let scope = NotificationScope::Role(RoleId::HR);

        // The older request is issued first but answers last.
        let older = refresh_notifications(&api, &session, &scope, &sink);
        let newer = async {
            let result =
                refresh_notifications(&api, &session, &scope, &sink).await;
            older_tx.send(vec![notification("a", false)]).unwrap();
            result
        };
        let (older, newer) = tokio::join!(older, newer);

        assert_eq!(older.unwrap().into_list().len(), 1);
        assert_eq!(newer.unwrap().into_list().len(), 2);
        let ids: Vec<_> = sink
            .borrow()
            .notifications()
            .iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "x"]);
    }

    #[tokio::test]
    async fn refresh_in_flight_during_clear_leaves_store_empty() {
        let (tx, rx) = oneshot::channel();
        let api = ScriptedApi {
            responses: RefCell::new(VecDeque::from([rx])),
        };
        let sink = RefCell::new(NotificationStore::default());
        let session = session_with_role(1);
        let scope = NotificationScope::Role(RoleId::HR);

        let refresh = refresh_notifications(&api, &session, &scope, &sink);
        let logout = async {
            tokio::task::yield_now().await;
            sink.borrow_mut().clear();
            tx.send(vec![notification("a", false)]).unwrap();
        };
        let (result, ()) = tokio::join!(refresh, logout);

        assert!(result.unwrap().is_authorized());
        assert!(sink.borrow().notifications().is_empty());
        assert_eq!(sink.borrow().unread_count(), 0);
    }
}
