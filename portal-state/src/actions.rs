//! Marking notifications read.
//!
//! The store is only touched after the backend confirms a mutation. The
//! bulk action issues one request per unread entry, all at once, because
//! the backend has no batch endpoint.

use futures::future::join_all;
use payloads::{ClientError, Notification, NotificationId};

use crate::fetch::NotificationApi;
use crate::notifications::NotificationSink;

/// User-facing outcome of an action, rendered as a toast by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
    Info(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkReadOptions {
    /// Announce success as well as failure.
    pub announce_success: bool,
}

#[derive(Debug)]
pub struct ReadOutcome {
    pub result: Result<(), ClientError>,
    pub feedback: Option<Feedback>,
}

/// Mark one notification read.
pub async fn mark_as_read<A, S>(
    api: &A,
    sink: &S,
    id: &NotificationId,
    options: MarkReadOptions,
) -> ReadOutcome
where
    A: NotificationApi,
    S: NotificationSink,
{
    match api.mark_notification_read(id).await {
        Ok(()) => {
            sink.update(|store| {
                store.mark_read(id);
            });
            let feedback = options
                .announce_success
                .then(|| Feedback::Success("Notification marked as read".into()));
            ReadOutcome {
                result: Ok(()),
                feedback,
            }
        }
        Err(e) => {
            tracing::error!(%id, "Failed to mark notification read: {e}");
            ReadOutcome {
                feedback: Some(Feedback::Error(format!(
                    "Could not mark notification as read: {e}"
                ))),
                result: Err(e),
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BulkReadOutcome {
    /// Every unread id a request was issued for.
    pub targeted: Vec<NotificationId>,
    pub succeeded: Vec<NotificationId>,
    pub failures: Vec<(NotificationId, ClientError)>,
}

impl BulkReadOutcome {
    /// Any single failure fails the whole operation.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn feedback(&self) -> Feedback {
        if self.targeted.is_empty() {
            Feedback::Info("All notifications are already read".into())
        } else if self.is_success() {
            Feedback::Success("All notifications marked as read".into())
        } else {
            Feedback::Error("Could not mark all notifications as read".into())
        }
    }
}

/// Mark every unread entry of `list` read.
///
/// Once all requests have settled the store is updated in one pass for
/// the ids the backend accepted. The outcome is reported as a whole: a
/// single failed request makes it a failure even if others went through.
pub async fn mark_all_as_read<A, S>(
    api: &A,
    sink: &S,
    list: &[Notification],
) -> BulkReadOutcome
where
    A: NotificationApi,
    S: NotificationSink,
{
    let targeted: Vec<NotificationId> = list
        .iter()
        .filter(|n| !n.read)
        .map(|n| n.id.clone())
        .collect();
    if targeted.is_empty() {
        return BulkReadOutcome::default();
    }

    let results = join_all(
        targeted.iter().map(|id| api.mark_notification_read(id)),
    )
    .await;

    let mut outcome = BulkReadOutcome {
        targeted: targeted.clone(),
        ..BulkReadOutcome::default()
    };
    for (id, result) in targeted.into_iter().zip(results) {
        match result {
            Ok(()) => outcome.succeeded.push(id),
            Err(e) => outcome.failures.push((id, e)),
        }
    }

    if !outcome.succeeded.is_empty() {
        sink.update(|store| {
            store.mark_many_read(&outcome.succeeded);
        });
    }
    if !outcome.is_success() {
        tracing::error!(
            failed = outcome.failures.len(),
            targeted = outcome.targeted.len(),
            "Bulk mark-as-read failed"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::FakeApi;
    use crate::notifications::NotificationStore;
    use crate::notifications::tests::notification;
    use std::cell::RefCell;

    #[tokio::test]
    async fn mark_as_read_updates_only_that_entry() {
        let api = FakeApi::default();
        let before = vec![notification("a", false), notification("b", false)];
        let sink = RefCell::new(NotificationStore::new(before.clone()));

        let outcome = mark_as_read(
            &api,
            &sink,
            &"b".into(),
            MarkReadOptions::default(),
        )
        .await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.feedback, None);
        let store = sink.borrow();
        assert!(store.get(&"b".into()).unwrap().read);
        assert_eq!(store.get(&"a".into()), Some(&before[0]));
        assert_eq!(
            *api.calls.borrow(),
            vec!["PATCH /notifications/b/read".to_string()]
        );
    }

    #[tokio::test]
    async fn mark_as_read_can_announce_success() {
        let api = FakeApi::default();
        let sink = RefCell::new(NotificationStore::new(vec![notification(
            "a", false,
        )]));
        let outcome = mark_as_read(
            &api,
            &sink,
            &"a".into(),
            MarkReadOptions {
                announce_success: true,
            },
        )
        .await;
        assert!(matches!(outcome.feedback, Some(Feedback::Success(_))));
    }

    #[tokio::test]
    async fn failed_mark_leaves_store_unchanged() {
        let api = FakeApi {
            failing: ["a".into()].into_iter().collect(),
            ..FakeApi::default()
        };
        let before = vec![notification("a", false)];
        let sink = RefCell::new(NotificationStore::new(before.clone()));

        let outcome = mark_as_read(
            &api,
            &sink,
            &"a".into(),
            MarkReadOptions::default(),
        )
        .await;

        assert!(outcome.result.is_err());
        assert!(matches!(outcome.feedback, Some(Feedback::Error(_))));
        assert_eq!(sink.borrow().notifications(), before.as_slice());
    }

    #[tokio::test]
    async fn mark_all_issues_one_request_per_unread_entry() {
        let api = FakeApi::default();
        let list = vec![
            notification("a", false),
            notification("b", true),
            notification("c", false),
            notification("d", true),
        ];
        let sink = RefCell::new(NotificationStore::new(list.clone()));

        let outcome = mark_all_as_read(&api, &sink, &list).await;

        assert!(outcome.is_success());
        assert_eq!(
            outcome.targeted,
            vec![NotificationId::from("a"), NotificationId::from("c")]
        );
        let mut calls = api.calls.borrow().clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "PATCH /notifications/a/read".to_string(),
                "PATCH /notifications/c/read".to_string(),
            ]
        );
        assert_eq!(sink.borrow().unread_count(), 0);
        assert!(matches!(outcome.feedback(), Feedback::Success(_)));
    }

    #[tokio::test]
    async fn mark_all_with_nothing_unread_sends_nothing() {
        let api = FakeApi::default();
        let list = vec![notification("a", true)];
        let sink = RefCell::new(NotificationStore::new(list.clone()));

        let outcome = mark_all_as_read(&api, &sink, &list).await;

        assert!(api.calls.borrow().is_empty());
        assert!(matches!(outcome.feedback(), Feedback::Info(_)));
    }

    #[tokio::test]
    async fn partial_failure_reports_the_whole_operation_failed() {
        let api = FakeApi {
            failing: ["b".into()].into_iter().collect(),
            ..FakeApi::default()
        };
        let list = vec![
            notification("a", false),
            notification("b", false),
            notification("c", false),
        ];
        let sink = RefCell::new(NotificationStore::new(list.clone()));

        let outcome = mark_all_as_read(&api, &sink, &list).await;

        assert!(!outcome.is_success());
        assert!(matches!(outcome.feedback(), Feedback::Error(_)));
        assert_eq!(api.calls.borrow().len(), 3);
        assert_eq!(outcome.succeeded.len(), 2);
        let store = sink.borrow();
        assert!(store.get(&"a".into()).unwrap().read);
        assert!(!store.get(&"b".into()).unwrap().read);
        assert!(store.get(&"c".into()).unwrap().read);
    }
}
