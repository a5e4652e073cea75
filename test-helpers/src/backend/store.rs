use payloads::{
    Notification, NotificationId, SubscriptionStatus, UserClaims,
    responses::UsageCounter,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// A request as seen by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub has_token: bool,
}

impl RecordedRequest {
    /// "METHOD /path", handy for assertions.
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingAccount {
    pub status: Option<SubscriptionStatus>,
    pub plan_id: Option<String>,
    pub counters: Vec<UsageCounter>,
}

#[derive(Default)]
pub struct Inner {
    pub hr_notifications: Vec<Notification>,
    pub employee_notifications: HashMap<String, Vec<Notification>>,
    pub failing_reads: HashSet<NotificationId>,
    /// Issued token -> the user it was issued for.
    pub sessions: HashMap<String, UserClaims>,
    /// Keyed by user id.
    pub accounts: HashMap<String, BillingAccount>,
    pub requests: Vec<RecordedRequest>,
    /// Answer the HR feed with a bare array instead of a wrapped object.
    pub bare_hr_list: bool,
}

impl Inner {
    /// Every notification list the backend holds, HR feed first.
    pub fn all_notifications_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Notification> {
        self.hr_notifications
            .iter_mut()
            .chain(self.employee_notifications.values_mut().flatten())
    }
}

/// Shared state of the fake backend.
#[derive(Default)]
pub struct BackendState {
    inner: Mutex<Inner>,
}

impl BackendState {
    pub fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn record(&self, method: &str, path: &str, has_token: bool) {
        self.lock().requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            has_token,
        });
    }
}
