use crate::{Notification, RoleId, SubscriptionStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Notification list as returned by the backend.
///
/// Older endpoints answer with a bare array, newer ones wrap it in an
/// object. Both shapes decode to the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationList {
    Bare(Vec<Notification>),
    Wrapped {
        #[serde(alias = "data")]
        notifications: Vec<Notification>,
    },
}

impl NotificationList {
    pub fn into_vec(self) -> Vec<Notification> {
        match self {
            Self::Bare(list) => list,
            Self::Wrapped { notifications } => notifications,
        }
    }
}

impl From<NotificationList> for Vec<Notification> {
    fn from(list: NotificationList) -> Self {
        list.into_vec()
    }
}

/// The signed-in user as seen by the backend, including billing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
    #[serde(default)]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub name: String,
    pub used: Decimal,
    /// None means the plan has no cap on this counter.
    pub limit: Option<Decimal>,
}

impl UsageCounter {
    pub fn remaining(&self) -> Option<Decimal> {
        self.limit
            .map(|limit| (limit - self.used).max(Decimal::ZERO))
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.used >= limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingQuotas {
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub counters: Vec<UsageCounter>,
}

impl BillingQuotas {
    pub fn counter(&self, name: &str) -> Option<&UsageCounter> {
        self.counters.iter().find(|c| c.name == name)
    }
}

/// A hosted page on the payment processor the browser should be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan_id: String,
    pub status: SubscriptionStatus,
}
