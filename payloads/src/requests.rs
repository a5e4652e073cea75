use serde::{Deserialize, Serialize};

/// Start a subscription for a plan. The backend answers with a checkout
/// session hosted by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub plan_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Move an existing subscription to another plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSubscription {
    pub plan_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPortal {
    /// Where the payment processor sends the user back to.
    pub return_url: String,
}
