//! Development data for the fake backend
//!
//! Gives the UI something realistic to show:
//! - An HR user with an organisation-wide feed (some read, some unread)
//! - Two employees, one with a healthy subscription and one whose last
//!   payment failed, so the billing redirect can be exercised
//! - Usage counters close to their limits

use crate::backend::BillingAccount;
use crate::{TestBackend, counter, employee_claims, hr_claims, notification};
use payloads::SubscriptionStatus;

/// Tokens for the seeded users, to paste into the UI's sign-in box.
pub struct DevDataset {
    pub hr_token: String,
    pub employee_token: String,
    pub payment_failed_token: String,
}

impl DevDataset {
    pub fn create(app: &TestBackend) -> Self {
        tracing::info!("👤 Creating HR user and two employees");
        let hr = hr_claims();
        let employee = employee_claims("emp-42");
        let late_payer = employee_claims("emp-77");

        app.set_hr_notifications(vec![
            notification("hr-1", "Payroll for March has been approved", false),
            notification("hr-2", "3 leave requests are waiting for review", false),
            notification("hr-3", "New perk catalogue published", true),
        ]);
        app.set_employee_notifications(
            "emp-42",
            vec![
                notification("emp-42-1", "Your leave request was approved", false),
                notification("emp-42-2", "Your replica finished processing", false),
                notification("emp-42-3", "Welcome to the portal", true),
            ],
        );
        app.set_employee_notifications(
            "emp-77",
            vec![notification(
                "emp-77-1",
                "Your last payment did not go through",
                false,
            )],
        );

        tracing::info!("💳 Creating billing accounts");
        app.set_account(
            &employee.id,
            BillingAccount {
                status: Some(SubscriptionStatus::Active),
                plan_id: Some("team".into()),
                counters: vec![
                    counter("replicas", 4, Some(5)),
                    counter("video_minutes", 112, Some(120)),
                ],
            },
        );
        app.set_account(
            &late_payer.id,
            BillingAccount {
                status: Some(SubscriptionStatus::PaymentFailed),
                plan_id: Some("starter".into()),
                counters: vec![counter("replicas", 1, Some(1))],
            },
        );

        Self {
            hr_token: app.issue_token(&hr),
            employee_token: app.issue_token(&employee),
            payment_failed_token: app.issue_token(&late_payer),
        }
    }

    /// Print a summary of the created test data
    pub fn print_summary(&self) {
        tracing::info!("📋 Available test users:");
        tracing::info!("   🧑‍💼 HR (hr-1): {}", self.hr_token);
        tracing::info!("   👷 Employee (emp-42): {}", self.employee_token);
        tracing::info!(
            "   💸 Employee with failed payment (emp-77): {}",
            self.payment_failed_token
        );
    }
}
