pub mod billing;
pub mod home;
pub mod not_found;
pub mod notifications;

pub use billing::BillingPage;
pub use home::HomePage;
pub use not_found::NotFoundPage;
pub use notifications::NotificationsPage;
