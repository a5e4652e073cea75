pub mod layout;
pub mod notification_list;
pub mod sign_in_form;
pub mod toast;
pub mod usage_meter;

pub use layout::MainLayout;
pub use notification_list::NotificationList;
pub use sign_in_form::SignInForm;
pub use toast::ToastContainer;
pub use usage_meter::UsageMeter;
