pub mod toast;

pub use toast::{ToastHandle, ToastProvider, use_toast};
