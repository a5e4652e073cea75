use portal_state::Feedback;
use std::rc::Rc;
use uuid::Uuid;
use yew::prelude::*;

/// How long a toast stays up unless dismissed.
const DEFAULT_DURATION_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: Option<u32>,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            duration_ms: Some(DEFAULT_DURATION_MS),
        }
    }

    /// Keep the toast until the user closes it.
    pub fn sticky(mut self) -> Self {
        self.duration_ms = None;
        self
    }
}

impl From<Feedback> for Toast {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::Success(message) => Toast::new(message, ToastKind::Success),
            Feedback::Error(message) => Toast::new(message, ToastKind::Error),
            Feedback::Info(message) => Toast::new(message, ToastKind::Info),
        }
    }
}

/// Toasts in the order they were raised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
}

pub enum ToastAction {
    Add(Toast),
    Remove(Uuid),
}

impl Reducible for ToastState {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut toasts = self.toasts.clone();
        match action {
            ToastAction::Add(toast) => toasts.push(toast),
            ToastAction::Remove(id) => toasts.retain(|t| t.id != id),
        }
        Rc::new(ToastState { toasts })
    }
}

pub type ToastContext = UseReducerHandle<ToastState>;

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    pub children: Children,
}

#[function_component]
pub fn ToastProvider(props: &ToastProviderProps) -> Html {
    let toast_state = use_reducer(ToastState::default);

    html! {
        <ContextProvider<ToastContext> context={toast_state}>
            {props.children.clone()}
        </ContextProvider<ToastContext>>
    }
}

#[derive(Clone)]
pub struct ToastHandle {
    context: Option<ToastContext>,
}

impl ToastHandle {
    pub fn add(&self, toast: Toast) {
        let Some(context) = self.context.clone() else {
            tracing::warn!(message = %toast.message, "No toast provider mounted");
            return;
        };
        let id = toast.id;
        let duration_ms = toast.duration_ms;
        context.dispatch(ToastAction::Add(toast));

        if let Some(duration_ms) = duration_ms {
            yew::platform::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(duration_ms).await;
                context.dispatch(ToastAction::Remove(id));
            });
        }
    }

    pub fn feedback(&self, feedback: Feedback) {
        self.add(feedback.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastKind::Success));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastKind::Error));
    }

    pub fn remove(&self, id: Uuid) {
        if let Some(context) = &self.context {
            context.dispatch(ToastAction::Remove(id));
        }
    }
}

#[hook]
pub fn use_toast() -> ToastHandle {
    ToastHandle {
        context: use_context::<ToastContext>(),
    }
}
