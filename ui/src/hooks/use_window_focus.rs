use wasm_bindgen::prelude::*;
use web_sys::Event;
use yew::prelude::*;

/// Call `on_focus` whenever the browser window regains focus.
#[hook]
pub fn use_window_focus(on_focus: Callback<()>) {
    use_effect_with(on_focus, |on_focus| {
        let window = web_sys::window();
        let on_focus = on_focus.clone();
        let closure = Closure::wrap(Box::new(move |_: Event| {
            on_focus.emit(());
        }) as Box<dyn FnMut(Event)>);

        if let Some(window) = &window {
            if let Err(e) = window.add_event_listener_with_callback(
                "focus",
                closure.as_ref().unchecked_ref(),
            ) {
                tracing::error!("Failed to listen for window focus: {e:?}");
            }
        }

        // Rust keeps ownership of the closure, JS only holds a pointer to it
        move || {
            if let Some(window) = &window {
                let _ = window.remove_event_listener_with_callback(
                    "focus",
                    closure.as_ref().unchecked_ref(),
                );
            }
            drop(closure);
        }
    });
}
