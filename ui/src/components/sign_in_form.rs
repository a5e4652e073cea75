use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::hooks::use_sign_in;

/// Paste a token issued by the identity provider.
#[function_component]
pub fn SignInForm() -> Html {
    let sign_in = use_sign_in();
    let token = use_state(String::new);

    let on_input = {
        let token = token.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            token.set(input.value());
        })
    };

    let on_submit = {
        let token = token.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            sign_in.emit((*token).clone());
        })
    };

    html! {
        <form class="max-w-md space-y-4" onsubmit={on_submit}>
            <label for="token" class="block text-sm font-medium text-gray-700 dark:text-gray-300">
                {"Access token"}
            </label>
            <textarea
                id="token"
                rows="4"
                value={(*token).clone()}
                oninput={on_input}
                class="w-full rounded-md border border-gray-300 dark:border-gray-600 bg-white dark:bg-gray-800 p-2 text-xs font-mono"
            />
            <button type="submit"
                disabled={token.trim().is_empty()}
                class="px-4 py-2 rounded-md bg-blue-600 text-white disabled:opacity-50">
                {"Sign in"}
            </button>
        </form>
    }
}
