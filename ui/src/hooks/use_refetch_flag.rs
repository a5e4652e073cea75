use yew::prelude::*;
use yewdux::prelude::*;

use crate::state::RefetchFlag;

/// Returns a callback raising the flag `F`, so its screen refetches the
/// next time it is shown.
#[hook]
pub fn use_raise_refetch<F: RefetchFlag>() -> Callback<()> {
    let dispatch = use_dispatch::<F>();
    Callback::from(move |()| dispatch.reduce_mut(|flag| flag.set_raised(true)))
}

/// Emit `refetch` and lower the flag whenever `F` is raised.
#[hook]
pub fn use_refetch_on_flag<F: RefetchFlag>(refetch: Callback<()>) {
    let (flag, dispatch) = use_store::<F>();
    let raised = flag.is_raised();

    use_effect_with(raised, move |raised| {
        if *raised {
            tracing::debug!(flag = std::any::type_name::<F>(), "Refetch requested");
            dispatch.reduce_mut(|flag| flag.set_raised(false));
            refetch.emit(());
        }
    });
}
