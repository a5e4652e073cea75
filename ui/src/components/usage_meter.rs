use payloads::responses::UsageCounter;
use rust_decimal::prelude::ToPrimitive;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UsageMeterProps {
    pub counter: UsageCounter,
}

#[function_component]
pub fn UsageMeter(props: &UsageMeterProps) -> Html {
    let counter = &props.counter;
    let percent = counter
        .limit
        .filter(|limit| !limit.is_zero())
        .and_then(|limit| (counter.used / limit).to_f64())
        .map(|ratio| (ratio * 100.0).clamp(0.0, 100.0));
    let bar = if counter.is_exhausted() {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };

    html! {
        <div class="space-y-1">
            <div class="flex justify-between text-sm">
                <span class="font-medium">{counter.name.replace('_', " ")}</span>
                <span class="text-neutral-600 dark:text-neutral-400">
                    {match counter.limit {
                        Some(limit) => format!("{} / {}", counter.used, limit),
                        None => format!("{} used", counter.used),
                    }}
                </span>
            </div>
            if let Some(percent) = percent {
                <div class="h-2 rounded bg-gray-200 dark:bg-gray-700">
                    <div class={classes!("h-2", "rounded", bar)}
                         style={format!("width: {percent:.0}%")} />
                </div>
            }
        </div>
    }
}
