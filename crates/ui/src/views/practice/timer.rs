use dioxus::prelude::*;

use crate::vm::TimerVm;

#[component]
pub(super) fn PracticeTimer(timer: TimerVm) -> Element {
    rsx! {
        div {
            class: "practice-timer {timer.tone_class}",
            id: "practice-timer",
            aria_live: "polite",
            span { class: "practice-timer__value", "{timer.label}" }
        }
    }
}
