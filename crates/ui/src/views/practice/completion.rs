use dioxus::prelude::*;

use crate::vm::{CompletionVm, PracticeIntent};

#[component]
pub(super) fn CompletionPanel(
    completion: CompletionVm,
    on_intent: EventHandler<PracticeIntent>,
) -> Element {
    rsx! {
        div { class: "topic-practice__completed-block",
            p { class: "topic-practice__completed", id: "practice-outcome", "{completion.title}" }
            p { class: "topic-practice__subtitle", "{completion.description}" }

            div { class: "practice-summary",
                SummaryItem { label: "Correct", value: completion.correct_label.clone() }
                SummaryItem { label: "Answered", value: completion.answered_label.clone() }
                SummaryItem { label: "Accuracy", value: completion.accuracy_label.clone() }
            }

            div { class: "topic-practice__buttons-row",
                if completion.history_available {
                    button {
                        class: "topic-practice__primary-btn topic-practice__history-btn",
                        id: "practice-history",
                        r#type: "button",
                        disabled: completion.history_open || completion.history_loading,
                        onclick: move |_| on_intent.call(PracticeIntent::ViewHistory),
                        "{completion.history_label()}"
                    }
                }
                button {
                    class: "topic-practice__secondary-btn",
                    id: "practice-retry",
                    r#type: "button",
                    disabled: completion.retry_disabled,
                    onclick: move |_| on_intent.call(PracticeIntent::Retry),
                    "Retry"
                }
            }

            if let Some(error) = completion.error.as_ref() {
                p { class: "topic-practice__error", id: "practice-retry-error", "{error}" }
            }
            if completion.history_loading {
                p { class: "topic-practice__empty", "Loading test history..." }
            }
            if let Some(error) = completion.history_error.as_ref() {
                p { class: "topic-practice__error", id: "practice-history-error", "{error}" }
            }
        }
    }
}

#[component]
fn SummaryItem(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "practice-summary__item",
            div { class: "practice-summary__label", "{label}" }
            div { class: "practice-summary__value", "{value}" }
        }
    }
}
