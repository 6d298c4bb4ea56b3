use dioxus::prelude::*;

use crate::vm::{PracticeIntent, QuestionCardVm};

#[component]
pub(super) fn QuestionCard(card: QuestionCardVm, on_intent: EventHandler<PracticeIntent>) -> Element {
    let options = card.options.iter().map(|option| {
        let id = option.id;
        let class = if option.selected {
            "topic-practice__option-button topic-practice__option-button--selected"
        } else {
            "topic-practice__option-button"
        };
        rsx! {
            li { key: "{id}",
                button {
                    class: "{class}",
                    r#type: "button",
                    disabled: card.options_disabled,
                    onclick: move |_| on_intent.call(PracticeIntent::Toggle(id)),
                    span { class: "topic-practice__option-indicator", "{option.indicator()}" }
                    span { class: "topic-practice__option-text", "{option.text}" }
                }
            }
        }
    });

    rsx! {
        div { class: "topic-practice__question-card",
            div { class: "topic-practice__question-meta",
                span { class: "topic-practice__type", "{card.type_label}" }
            }
            div { class: "topic-practice__question-text", "{card.text}" }
            ul { class: "topic-practice__options", {options} }
            div { class: "topic-practice__actions",
                if let Some(feedback) = card.feedback.as_ref() {
                    div {
                        class: "topic-practice__feedback {feedback.class}",
                        id: "practice-feedback",
                        "{feedback.message}"
                    }
                }
                if let Some(error) = card.fetch_error.as_ref() {
                    p { class: "topic-practice__error", id: "practice-fetch-error", "{error}" }
                }
                div { class: "topic-practice__buttons-row",
                    if let Some(submit) = card.submit.as_ref() {
                        button {
                            class: "topic-practice__secondary-btn",
                            id: "practice-submit",
                            r#type: "button",
                            disabled: submit.disabled,
                            onclick: move |_| on_intent.call(PracticeIntent::Submit),
                            "{submit.label}"
                        }
                    }
                    if card.show_next {
                        button {
                            class: "topic-practice__secondary-btn",
                            id: "practice-next",
                            r#type: "button",
                            disabled: card.continue_disabled,
                            onclick: move |_| on_intent.call(PracticeIntent::Continue),
                            "Next question"
                        }
                    }
                    if card.show_finish {
                        button {
                            class: "topic-practice__secondary-btn",
                            id: "practice-finish",
                            r#type: "button",
                            disabled: card.continue_disabled,
                            onclick: move |_| on_intent.call(PracticeIntent::Continue),
                            "Finish test"
                        }
                    }
                }
            }
        }
    }
}
