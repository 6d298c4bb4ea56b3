use dioxus::prelude::*;

use crate::vm::HistoryItemVm;

#[component]
pub(super) fn HistoryList(items: Vec<HistoryItemVm>) -> Element {
    if items.is_empty() {
        return rsx! {
            section { class: "topic-practice__history",
                p { class: "topic-practice__empty", "No answered questions to display." }
            }
        };
    }

    let cards = items.iter().enumerate().map(|(index, item)| {
        let options = item.options.iter().map(|option| {
            rsx! {
                li {
                    div {
                        class: "topic-practice__option-button topic-practice__option-button_history {option.class}",
                        span { class: "topic-practice__option-indicator", "{option.indicator}" }
                        span { class: "topic-practice__option-text", "{option.text}" }
                        if option.is_correct {
                            span { class: "topic-practice__option-correct-label", "Correct" }
                        }
                    }
                }
            }
        });
        rsx! {
            div {
                key: "{index}",
                class: "topic-practice__question-card topic-practice__question-card--readonly",
                div { class: "topic-practice__question-header",
                    span { class: "topic-practice__type", "{item.type_label}" }
                    div { class: "topic-practice__question-text", "{item.text}" }
                }
                ul { class: "topic-practice__options", {options} }
                if let Some(verdict) = item.verdict.as_ref() {
                    div { class: "topic-practice__feedback {verdict.class}", "{verdict.message}" }
                }
            }
        }
    });

    rsx! {
        section { class: "topic-practice__history",
            div { class: "topic-practice__history-list", {cards} }
        }
    }
}
