use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::use_navigator;
use tracing::debug;

use practice_core::model::{CourseId, TopicId};
use services::sessions::Ticket;
use services::{PracticeLoopService, PracticeRuntime, PracticeSession, SessionError, TimerSignal};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{PracticeBody, PracticeIntent, PracticeVm};
use super::completion::CompletionPanel;
use super::history::HistoryList;
use super::question_card::QuestionCard;
use super::timer::PracticeTimer;

/// Run `ticket` and every follow-up the session asks for.
async fn run_tickets(
    practice_loop: Arc<PracticeLoopService>,
    mut session: Signal<PracticeSession>,
    ticket: Option<Ticket>,
) {
    let mut next = ticket;
    while let Some(ticket) = next {
        let reply = practice_loop.execute(ticket).await;
        next = session.write().apply(reply);
    }
}

/// Rejections the page surfaces; the rest are already reflected in the session.
fn surfaced_error(err: &SessionError) -> Option<ViewError> {
    match err {
        SessionError::Api(_) | SessionError::Selection(_) | SessionError::StaleResponse => {
            Some(ViewError::Unknown)
        }
        _ => None,
    }
}

#[component]
pub fn PracticeView(course_id: u64, topic_id: u64) -> Element {
    // Keyed so a different topic gets a fresh session and runtime.
    rsx! {
        PracticePage { key: "{course_id}-{topic_id}", topic_id, course_id: Some(course_id) }
    }
}

#[component]
pub fn TopicPracticeView(topic_id: u64) -> Element {
    rsx! {
        PracticePage { key: "{topic_id}", topic_id, course_id: None }
    }
}

#[component]
fn PracticePage(topic_id: u64, #[props(!optional)] course_id: Option<u64>) -> Element {
    let ctx = use_context::<AppContext>();
    let practice_loop = ctx.practice_loop();
    let topic_id = TopicId::new(topic_id);
    let course_id = course_id.map(CourseId::new);

    let session = {
        let practice_loop = Arc::clone(&practice_loop);
        use_signal(move || practice_loop.new_session(topic_id, course_id))
    };
    let error = use_signal(|| None::<ViewError>);
    let (runtime, ticks) = use_hook(|| {
        let (runtime, ticks) = PracticeRuntime::new(ctx.navigation_lock());
        (Rc::new(RefCell::new(runtime)), Rc::new(RefCell::new(Some(ticks))))
    });

    let resource = {
        let practice_loop = Arc::clone(&practice_loop);
        use_resource(move || {
            let practice_loop = Arc::clone(&practice_loop);
            let mut session = session;
            async move {
                let ticket = session.write().begin_load_topic();
                run_tickets(practice_loop, session, Some(ticket)).await;
                Ok::<_, ViewError>(())
            }
        })
    };

    // Timer and navigation lease follow the session.
    {
        let runtime = Rc::clone(&runtime);
        use_effect(move || {
            let session = session.read();
            runtime.borrow_mut().sync(&session);
        });
    }
    {
        let runtime = Rc::clone(&runtime);
        use_drop(move || runtime.borrow_mut().shutdown());
    }

    {
        let practice_loop = Arc::clone(&practice_loop);
        use_future(move || {
            let practice_loop = Arc::clone(&practice_loop);
            let ticks = Rc::clone(&ticks);
            let mut session = session;
            async move {
                let Some(mut receiver) = ticks.borrow_mut().take() else {
                    return;
                };
                while let Some(TimerSignal { generation }) = receiver.recv().await {
                    let ticket = session.write().tick(generation);
                    if ticket.is_some() {
                        spawn(run_tickets(Arc::clone(&practice_loop), session, ticket));
                    }
                }
            }
        });
    }

    let dispatch_intent = {
        let practice_loop = Arc::clone(&practice_loop);
        use_callback(move |intent: PracticeIntent| {
            let mut session = session;
            let mut error = error;
            let result = match intent {
                PracticeIntent::Reload => {
                    let mut resource = resource;
                    resource.restart();
                    Ok(None)
                }
                PracticeIntent::Toggle(option_id) => {
                    session.write().toggle_option(option_id);
                    Ok(None)
                }
                PracticeIntent::Submit => session.write().begin_submit(),
                PracticeIntent::Continue => session.write().continue_session(),
                PracticeIntent::FetchNext => session.write().begin_fetch_next().map(Some),
                PracticeIntent::Retry => session.write().begin_reset().map(Some),
                PracticeIntent::ViewHistory => session.write().begin_history().map(Some),
                PracticeIntent::BackToResults => {
                    session.write().back_to_results();
                    Ok(None)
                }
            };
            match result {
                Ok(ticket) => {
                    error.set(None);
                    if ticket.is_some() {
                        spawn(run_tickets(Arc::clone(&practice_loop), session, ticket));
                    }
                }
                Err(err) => {
                    debug!(?intent, error = %err, "practice intent rejected");
                    error.set(surfaced_error(&err));
                }
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<PracticeTestHandles>() {
                handles.register(dispatch_intent, session);
            }
        }
    }

    let state = view_state_from_resource(&resource);
    let vm = PracticeVm::from_session(&session.read());

    rsx! {
        div { class: "page topic-practice",
            header { class: "topic-practice__header",
                div { class: "topic-practice__heading",
                    if !vm.breadcrumb.is_empty() {
                        p { class: "topic-practice__breadcrumb", "{vm.breadcrumb}" }
                    }
                    h2 { class: "topic-practice__title", "{vm.title}" }
                }
                if let Some(timer) = vm.timer.clone() {
                    PracticeTimer { timer }
                }
            }
            if let Some(label) = vm.progress_label.as_ref() {
                div { class: "topic-practice__progress",
                    span { class: "topic-practice__progress-label", "{label}" }
                    div { class: "progress-bar",
                        div {
                            class: "progress-bar__fill",
                            style: "width: {vm.progress_percent}%;",
                        }
                    }
                }
            }
            if let Some(err) = *error.read() {
                p { class: "topic-practice__error", "{err.message()}" }
            }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "topic-practice__empty", "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| dispatch_intent.call(PracticeIntent::Reload),
                        "Retry"
                    }
                },
                ViewState::Ready(()) => rsx! {
                    PracticeBodyView { body: vm.body.clone(), on_intent: dispatch_intent }
                },
            }
        }
    }
}

#[component]
fn PracticeBodyView(body: PracticeBody, on_intent: EventHandler<PracticeIntent>) -> Element {
    let navigator = use_navigator();

    match body {
        PracticeBody::Loading => rsx! {
            p { class: "topic-practice__empty", "Loading..." }
        },
        PracticeBody::Unavailable(message) => rsx! {
            div { class: "topic-practice__unavailable",
                p { class: "topic-practice__error", id: "practice-unavailable", "{message}" }
                div { class: "topic-practice__buttons-row",
                    button {
                        class: "topic-practice__secondary-btn",
                        r#type: "button",
                        onclick: move |_| on_intent.call(PracticeIntent::Reload),
                        "Retry"
                    }
                    button {
                        class: "topic-practice__secondary-btn",
                        r#type: "button",
                        onclick: move |_| {
                            let _ = navigator.push(Route::Home {});
                        },
                        "Back"
                    }
                }
            }
        },
        PracticeBody::Empty => rsx! {
            p { class: "topic-practice__empty", "This topic has no practice questions yet." }
        },
        PracticeBody::Stalled { feedback, retry_disabled } => rsx! {
            if let Some(feedback) = feedback {
                div { class: "topic-practice__feedback {feedback.class}", "{feedback.message}" }
            }
            button {
                class: "topic-practice__secondary-btn",
                id: "practice-fetch-next",
                r#type: "button",
                disabled: retry_disabled,
                onclick: move |_| on_intent.call(PracticeIntent::FetchNext),
                "Retry"
            }
        },
        PracticeBody::Question(card) => rsx! {
            QuestionCard { card, on_intent }
        },
        PracticeBody::Completed(completion) => rsx! {
            CompletionPanel { completion, on_intent }
        },
        PracticeBody::History { completion, items } => rsx! {
            CompletionPanel { completion, on_intent }
            HistoryList { items }
            button {
                class: "topic-practice__secondary-btn",
                id: "practice-back-to-results",
                r#type: "button",
                onclick: move |_| on_intent.call(PracticeIntent::BackToResults),
                "Back to results"
            }
        },
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct PracticeTestHandles {
    dispatch: Rc<RefCell<Option<Callback<PracticeIntent>>>>,
    session: Rc<RefCell<Option<Signal<PracticeSession>>>>,
}

#[cfg(test)]
impl PracticeTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<PracticeIntent>,
        session: Signal<PracticeSession>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.session.borrow_mut() = Some(session);
    }

    pub(crate) fn dispatch(&self) -> Callback<PracticeIntent> {
        (*self.dispatch.borrow()).expect("practice dispatch registered")
    }

    pub(crate) fn session(&self) -> Signal<PracticeSession> {
        (*self.session.borrow()).expect("practice session registered")
    }
}
