use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{DesktopContext, use_wry_event_handler, window};
use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator, use_route};
use tracing::{info, warn};

use practice_core::model::{CourseId, TopicId};
use services::NavigationLock;

use crate::context::AppContext;
use crate::views::{HomeView, PracticeView, TopicPracticeView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/learning/courses/:course_id/topics/:topic_id/practice", PracticeView)]
        Practice { course_id: u64, topic_id: u64 },
        #[route("/learning/topics/:topic_id/practice", TopicPracticeView)]
        TopicPractice { topic_id: u64 },
}

impl Route {
    /// Practice page of a topic, scoped to its course when known.
    #[must_use]
    pub fn for_topic(topic_id: TopicId, course_id: Option<CourseId>) -> Self {
        match course_id {
            Some(course_id) => Self::Practice {
                course_id: course_id.value(),
                topic_id: topic_id.value(),
            },
            None => Self::TopicPractice {
                topic_id: topic_id.value(),
            },
        }
    }
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                NavigationGate {}
                CloseGuard {}
                Outlet::<Route> {}
            }
        }
    }
}

/// Sends the learner back to the allowed page while the navigation lock is held.
#[component]
fn NavigationGate() -> Element {
    let ctx = use_context::<AppContext>();
    let lock = ctx.navigation_lock();
    let navigator = use_navigator();
    let route = use_route::<Route>();
    let lock_state = use_signal(|| lock.state());

    {
        let lock = lock.clone();
        use_future(move || {
            let mut receiver = lock.subscribe();
            let mut lock_state = lock_state;
            async move {
                while receiver.changed().await.is_ok() {
                    let state = receiver.borrow_and_update().clone();
                    lock_state.set(state);
                }
            }
        });
    }

    let path = route.to_string();
    use_effect(use_reactive((&path,), move |(path,)| {
        if !lock_state.read().is_locked {
            return;
        }
        let Some(target) = lock.redirect_for(&path) else {
            return;
        };
        info!(from = %path, to = %target, "navigation blocked by lock");
        if let Ok(route) = target.parse::<Route>() {
            let _ = navigator.replace(route);
        }
    }));

    let state = lock_state.read();
    let reason = state.reason.clone().unwrap_or_default();
    rsx! {
        if state.is_locked {
            div { class: "lock-banner", role: "status", "{reason}" }
        }
    }
}

/// What to do with a request to close the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseDecision {
    Proceed,
    Warn(String),
}

#[must_use]
pub fn close_decision(lock: &NavigationLock) -> CloseDecision {
    lock.close_warning()
        .map_or(CloseDecision::Proceed, CloseDecision::Warn)
}

fn handle_close_request(lock: &NavigationLock, mut warning: Signal<Option<String>>) {
    match close_decision(lock) {
        CloseDecision::Warn(message) => {
            warn!("window close requested while navigation is locked");
            warning.set(Some(message));
        }
        CloseDecision::Proceed => warning.set(None),
    }
}

/// Warns about closing the window while the navigation lock is held.
#[component]
pub(crate) fn CloseGuard() -> Element {
    let ctx = use_context::<AppContext>();
    let lock = ctx.navigation_lock();
    let mut warning = use_signal(|| None::<String>);
    let on_desktop = use_hook(|| try_consume_context::<DesktopContext>().is_some());

    {
        let lock = lock.clone();
        use_future(move || {
            let mut receiver = lock.subscribe();
            let mut warning = warning;
            async move {
                while receiver.changed().await.is_ok() {
                    if !receiver.borrow_and_update().is_locked {
                        warning.set(None);
                    }
                }
            }
        });
    }

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<CloseTestHandles>() {
                handles.register(lock.clone(), warning);
            }
        }
    }

    rsx! {
        if on_desktop {
            DesktopCloseHook { warning }
        }
        if let Some(message) = warning() {
            div { class: "close-warning", role: "alertdialog", id: "close-warning",
                p { "{message}" }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| warning.set(None),
                    "Stay on this page"
                }
            }
        }
    }
}

/// Keeps the window's close button in step with the lock and listens for close requests.
#[component]
fn DesktopCloseHook(warning: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let lock = ctx.navigation_lock();
    let desktop = use_hook(window);

    {
        let lock = lock.clone();
        let desktop = desktop.clone();
        use_future(move || {
            let mut receiver = lock.subscribe();
            let desktop = desktop.clone();
            async move {
                let locked = receiver.borrow_and_update().is_locked;
                desktop.set_closable(!locked);
                while receiver.changed().await.is_ok() {
                    let locked = receiver.borrow_and_update().is_locked;
                    desktop.set_closable(!locked);
                }
            }
        });
    }

    use_wry_event_handler(move |event, _| {
        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            handle_close_request(&lock, warning);
        }
    });

    rsx! {}
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CloseTestHandles {
    target: std::rc::Rc<std::cell::RefCell<Option<(NavigationLock, Signal<Option<String>>)>>>,
}

#[cfg(test)]
impl CloseTestHandles {
    fn register(&self, lock: NavigationLock, warning: Signal<Option<String>>) {
        *self.target.borrow_mut() = Some((lock, warning));
    }

    /// Act as if the window manager asked to close the window.
    pub(crate) fn request_close(&self) {
        let target = self.target.borrow();
        let (lock, warning) = target.as_ref().expect("close guard registered");
        handle_close_request(lock, *warning);
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let practice = Route::for_topic(ctx.topic_id(), ctx.course_id());

    rsx! {
        nav { class: "sidebar",
            h1 { "Practice" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: practice, "Topic practice" } }
            }
        }
    }
}
