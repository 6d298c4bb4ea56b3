use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use practice_core::model::{
    AnswerOption, CourseId, OptionId, Phase, Question, QuestionId, QuestionType, Topic, TopicId,
};
use services::api::{NextQuestionPayload, TopicPayload};
use services::{NavigationLock, PracticeLoopService, ScriptedPracticeApi};

use crate::context::{UiApp, build_app_context};
use crate::routes::{CloseGuard, CloseTestHandles};
use crate::vm::PracticeIntent;
use super::view::PracticeTestHandles;
use super::{PracticeView, TopicPracticeView};

pub(super) const COURSE: u64 = 3;
pub(super) const TOPIC: u64 = 8;

struct TestApp {
    practice_loop: Arc<PracticeLoopService>,
    lock: NavigationLock,
}

impl UiApp for TestApp {
    fn topic_id(&self) -> TopicId {
        TopicId::new(TOPIC)
    }

    fn course_id(&self) -> Option<CourseId> {
        Some(CourseId::new(COURSE))
    }

    fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    fn navigation_lock(&self) -> NavigationLock {
        self.lock.clone()
    }
}

#[derive(Props, Clone)]
struct PracticeHarnessProps {
    app: Arc<TestApp>,
    with_course: bool,
    handles: PracticeTestHandles,
    close: CloseTestHandles,
    topic: TopicSwitch,
}

/// Lets a test point the page at another topic without changing route.
#[derive(Clone, Default)]
pub(super) struct TopicSwitch(Rc<RefCell<Option<Signal<u64>>>>);

impl PartialEq for PracticeHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn PracticeRouterHarness(props: PracticeHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.handles.clone());
    use_context_provider(|| props.close.clone());
    use_context_provider(|| props.with_course);
    let topic = use_signal(|| TOPIC);
    *props.topic.0.borrow_mut() = Some(topic);
    use_context_provider(|| topic);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let with_course = use_context::<bool>();
    let topic_id = use_context::<Signal<u64>>()();
    rsx! {
        CloseGuard {}
        if with_course {
            PracticeView { course_id: COURSE, topic_id }
        } else {
            TopicPracticeView { topic_id }
        }
    }
}

pub(super) struct PracticeHarness {
    pub dom: VirtualDom,
    pub api: ScriptedPracticeApi,
    pub lock: NavigationLock,
    pub handles: PracticeTestHandles,
    pub close: CloseTestHandles,
    topic: TopicSwitch,
}

impl PracticeHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        self.dom.process_events();
        self.dom.render_immediate(&mut NoOpMutations);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let queued requests and effects run to completion.
    pub async fn settle(&mut self) {
        for _ in 0..8 {
            self.drive_async().await;
        }
    }

    pub fn dispatch(&self, intent: PracticeIntent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
    }

    pub fn request_close(&self) {
        self.dom.in_runtime(|| self.close.request_close());
    }

    pub fn switch_topic(&self, topic_id: u64) {
        let Some(mut topic) = *self.topic.0.borrow() else {
            panic!("harness not rebuilt yet");
        };
        self.dom.in_runtime(|| topic.set(topic_id));
    }

    pub fn phase(&self) -> Phase {
        let session = self.handles.session();
        self.dom.in_runtime(|| session.peek().phase())
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub(super) fn setup_practice_harness(api: ScriptedPracticeApi, with_course: bool) -> PracticeHarness {
    let lock = NavigationLock::new();
    let practice_loop = Arc::new(PracticeLoopService::new(Arc::new(api.clone())));
    let handles = PracticeTestHandles::default();
    let close = CloseTestHandles::default();
    let topic = TopicSwitch::default();
    let app = Arc::new(TestApp {
        practice_loop,
        lock: lock.clone(),
    });

    let dom = VirtualDom::new_with_props(
        PracticeRouterHarness,
        PracticeHarnessProps {
            app,
            with_course,
            handles: handles.clone(),
            close: close.clone(),
            topic: topic.clone(),
        },
    );

    PracticeHarness {
        dom,
        api,
        lock,
        handles,
        close,
        topic,
    }
}

pub(super) fn topic(timed: bool, total: u32) -> TopicPayload {
    TopicPayload {
        topic: Topic {
            id: TopicId::new(TOPIC),
            title: "Borrowing".into(),
            course_id: Some(CourseId::new(COURSE)),
            course_title: "Rust".into(),
            module_title: "Ownership".into(),
            is_timed_test: timed,
            time_limit_seconds: timed.then_some(90),
        },
        total_questions: total,
        answered_questions: 0,
        correct_answers: Some(0),
        progress_percent: 0,
    }
}

pub(super) fn question(id: u64, text: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        text: text.to_string(),
        kind: QuestionType::SingleChoice,
        order: None,
        max_score: Some(1),
        options: vec![
            AnswerOption {
                id: OptionId::new(id * 10 + 1),
                text: "&T".into(),
            },
            AnswerOption {
                id: OptionId::new(id * 10 + 2),
                text: "&mut T".into(),
            },
        ],
    }
}

pub(super) fn next(question: Question, answered: u32, total: u32) -> NextQuestionPayload {
    NextQuestionPayload {
        question: Some(question),
        answered_questions: answered,
        total_questions: total,
        correct_answers: Some(answered),
        ..NextQuestionPayload::default()
    }
}
