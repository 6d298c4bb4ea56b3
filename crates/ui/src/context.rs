use std::sync::Arc;

use practice_core::model::{CourseId, TopicId};
use services::{NavigationLock, PracticeLoopService};

pub trait UiApp: Send + Sync {
    /// Topic opened on launch.
    fn topic_id(&self) -> TopicId;
    fn course_id(&self) -> Option<CourseId>;

    fn practice_loop(&self) -> Arc<PracticeLoopService>;
    fn navigation_lock(&self) -> NavigationLock;
}

#[derive(Clone)]
pub struct AppContext {
    topic_id: TopicId,
    course_id: Option<CourseId>,

    practice_loop: Arc<PracticeLoopService>,
    navigation_lock: NavigationLock,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            topic_id: app.topic_id(),
            course_id: app.course_id(),
            practice_loop: app.practice_loop(),
            navigation_lock: app.navigation_lock(),
        }
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn course_id(&self) -> Option<CourseId> {
        self.course_id
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    /// Shared with every view; clones observe the same lock.
    #[must_use]
    pub fn navigation_lock(&self) -> NavigationLock {
        self.navigation_lock.clone()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
