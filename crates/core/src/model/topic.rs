use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, TopicId};

/// A learning unit whose practice quiz the session runs.
///
/// Topic metadata is fetched once per page visit and never mutated by the
/// session itself; a different topic means a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub module_title: String,
    #[serde(default)]
    pub is_timed_test: bool,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

impl Topic {
    /// Time limit of the practice quiz, only reported for timed tests.
    #[must_use]
    pub fn time_limit(&self) -> Option<u32> {
        if self.is_timed_test {
            self.time_limit_seconds
        } else {
            None
        }
    }

    /// `"Course · Module"` breadcrumb, skipping empty parts.
    #[must_use]
    pub fn breadcrumb(&self) -> String {
        [self.course_title.as_str(), self.module_title.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}
