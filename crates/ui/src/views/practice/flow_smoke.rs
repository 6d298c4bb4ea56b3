use dioxus::prelude::ReadableExt;
use practice_core::model::{
    OptionId, Phase, QuestionId, QuestionType, ReviewedOption, ReviewedQuestion, TopicId,
};
use services::ApiError;
use services::api::{AnswerPayload, HistoryPayload, NextQuestionPayload, RecordedCall};

use crate::vm::PracticeIntent;
use super::test_harness::{next, question, setup_practice_harness, topic};

fn graded(correct: bool, answered: u32, total: u32) -> AnswerPayload {
    AnswerPayload {
        is_correct: Some(correct),
        score: Some(u32::from(correct)),
        answered_questions: Some(answered),
        total_questions: Some(total),
        correct_answers: Some(answered),
        ..AnswerPayload::default()
    }
}

#[tokio::test(flavor = "current_thread")]
async fn untimed_topic_runs_to_a_passed_result() {
    let api = services::ScriptedPracticeApi::new();
    let mut last = graded(true, 2, 2);
    last.test_completed = true;
    last.passed = Some(true);
    last.score_percent = Some(100);
    api.push_topic(Ok(topic(false, 2)))
        .push_next_question(Ok(next(question(1, "Shared borrow?"), 0, 2)))
        .push_answer(Ok(graded(true, 1, 2)))
        .push_next_question(Ok(next(question(2, "Unique borrow?"), 1, 2)))
        .push_answer(Ok(last));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Shared borrow?"), "missing question in {html}");
    assert!(html.contains("Rust · Ownership"), "missing breadcrumb in {html}");
    assert!(html.contains("Single choice"), "missing type label in {html}");
    assert!(!harness.lock.is_locked());

    harness.dispatch(PracticeIntent::Toggle(OptionId::new(11)));
    harness.dispatch(PracticeIntent::Submit);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Correct answer!"), "missing feedback in {html}");
    assert!(html.contains("Next question"), "missing next in {html}");

    harness.dispatch(PracticeIntent::Continue);
    harness.settle().await;
    harness.dispatch(PracticeIntent::Toggle(OptionId::new(22)));
    harness.dispatch(PracticeIntent::Submit);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Finish test"), "missing finish in {html}");

    harness.dispatch(PracticeIntent::Continue);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Borrowing – Test passed"), "missing outcome in {html}");
    assert!(html.contains("2/2"), "missing counters in {html}");
    assert!(html.contains("100%"), "missing accuracy in {html}");
    assert!(html.contains("View test history"), "missing history button in {html}");
    assert_eq!(harness.phase(), Phase::Completed);
}

#[tokio::test(flavor = "current_thread")]
async fn empty_submission_shows_validation_feedback() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Ok(topic(false, 1)))
        .push_next_question(Ok(next(question(1, "Shared borrow?"), 0, 1)));

    let mut harness = setup_practice_harness(api, false);
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(PracticeIntent::Submit);
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Please select at least one option."),
        "missing validation message in {html}"
    );
    assert_eq!(harness.api.calls().len(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn missing_topic_renders_not_found() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Err(ApiError::NotFound {
        detail: "Not found.".into(),
    }));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Topic not found."), "missing message in {html}");
    assert!(!harness.lock.is_locked());
}

#[tokio::test(flavor = "current_thread")]
async fn timed_topic_locks_navigation_until_page_drops() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Ok(topic(true, 2)))
        .push_next_question(Ok(NextQuestionPayload {
            is_timed: true,
            time_limit_seconds: Some(90),
            remaining_seconds: Some(75),
            ..next(question(1, "Shared borrow?"), 0, 2)
        }));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("practice-timer"), "missing timer in {html}");
    assert!(html.contains("01:1"), "missing countdown in {html}");
    assert!(harness.lock.is_locked());
    assert_eq!(harness.lock.redirect_for("/"), Some("/learning/courses/3/topics/8/practice".to_string()));

    let lock = harness.lock.clone();
    drop(harness);
    assert!(!lock.is_locked());
}

#[tokio::test(flavor = "current_thread")]
async fn history_review_opens_and_returns_to_results() {
    let api = services::ScriptedPracticeApi::new();
    let mut done = topic(false, 1);
    done.answered_questions = 1;
    done.correct_answers = Some(1);
    done.progress_percent = 100;
    api.push_topic(Ok(done)).push_history(Ok(HistoryPayload {
        topic_title: "Borrowing".into(),
        questions: vec![ReviewedQuestion {
            id: QuestionId::new(1),
            text: "Shared borrow?".into(),
            kind: QuestionType::SingleChoice,
            options: vec![
                ReviewedOption {
                    id: OptionId::new(11),
                    text: "&T".into(),
                    is_correct: true,
                },
                ReviewedOption {
                    id: OptionId::new(12),
                    text: "&mut T".into(),
                    is_correct: false,
                },
            ],
            user_option_ids: vec![OptionId::new(11)],
            is_correct: Some(true),
        }],
    }));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;
    assert!(harness.render().contains("Test passed"));

    harness.dispatch(PracticeIntent::ViewHistory);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("History opened"), "missing opened label in {html}");
    assert!(html.contains("Correct answer!"), "missing verdict in {html}");
    assert!(html.contains("Back to results"), "missing back button in {html}");

    harness.dispatch(PracticeIntent::BackToResults);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("View test history"), "missing history button in {html}");
    assert!(!html.contains("Back to results"));
}

#[tokio::test(flavor = "current_thread")]
async fn failed_next_question_keeps_answer_and_next_button() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Ok(topic(false, 2)))
        .push_next_question(Ok(next(question(1, "Shared borrow?"), 0, 2)))
        .push_answer(Ok(graded(true, 1, 2)))
        .push_next_question(Err(ApiError::Unavailable("offline".into())));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(PracticeIntent::Toggle(OptionId::new(11)));
    harness.dispatch(PracticeIntent::Submit);
    harness.settle().await;
    harness.dispatch(PracticeIntent::Continue);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Shared borrow?"), "question lost in {html}");
    assert!(html.contains("Correct answer!"), "graded feedback lost in {html}");
    assert!(html.contains("practice-fetch-error"), "missing fetch error in {html}");
    assert!(html.contains("Next question"), "missing next in {html}");
    assert!(!html.contains("practice-submit"), "submit came back in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn failed_retry_is_reported_on_results() {
    let api = services::ScriptedPracticeApi::new();
    let mut done = topic(false, 1);
    done.answered_questions = 1;
    done.correct_answers = Some(1);
    done.progress_percent = 100;
    api.push_topic(Ok(done))
        .push_reset(Err(ApiError::Unavailable("offline".into())));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(PracticeIntent::Retry);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("practice-retry-error"), "missing retry error in {html}");
    assert!(
        html.contains("Failed to restart the test."),
        "missing retry message in {html}"
    );
    assert_eq!(harness.phase(), Phase::Completed);
}

#[tokio::test(flavor = "current_thread")]
async fn closing_during_timed_test_warns() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Ok(topic(true, 2)))
        .push_next_question(Ok(NextQuestionPayload {
            is_timed: true,
            time_limit_seconds: Some(90),
            remaining_seconds: Some(75),
            ..next(question(1, "Shared borrow?"), 0, 2)
        }));

    let mut harness = setup_practice_harness(api, true);
    harness.rebuild();
    harness.settle().await;
    assert!(harness.lock.is_locked());
    assert!(!harness.render().contains("close-warning"));

    harness.request_close();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("close-warning"), "missing close warning in {html}");
    assert!(html.contains("A timed test is in progress."), "missing reason in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn closing_untimed_practice_is_not_blocked() {
    let api = services::ScriptedPracticeApi::new();
    api.push_topic(Ok(topic(false, 1)))
        .push_next_question(Ok(next(question(1, "Shared borrow?"), 0, 1)));

    let mut harness = setup_practice_harness(api, false);
    harness.rebuild();
    harness.settle().await;

    harness.request_close();
    harness.settle().await;
    assert!(!harness.render().contains("close-warning"));
}

#[tokio::test(flavor = "current_thread")]
async fn switching_topic_starts_a_fresh_session() {
    let api = services::ScriptedPracticeApi::new();
    let mut other = topic(false, 1);
    other.topic.id = TopicId::new(9);
    other.topic.title = "Slices".into();
    api.push_topic(Ok(topic(false, 2)))
        .push_next_question(Ok(next(question(1, "Shared borrow?"), 0, 2)))
        .push_topic(Ok(other))
        .push_next_question(Ok(next(question(5, "Slice length?"), 0, 1)));

    let mut harness = setup_practice_harness(api, false);
    harness.rebuild();
    harness.settle().await;
    harness.dispatch(PracticeIntent::Toggle(OptionId::new(11)));
    assert!(harness.render().contains("Shared borrow?"));

    harness.switch_topic(9);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Slice length?"), "old question still shown in {html}");
    assert!(html.contains("Slices"), "missing new title in {html}");
    let session = harness.handles.session();
    let (topic_id, selected) =
        harness.dom.in_runtime(|| (session.peek().topic_id(), session.peek().selection().len()));
    assert_eq!(topic_id, TopicId::new(9));
    assert_eq!(selected, 0);
    assert!(harness.api.calls().contains(&RecordedCall::GetTopic(TopicId::new(9))));
}
