use std::time::Duration;

use exam_core::model::{
    ExamCatalog, Question, QuestionId, QuestionStatus, QuestionType, SessionPhase, SubmitReason,
};
use exam_core::time::fixed_now;
use services::{Clock, ExamRunner, RunnerConfig, SessionAction};

fn catalog() -> ExamCatalog {
    ExamCatalog::new(
        "Smoke Exam",
        1,
        vec![
            Question::new(QuestionId::new(1), QuestionType::Mcq, "A").with_marks(2.0, 0.66),
            Question::new(QuestionId::new(2), QuestionType::Msq, "A;C").with_marks(2.0, 0.0),
            Question::new(QuestionId::new(3), QuestionType::Nat, "3.14").with_marks(1.0, 0.0),
        ],
    )
    .unwrap()
}

fn config() -> RunnerConfig {
    RunnerConfig::default().with_clock(Clock::fixed(fixed_now()))
}

fn status(runner: &ExamRunner, id: u64) -> QuestionStatus {
    runner.snapshot().status[&QuestionId::new(id)]
}

#[tokio::test(start_paused = true)]
async fn countdown_auto_submits_after_sixty_ticks() {
    let runner = ExamRunner::start(catalog(), config()).unwrap();

    assert_eq!(status(&runner, 1), QuestionStatus::NotAnswered);
    assert_eq!(status(&runner, 2), QuestionStatus::NotVisited);
    assert_eq!(status(&runner, 3), QuestionStatus::NotVisited);

    runner.apply(SessionAction::UpdateAnswer("A".into()));
    let snap = runner.apply(SessionAction::SaveAndNext);
    assert_eq!(snap.current_index, 1);
    assert_eq!(status(&runner, 1), QuestionStatus::Answered);
    assert_eq!(status(&runner, 2), QuestionStatus::NotAnswered);
    assert_eq!(status(&runner, 3), QuestionStatus::NotVisited);

    tokio::time::sleep(Duration::from_millis(59_500)).await;
    let snap = runner.snapshot();
    assert_eq!(snap.phase, SessionPhase::Active);
    assert_eq!(snap.time_remaining, 1);
    assert!(runner.report().is_none());

    let submission = runner.submitted().await.unwrap();
    assert_eq!(submission.reason, SubmitReason::Timeout);

    let snap = runner.snapshot();
    assert_eq!(snap.phase, SessionPhase::Submitted);
    assert_eq!(snap.time_remaining, 0);

    let report = runner.report().unwrap();
    let q1 = report.record(QuestionId::new(1)).unwrap();
    assert!(q1.is_correct);
    assert_eq!(q1.marks_awarded, 2.0);
    assert_eq!(report.attempted_count, 1);
    assert_eq!(report.total_score, 2.0);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_wins_and_timer_winds_down() {
    let runner = ExamRunner::start(catalog(), config()).unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let first = runner.submit().unwrap();
    assert_eq!(first.reason, SubmitReason::Manual);
    assert!(runner.submit().is_none());

    tokio::time::sleep(Duration::from_secs(120)).await;
    let snap = runner.snapshot();
    assert_eq!(snap.time_remaining, 50);
    assert_eq!(snap.submission.unwrap().reason, SubmitReason::Manual);
    assert!(!runner.timer_running());
    assert_eq!(runner.submitted().await.unwrap().reason, SubmitReason::Manual);
}

#[tokio::test(start_paused = true)]
async fn stopped_timer_never_ticks_again() {
    let mut runner = ExamRunner::start(catalog(), config()).unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(runner.snapshot().time_remaining, 57);

    runner.stop_timer();
    runner.stop_timer();
    tokio::time::sleep(Duration::from_secs(300)).await;

    let snap = runner.snapshot();
    assert_eq!(snap.time_remaining, 57);
    assert_eq!(snap.phase, SessionPhase::Active);
    assert!(!runner.timer_running());
}

#[tokio::test(start_paused = true)]
async fn dropping_runner_cancels_countdown() {
    let runner = ExamRunner::start(catalog(), config()).unwrap();
    let rx = runner.subscribe();
    drop(runner);

    tokio::time::sleep(Duration::from_secs(300)).await;
    let snap = rx.borrow().clone();
    assert_eq!(snap.time_remaining, 60);
    assert_eq!(snap.phase, SessionPhase::Active);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_every_tick() {
    let runner = ExamRunner::start(catalog(), config()).unwrap();
    let mut rx = runner.subscribe();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().time_remaining, 59);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().countdown(), "00:58");
}

#[tokio::test(start_paused = true)]
async fn actions_after_timeout_are_ignored() {
    let runner = ExamRunner::start(catalog(), config()).unwrap();
    runner.submitted().await.unwrap();
    let frozen = runner.snapshot();

    runner.apply(SessionAction::UpdateAnswer("B".into()));
    runner.apply(SessionAction::GoTo(2));
    runner.apply(SessionAction::Submit);

    assert_eq!(runner.snapshot(), frozen);
    assert_eq!(runner.report().unwrap().attempted_count, 0);
}
