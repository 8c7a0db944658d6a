//! Plain-text presentation for a terminal session.

use std::fmt::{self, Write as _};

use exam_core::ScoreReport;
use exam_core::model::{MsqSelection, OPTION_LABELS, QuestionStatus};
use services::{SessionAction, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(SessionAction),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidQuestionNumber { raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(cmd) => write!(f, "unknown command: {cmd} (type `help`)"),
            CommandError::MissingArgument { command } => write!(f, "{command} requires a value"),
            CommandError::InvalidQuestionNumber { raw } => {
                write!(f, "invalid question number: {raw}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  a, answer <value>   set the answer for the current question
  t, toggle <option>  select/deselect an option (A-D)
  n, save             save & next
  m, mark             mark for review & next
  c, clear            clear response
  g, goto <number>    jump to question number (1-based palette position)
  s, show             redraw the current question and palette
  submit              submit the exam
  q, quit             leave without submitting";

/// Parse one input line. An empty line redraws the screen.
///
/// # Errors
///
/// Returns `CommandError` for unknown commands or missing/invalid arguments.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "" | "s" | "show" => Command::Show,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        "n" | "next" | "save" => Command::Action(SessionAction::SaveAndNext),
        "m" | "mark" => Command::Action(SessionAction::MarkForReview),
        "c" | "clear" => Command::Action(SessionAction::ClearResponse),
        "submit" => Command::Action(SessionAction::Submit),
        "a" | "answer" => {
            let value = require(rest, "answer")?;
            Command::Action(SessionAction::UpdateAnswer(value.to_owned()))
        }
        "t" | "toggle" => {
            let option = require(rest, "toggle")?;
            Command::Action(SessionAction::ToggleOption(option.to_owned()))
        }
        "g" | "goto" => {
            let raw = require(rest, "goto")?;
            let number: usize = raw
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandError::InvalidQuestionNumber {
                    raw: raw.to_owned(),
                })?;
            Command::Action(SessionAction::GoTo(number - 1))
        }
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(command)
}

fn require<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest)
    }
}

fn palette_glyph(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::NotVisited => "  ",
        QuestionStatus::NotAnswered => "x ",
        QuestionStatus::Answered => "ok",
        QuestionStatus::Marked => "? ",
        QuestionStatus::MarkedAnswered => "?+",
    }
}

/// Header, current question and palette.
#[must_use]
pub fn render_session(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    let q = snap.current_question();

    let _ = writeln!(out, "== {} ==  time left {}", snap.title, snap.countdown());
    let _ = writeln!(
        out,
        "Question {} ({}/{})  [{}]  +{} / -{}",
        q.id,
        snap.current_index + 1,
        snap.questions.len(),
        q.kind,
        q.marks,
        q.negative_marks
    );
    if !q.content.is_empty() {
        let _ = writeln!(out, "  content: {}", q.content.as_str());
    }
    let _ = writeln!(out, "  your answer: {}", snap.current_answer().unwrap_or("-"));
    if q.kind.uses_options() {
        let picked = MsqSelection::parse(snap.current_answer().unwrap_or_default());
        out.push_str("  options:");
        for label in OPTION_LABELS {
            let mark = if picked.contains(label) { 'x' } else { ' ' };
            let _ = write!(out, " [{mark}] {label}");
        }
        out.push('\n');
    }

    out.push_str("Palette:");
    for (idx, (question, status)) in snap.palette().enumerate() {
        let cursor = if idx == snap.current_index { '>' } else { ' ' };
        let _ = write!(out, " {cursor}{}[{}]", question.id, palette_glyph(status));
    }
    out.push('\n');

    let marked: Vec<String> = snap
        .palette()
        .filter(|(_, status)| status.is_marked())
        .map(|(question, _)| question.id.to_string())
        .collect();
    if !marked.is_empty() {
        let _ = writeln!(out, "  marked for review: {}", marked.join(", "));
    }

    let counts = snap.status_counts();
    let _ = writeln!(
        out,
        "  answered {}  not answered {}  not visited {}  marked {}  answered & marked {}",
        counts.answered,
        counts.not_answered,
        counts.not_visited,
        counts.marked,
        counts.marked_answered
    );
    out
}

/// Summary cards plus the question-wise table.
#[must_use]
pub fn render_report(report: &ScoreReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total score: {:.2} / {:.2}", report.total_score, report.max_score);
    let _ = writeln!(out, "Accuracy:    {:.1}%", report.accuracy);
    let _ = writeln!(
        out,
        "Attempted:   {} / {}",
        report.attempted_count, report.question_count
    );
    let _ = writeln!(
        out,
        "Correct / Wrong: {} / {}",
        report.correct_count, report.wrong_count
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<6}{:<6}{:<8}{:<16}{:<16}{:<12}{:>8}",
        "Q.No", "Type", "Marks", "Your Answer", "Correct", "Status", "Awarded"
    );
    for r in &report.analysis {
        let status = if !r.is_attempted {
            "Unattempted"
        } else if r.is_correct {
            "Correct"
        } else {
            "Wrong"
        };
        let awarded = if r.marks_awarded > 0.0 {
            format!("+{}", r.marks_awarded)
        } else {
            r.marks_awarded.to_string()
        };
        let _ = writeln!(
            out,
            "{:<6}{:<6}{:<8}{:<16}{:<16}{:<12}{:>8}",
            r.question_id, r.kind, r.marks, r.user_answer, r.correct_answer, status, awarded
        );
    }
    out
}
