//! The `wordquiz quiz` command: an interactive multiple-choice session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use wordquiz_core::controller::SubmitOutcome;
use wordquiz_core::{
    Question, QuizBackend, QuizController, QuizError, QuizState, QuizStats, Route, Severity,
};

/// What the user typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Retry,
    Submit,
    Choose(&'a str),
}

fn parse_input<'a>(line: &'a str, question: Option<&'a Question>) -> Input<'a> {
    let line = line.trim();
    match line {
        "q" | "quit" => return Input::Quit,
        "r" | "retry" => return Input::Retry,
        "" => return Input::Submit,
        _ => {}
    }
    if let (Some(question), Ok(n)) = (question, line.parse::<usize>()) {
        if let Some(option) = n.checked_sub(1).and_then(|i| question.options.get(i)) {
            return Input::Choose(option);
        }
    }
    Input::Choose(line)
}

/// States that wait on the user rather than on the backend.
fn settled(state: &QuizState) -> bool {
    matches!(
        state,
        QuizState::Ready { .. }
            | QuizState::Idle { .. }
            | QuizState::Feedback {
                outcome: SubmitOutcome::Failed { .. },
                ..
            }
    )
}

fn print_question(question: &Question) {
    println!("\n{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

fn report(error: &QuizError) {
    match error.severity() {
        Severity::Warning => println!("{}", error.user_message()),
        Severity::Error => eprintln!("{}", error.user_message()),
    }
}

pub async fn execute(config_path: Option<PathBuf>, max_questions: Option<u32>) -> Result<()> {
    let config = super::load(config_path)?;
    let session = config.session();
    super::require_session(&session, Route::MultipleChoice)?;

    let backend: Arc<dyn QuizBackend> = Arc::new(config.backend()?);
    let controller = QuizController::spawn(backend, session, config.controller_config());
    let mut rx = controller.subscribe();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = false;
    let mut score_change = 0i64;

    loop {
        let state = rx.wait_for(settled).await?.clone();

        match &state {
            QuizState::Ready { question, .. } => {
                if !shown {
                    print_question(question);
                    shown = true;
                }
            }
            QuizState::Idle { error } => {
                shown = false;
                if let Some(error) = error {
                    eprintln!("{error}");
                }
                println!("Type r to retry or q to quit.");
            }
            QuizState::Feedback {
                outcome: SubmitOutcome::Failed { error },
                ..
            } => {
                eprintln!("{error}");
                println!("Press Enter to resubmit, r to skip to a new question, q to quit.");
            }
            _ => {}
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let submit = match parse_input(&line, state.question()) {
            Input::Quit => break,
            Input::Retry => {
                if let Err(e) = controller.fetch_new_question().await {
                    tracing::debug!("retry did not load a question: {e}");
                }
                shown = false;
                continue;
            }
            Input::Submit => true,
            Input::Choose(option) => match controller.select_option(option) {
                Ok(()) => true,
                Err(QuizError::AlreadyAnswered) => {
                    println!("Your answer is locked in. Press Enter to resubmit it.");
                    false
                }
                Err(e) => {
                    report(&e);
                    false
                }
            },
        };
        if !submit {
            continue;
        }

        match controller.check_answer().await {
            Ok(feedback) => {
                let change = feedback.receipt.score_change.unwrap_or(0);
                score_change += change;
                println!("{} ({change:+})", feedback.message);
                shown = false;

                if max_questions.is_some_and(|max| controller.stats().answered >= max) {
                    controller.cancel_pending();
                    break;
                }
            }
            // The failed state is reported on the next pass.
            Err(QuizError::Submit(_)) => {}
            Err(e) => report(&e),
        }
    }

    controller.cancel_pending();
    print_summary(&controller.stats(), score_change);
    Ok(())
}

fn print_summary(stats: &QuizStats, score_change: i64) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Answered", "Correct", "Incorrect", "Accuracy", "Score"]);
    table.add_row(vec![
        Cell::new(stats.answered),
        Cell::new(stats.correct),
        Cell::new(stats.incorrect()),
        Cell::new(format!("{:.1}%", stats.accuracy() * 100.0)),
        Cell::new(format!("{score_change:+}")),
    ]);

    println!("\n{table}");
}
