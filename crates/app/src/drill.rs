//! Line-oriented terminal front end for the quiz service.

use drill_core::model::{AnswerKey, Category, LabelResolver};
use drill_core::session::{AnswerOutcome, SessionSummary};
use services::{QuizPhase, QuizService};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(AnswerKey),
    Next,
    Start,
    Reset,
    Category(Category),
    Stats,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match word.to_ascii_lowercase().as_str() {
        "1" => Input::Answer(AnswerKey::Nom),
        "2" => Input::Answer(AnswerKey::Akk),
        "3" => Input::Answer(AnswerKey::Dat),
        "" | "n" | "next" => Input::Next,
        "s" | "start" => Input::Start,
        "r" | "reset" => Input::Reset,
        "stats" => Input::Stats,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        "c" | "category" => rest
            .parse()
            .map_or_else(|_| Input::Unknown(line.to_string()), Input::Category),
        other => other
            .parse()
            .map_or_else(|_| Input::Unknown(line.to_string()), Input::Answer),
    }
}

fn format_rate(rate: Option<u8>) -> String {
    rate.map_or_else(|| "-".to_string(), |percent| format!("{percent}%"))
}

/// The hint is only shown after a wrong answer.
fn feedback(outcome: &AnswerOutcome, labels: &dyn LabelResolver) -> Vec<String> {
    if outcome.is_correct {
        return vec!["Richtig!".to_string()];
    }
    let mut lines = vec![format!("Falsch, richtig ist: {}", labels.label(outcome.correct_key))];
    if !outcome.hint.is_empty() {
        lines.push(format!("Tipp: {}", outcome.hint));
    }
    lines
}

fn print_help() {
    println!("Befehle:");
    println!("  1/2/3 oder nom/akk/dat   Antwort waehlen");
    println!("  <Enter>, n               naechste Frage");
    println!("  s                        neue Runde");
    println!("  r                        Runde abbrechen");
    println!("  c masc|fem|neut          Kategorie wechseln");
    println!("  stats                    Zwischenstand");
    println!("  q                        beenden");
}

fn print_question(quiz: &QuizService) {
    let (Some(question), Some(progress), Some(session)) =
        (quiz.current_question(), quiz.progress(), quiz.session())
    else {
        return;
    };
    let labels = quiz.labels();
    println!();
    println!(
        "[{}] Frage {}/{}  Punkte {}  Serie {}",
        quiz.category(),
        progress.position,
        progress.total,
        session.score(),
        session.streak()
    );
    println!("{}", question.text);
    let options: Vec<String> = AnswerKey::ALL
        .iter()
        .enumerate()
        .map(|(i, key)| format!("{}) {}", i + 1, labels.label(*key)))
        .collect();
    println!("{}", options.join("   "));
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "Ergebnis: {}/{}  (beantwortet {}, Serie {})",
        summary.score, summary.total, summary.answered, summary.streak
    );
    let rates: Vec<String> = summary
        .rates()
        .map(|(case, rate)| format!("{case}: {}", format_rate(rate)))
        .collect();
    println!("Trefferquote  {}", rates.join("  "));
    if summary.mistakes.is_empty() {
        println!("Keine Fehler.");
    } else {
        println!("Fehler:");
        for mistake in &summary.mistakes {
            println!(
                "  {}  (du: {} / richtig: {})",
                mistake.question_text, mistake.chosen_label, mistake.correct_label
            );
        }
    }
}

fn start(quiz: &mut QuizService) {
    match quiz.start_session() {
        Ok(_) => print_question(quiz),
        Err(err) => println!("Keine Runde moeglich: {err}"),
    }
}

/// Load the starting category. A failed load is reported and leaves an empty
/// drill; switching category later can recover.
pub async fn open(quiz: &mut QuizService, requested: Option<Category>) {
    if let Err(err) = quiz.bootstrap(requested).await {
        tracing::warn!(error = %err, "starting without questions");
        println!("{err}");
    }
}

/// Read commands from stdin until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(quiz: &mut QuizService) -> std::io::Result<()> {
    println!(
        "Artikel-Drill: {} Fragen in {} ('help' fuer Befehle)",
        quiz.pool().len(),
        quiz.category()
    );
    start(quiz);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Answer(key) => match quiz.submit_answer(key) {
                Ok(outcome) => {
                    for line in feedback(&outcome, &quiz.labels()) {
                        println!("{line}");
                    }
                }
                Err(err) => println!("{err}"),
            },
            Input::Next => match quiz.advance() {
                QuizPhase::AwaitingAnswer => print_question(quiz),
                QuizPhase::Completed => {
                    if let Some(summary) = quiz.summary() {
                        print_summary(&summary);
                    }
                    println!("'s' fuer eine neue Runde.");
                }
                QuizPhase::NotStarted => println!("Noch keine Runde, 's' zum Starten."),
                QuizPhase::Answered => {}
            },
            Input::Start => start(quiz),
            Input::Reset => {
                quiz.reset();
                println!("Runde abgebrochen.");
            }
            Input::Category(category) => match quiz.change_category(category).await {
                Ok(()) => {
                    println!("Kategorie {category}: {} Fragen.", quiz.pool().len());
                    start(quiz);
                }
                Err(err) => println!("{err}"),
            },
            Input::Stats => match quiz.summary() {
                Some(summary) => print_summary(&summary),
                None => println!("Noch keine Runde."),
            },
            Input::Help => print_help(),
            Input::Quit => break,
            Input::Unknown(raw) => println!("Unbekannte Eingabe: {raw}"),
        }
    }

    if let Some(summary) = quiz.summary() {
        print_summary(&summary);
    }
    Ok(())
}
