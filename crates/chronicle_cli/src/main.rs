//! CLI driver for the Chronicle core.
//!
//! # Responsibility
//! - Exercise the core end to end against a local SQLite file.
//! - Keep output line-oriented for quick local sanity checks.
//!
//! Usage:
//!   chronicle_cli ping
//!   chronicle_cli add [--date YYYY-MM-DD] <text...>   (date defaults to today)
//!   chronicle_cli edit <id> <text...>
//!   chronicle_cli delete <id>
//!   chronicle_cli clear <YYYY-MM-DD>
//!   chronicle_cli list
//!   chronicle_cli summarize

use chronicle_core::{
    Clock, CoreConfig, DailyNotes, DigestSummaryProvider, Notification, NotificationKind,
    NotificationSink, NoteDate, NoteId, SqliteProvider, SystemClock,
};
use log::debug;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_DB_PATH: &str = "chronicle.sqlite3";
const ENV_DB_PATH: &str = "CHRONICLE_DB";
const ENV_LOG_DIR: &str = "CHRONICLE_LOG_DIR";

struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Info => println!("{}", notification.title),
            NotificationKind::Error => eprintln!("{}", notification.title),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<(), String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(usage());
    };
    if command == "ping" {
        println!("chronicle_core ping={}", chronicle_core::ping());
        println!("chronicle_core version={}", chronicle_core::core_version());
        return Ok(());
    }

    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Ok(log_dir) = std::env::var(ENV_LOG_DIR) {
        chronicle_core::init_logging(&config.log_level, &log_dir)?;
    }
    let db_path = std::env::var(ENV_DB_PATH).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    debug!("event=cli_start module=cli command={command} db_path={db_path}");
    let provider = SqliteProvider::open(&db_path).map_err(|err| err.to_string())?;
    let mut session = DailyNotes::from_config(
        provider,
        StdoutSink,
        Arc::new(DigestSummaryProvider),
        &config,
    );

    match command.as_str() {
        "add" => {
            let (date, words) = split_add_args(rest, &SystemClock)?;
            let note = session
                .create(Some(date), &words.join(" "))
                .map_err(|err| err.to_string())?;
            println!("{} {}", note.id, note.date);
        }
        "edit" => {
            let [id, words @ ..] = rest else {
                return Err(usage());
            };
            session
                .edit(&parse_id(id)?, &words.join(" "))
                .map_err(|err| err.to_string())?;
        }
        "delete" => {
            let [id] = rest else {
                return Err(usage());
            };
            session
                .delete(&parse_id(id)?)
                .map_err(|err| err.to_string())?;
        }
        "clear" => {
            let [date] = rest else {
                return Err(usage());
            };
            let removed = session
                .delete_all_for_date(&parse_date(date)?)
                .map_err(|err| err.to_string())?;
            println!("removed={removed}");
        }
        "list" => {
            for (date, notes) in session.notes().groups().iter_recent_first() {
                println!("{date}");
                for note in notes {
                    println!("  [{}] {}", note.id, note.text.replace('\n', "\n        "));
                }
            }
        }
        "summarize" => {
            session.refresh_summaries().await;
            for (date, state) in session.summaries().entries_recent_first() {
                println!("{date}: {}", state.display_text());
            }
        }
        _ => return Err(usage()),
    }

    session.wait_for_latest_round().await;
    Ok(())
}

/// Splits `add` arguments into the target date and text words.
///
/// Without `--date` the note goes to the clock's current day.
fn split_add_args<'a>(
    rest: &'a [String],
    clock: &dyn Clock,
) -> Result<(NoteDate, &'a [String]), String> {
    match rest {
        [flag, date, words @ ..] if flag == "--date" => Ok((parse_date(date)?, words)),
        words => Ok((clock.today(), words)),
    }
}

fn parse_date(value: &str) -> Result<NoteDate, String> {
    NoteDate::parse(value).map_err(|err| err.to_string())
}

fn parse_id(value: &str) -> Result<NoteId, String> {
    NoteId::parse(value)
}

fn usage() -> String {
    "usage: chronicle_cli <ping|add [--date YYYY-MM-DD] TEXT|edit ID TEXT|delete ID|clear DATE|list|summarize>"
        .to_string()
}
