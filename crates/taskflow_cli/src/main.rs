use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use taskflow_cli::cli::{Cli, Command, collect_config_overrides};
use taskflow_cli::{logging, render};
use taskflow_core::app::{App, NoticeKind, Outcome, UiEvent};
use taskflow_core::clock::SystemClock;
use taskflow_core::config::{self, Config, merge_overrides};
use taskflow_core::error::AppError;
use taskflow_core::model::ISO_DATE;
use taskflow_core::storage::JsonFileStorage;
use taskflow_core::task_store::TaskStore;
use tracing::warn;

struct Session {
    app: App<JsonFileStorage, SystemClock>,
    last_tick: Instant,
}

impl Session {
    fn open(config: &Config) -> Result<Self, AppError> {
        let storage = JsonFileStorage::from_env()?;
        let store = TaskStore::open(storage, SystemClock);
        let app = App::new(store, config.initial_filter()?);

        Ok(Self {
            app,
            last_tick: Instant::now(),
        })
    }

    /// Lets deferred actions catch up with wall-clock time.
    fn catch_up(&mut self) {
        let elapsed = self.last_tick.elapsed();
        self.last_tick = Instant::now();
        self.app.handle(UiEvent::Tick(elapsed));
    }

    fn flush_notices(&mut self, json: bool) {
        for notice in self.app.drain_notices() {
            if json || notice.kind == NoticeKind::Error {
                continue;
            }
            println!("{}", render::notice_line(&notice));
        }
    }
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "ignoring unreadable config");
    }

    let overrides = collect_config_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Config overrides and log levels are fixed when a session starts.
fn reject_session_flags(cli: &Cli) -> Result<(), AppError> {
    if !cli.config_override.is_empty() {
        return Err(AppError::invalid_input(
            "--config-override only applies to one-shot commands",
        ));
    }
    if cli.verbose > 0 || cli.quiet > 0 {
        return Err(AppError::invalid_input(
            "-v/-q only apply to one-shot commands; use RUST_LOG for the session",
        ));
    }
    Ok(())
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn confirm(message: &str, input: &mut dyn BufRead, json: bool) -> Result<bool, AppError> {
    if json {
        eprint!("{message} [y/N] ");
        io::stderr()
            .flush()
            .map_err(|err| AppError::io(err.to_string()))?;
    } else {
        print!("{message} [y/N] ");
        io::stdout()
            .flush()
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;
    if !json {
        println!();
    }

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn run_command(cli: Cli, session: &mut Session, input: &mut dyn BufRead) -> Result<(), AppError> {
    let app = &mut session.app;

    match cli.command {
        Command::Add { text, due } => {
            let due_date = match due {
                Some(value) => value,
                None => app
                    .store()
                    .today()
                    .format(ISO_DATE)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?,
            };

            match app.handle(UiEvent::Submit {
                text: text.unwrap_or_default(),
                due_date,
            }) {
                Outcome::Added(task) => {
                    if cli.json {
                        println!("{}", render::task_json(&task));
                    } else {
                        println!("Added task: {} ({})", task.text, task.id);
                    }
                }
                Outcome::Rejected(err) => return Err(err.into()),
                _ => {}
            }
        }
        Command::List { filter } => {
            if let Some(filter) = filter {
                app.handle(UiEvent::SelectFilter(filter));
            }

            let screen = app.screen();
            if cli.json {
                println!("{}", render::screen_json(&screen));
            } else {
                println!("{}", render::render_screen(&screen));
            }
        }
        Command::Toggle { id } => {
            app.handle(UiEvent::Toggle(id));
            match app.store().get(id) {
                Some(task) if cli.json => println!("{}", render::task_json(task)),
                Some(task) if task.completed => {
                    println!("Completed task: {} ({})", task.text, task.id)
                }
                Some(task) => println!("Reopened task: {} ({})", task.text, task.id),
                None if cli.json => println!("null"),
                None => println!("No task with id {id}"),
            }
        }
        Command::Delete { id } => {
            let target = app.store().get(id).cloned();
            app.handle(UiEvent::Delete(id));
            match target {
                Some(task) if cli.json => println!("{}", render::task_json(&task)),
                Some(task) => println!("Deleting task: {} ({})", task.text, task.id),
                None if cli.json => println!("null"),
                None => println!("No task with id {id}"),
            }
        }
        Command::ClearCompleted { yes } => {
            let cleared = match app.handle(UiEvent::RequestClearCompleted) {
                Outcome::ConfirmationRequired(prompt) => {
                    let confirmed = yes || confirm(&prompt.message(), input, cli.json)?;
                    app.handle(UiEvent::ConfirmClear(confirmed));
                    if !confirmed && !cli.json {
                        println!("Cancelled.");
                    }
                    if confirmed { prompt.count } else { 0 }
                }
                _ => 0,
            };

            if cli.json {
                println!("{}", serde_json::json!({ "cleared": cleared }));
            }
        }
        Command::Stats => {
            let stats = app.screen().list.stats;
            if cli.json {
                println!("{}", render::stats_json(&stats));
            } else {
                println!("{}", render::stats_line(&stats));
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let config = load_config(&[])?;
    let mut session = Session::open(&config)?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        session.catch_up();

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let expanded = config.expand_alias(line);
        let line = expanded.as_deref().unwrap_or(line);

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskflow".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = reject_session_flags(&cli) {
            eprintln!("ERROR: {}", err);
            continue;
        }

        let json = cli.json;
        if let Err(err) = run_command(cli, &mut session, &mut stdin_lock) {
            eprintln!("ERROR: {}", err);
        }
        session.flush_notices(json);
    }

    session.app.settle();
    session.flush_notices(false);

    Ok(())
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    logging::init_tracing(cli.verbose, cli.quiet)?;
    let config = load_config(&cli.config_override)?;
    let mut session = Session::open(&config)?;
    let json = cli.json;

    let result = run_command(cli, &mut session, &mut io::stdin().lock());
    session.app.settle();
    session.flush_notices(json);
    result
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) =
            logging::init_tracing(0, 0).and_then(|()| run_interactive())
        {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
