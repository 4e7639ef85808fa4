use chrono::{Local, Utc};
use clap::Parser;
use colored::Colorize;
use countdown_timer::{
    args::{CLISubcommand, CountdownCLI},
    config::Config,
    dirs,
    error::CountdownError,
    events::{Event, EventStore},
    session::Session,
    storage::FileStorage,
    ticker::Notice,
    time::{format_date, format_time, format_time_component},
    timers::CountdownTimer,
};
use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
};
use tokio::signal;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), CountdownError> {
    tracing_subscriber::fmt::init();

    let args = CountdownCLI::parse();
    let Some(config_root) = args
            .config
            .to_owned()
            .or_else(|| env::var("COUNTDOWN_ROOT").map(PathBuf::from).ok())
            .or_else(|| dirs().map(|d| d.config_local_dir().to_owned()).ok()) else {
            Err(CountdownError::NoProjectDirs)?
        };

    if !config_root.is_dir() {
        fs::create_dir_all(&config_root)?;
    }

    let config = Config::load(&config_root)?;
    let storage = FileStorage::new(Config::storage_dir(&config_root));
    debug!("Using storage at {}", storage.root().display());

    fn show_event(event: &Event, timer: CountdownTimer) {
        let local = event.date.with_timezone(&Local).naive_local();
        let countdown = format!(
            "{}d {}h {}m {}s",
            format_time_component(timer.days),
            format_time_component(timer.hours),
            format_time_component(timer.minutes),
            format_time_component(timer.seconds)
        );

        println!(
            "{}  {} {}  {}  {}",
            event.id.dimmed(),
            format_date(&local),
            format_time(&local),
            if timer.is_zero() {
                countdown.red()
            } else {
                countdown.green()
            },
            event.name.bright_blue()
        );
    }

    match args.command {
        CLISubcommand::List => {
            let mut store = EventStore::with_key(storage, config.storage_key);
            let mut events = store.list().await?.to_vec();
            if events.is_empty() {
                println!("No events yet, add one with `countdown add`");
            }

            events.sort_by_key(|event| event.date);
            let now = Utc::now();
            for event in &events {
                show_event(event, CountdownTimer::until(event.date, now));
            }
        }
        CLISubcommand::Add {
            name,
            date,
            today,
            time,
            clear_time,
        } => {
            let (mut session, _notices) = Session::open(storage, &config).await?;

            let composer = session.composer_mut();
            if today {
                composer.set_today(Local::now().date_naive());
            }
            if let Some(date) = date {
                composer.pick_date(date);
            }
            if let Some(time) = time {
                composer.pick_time(time);
            }
            if clear_time {
                composer.clear_time();
            }

            let result = session.add_composed_event(&name).await;
            session.shutdown().await;

            match result {
                Ok(event) => println!(
                    "Added event {} on {} {}",
                    event.name.bright_blue(),
                    format_date(&event.date.with_timezone(&Local).naive_local()).bright_yellow(),
                    format_time(&event.date.with_timezone(&Local).naive_local()).bright_yellow()
                ),
                Err(CountdownError::Validation(error)) => println!("{}", error.to_string().red()),
                Err(error) => Err(error)?,
            }
        }
        CLISubcommand::Delete { id, yes } => {
            let (mut session, _notices) = Session::open(storage, &config).await?;
            let Some(event) = session.events().iter().find(|event| event.id == id).cloned() else {
                session.shutdown().await;
                println!("No event with id {}", id.bright_yellow());
                return Ok(());
            };

            if !yes && !confirm_delete(&event)? {
                session.shutdown().await;
                println!("Cancelled");
                return Ok(());
            }

            let result = session.delete_event(&event.id).await;
            session.shutdown().await;
            result?;

            println!("Deleted event {}", event.name.bright_blue());
        }
        CLISubcommand::Watch => {
            let (session, mut notices) = Session::open(storage, &config).await?;
            if session.events().is_empty() {
                println!("No events to count down to");
                return Ok(());
            }

            loop {
                tokio::select! {
                    result = signal::ctrl_c() => {
                        result?;
                        break;
                    }
                    notice = notices.recv() => match notice {
                        Some(Notice::Ticked) => {
                            println!();
                            for event in session.events_by_date() {
                                let timer = session.get_timer(&event.id).await.unwrap_or_default();
                                show_event(event, timer);
                            }
                        }
                        Some(Notice::Reached(event)) => {
                            println!("{} {}", "The event has arrived!".bright_red().bold(), event.name.bright_blue());
                        }
                        None => break,
                    }
                }
            }

            session.shutdown().await;
        }
    }

    Ok(())
}

/// Asks on stdin, anything but "y" keeps the event
fn confirm_delete(event: &Event) -> Result<bool, CountdownError> {
    let mut answer = String::new();

    print!(
        "DELETE: {}\nThis action cannot be undone! Continue? [y/N] ",
        event.name.bright_blue()
    );
    io::stdout().flush()?;
    io::stdin().read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
