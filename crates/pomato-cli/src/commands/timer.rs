use std::io::Write as _;
use std::time::Duration;

use clap::Subcommand;
use pomato_core::{Config, Database, Event, Session};

use crate::notify::NotifyCue;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work interval
    Work,
    /// Start a rest interval
    Rest {
        /// Take the long rest instead of the short one
        #[arg(long)]
        long: bool,
    },
    /// Pause or resume the current interval
    Toggle,
    /// Print the current session state as JSON
    Status,
    /// Reset the session to idle
    Reset,
    /// Run the clock in the foreground, ticking once per second
    Watch,
}

fn open_session() -> Result<Session<NotifyCue>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let cue = NotifyCue::new(config.notifications.clone());
    let mut session = Session::open(config.plan(), db, cue);
    // Apply wall-clock time elapsed since the previous invocation.
    session.catch_up();
    Ok(session)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;

    match action {
        TimerAction::Work => {
            let event = session.start_work();
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Rest { long } => {
            let event = session.start_rest(long);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Toggle => match session.toggle_running() {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{}", serde_json::to_string_pretty(&session.snapshot())?),
        },
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
        TimerAction::Reset => {
            let event = session.reset();
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Watch => {
            session = watch(session)?;
        }
    }

    session.save()?;
    Ok(())
}

/// Foreground clock: a 1 Hz interval drives `tick()` until ctrl-c.
/// Ticks are no-ops while paused, so the interval itself never needs
/// rescheduling.
fn watch(mut session: Session<NotifyCue>) -> Result<Session<NotifyCue>, Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; consume it.
        interval.tick().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(event) = session.tick() {
                        println!();
                        println!("{}", serde_json::to_string_pretty(&event)?);
                    }
                    print_status_line(&session.snapshot());
                }
                _ = &mut ctrl_c => {
                    println!();
                    break;
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(session)
}

fn print_status_line(snapshot: &Event) {
    if let Event::StateSnapshot {
        phase,
        running,
        clock,
        ..
    } = snapshot
    {
        let paused = if *running { "" } else { " (paused)" };
        print!("\r{clock} [{phase}]{paused}   ");
        let _ = std::io::stdout().flush();
    }
}
