//! Live countdown view.
//!
//! Mounting the view creates a session; leaving it (all windows closed,
//! Ctrl-C, or an error) drops the session, which releases the ticker.

use std::error::Error;

use cancelwatch_core::orders::trackables;
use cancelwatch_core::{build_rows, Config, CountdownSession};
use clap::Args;

use super::render::{print_json, print_rows};
use super::source::{runtime, OrderSource};

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: OrderSource,
    /// Print each snapshot as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WatchArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    runtime()?.block_on(async {
        let lines = args.source.load(config).await?;

        let mut session = CountdownSession::new(config.tick_period())?;
        let mut updates = session.subscribe();
        for event in session.initialize(&trackables(&lines)) {
            tracing::debug!("{:?}", event);
        }

        let render = |session: &CountdownSession| -> Result<(), Box<dyn Error>> {
            if args.json {
                print_json(&session.snapshot())?;
            } else {
                print_rows(&session.with_tracker(|t| build_rows(&lines, t)));
                println!();
            }
            Ok(())
        };

        let _ = updates.borrow_and_update();
        render(&session)?;

        while session.is_ticking() {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let _ = updates.borrow_and_update();
                    render(&session)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted");
                    break;
                }
            }
        }

        if let Some(event) = session.stop() {
            tracing::debug!("{:?}", event);
        }
        Ok::<(), Box<dyn Error>>(())
    })
}
