use std::error::Error;

use cancelwatch_core::orders::trackables;
use cancelwatch_core::{build_rows, Config, CountdownTracker};
use clap::Args;

use super::render::{print_json, print_rows};
use super::source::{runtime, OrderSource};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: OrderSource,
    /// Print rows as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatusArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let lines = runtime()?.block_on(args.source.load(config))?;

    let mut tracker = CountdownTracker::new();
    let event = tracker.initialize(&trackables(&lines));
    tracing::debug!("{:?}", event);

    let rows = build_rows(&lines, &tracker);
    if args.json {
        print_json(&rows)?;
    } else {
        print_rows(&rows);
    }
    Ok(())
}
