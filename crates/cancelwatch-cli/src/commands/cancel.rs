use std::error::Error;
use std::io::{BufRead, Write};

use cancelwatch_core::orders::trackables;
use cancelwatch_core::{format_remaining, ClientError, Config, CountdownTracker};
use clap::Args;

use super::source::{client, runtime, OrderSource};

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Order id to cancel
    pub order_id: String,
    #[command(flatten)]
    pub source: OrderSource,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

fn confirm() -> std::io::Result<bool> {
    print!("Are you sure to cancel this order? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn run(args: CancelArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    runtime()?.block_on(async {
        let lines = args.source.load(config).await?;
        let line = lines
            .iter()
            .find(|l| l.order_id == args.order_id)
            .ok_or_else(|| ClientError::OrderNotFound(args.order_id.clone()))?;

        let items = trackables(&lines);
        let mut tracker = CountdownTracker::new();
        tracker.initialize(&items);
        if !tracker.is_action_allowed(&line.order_id, line.status.action_already_resolved()) {
            return Err(ClientError::WindowClosed {
                order_id: line.order_id.clone(),
            }
            .into());
        }

        println!(
            "{} ({}) -- time left to cancel: {}",
            line.order_id,
            line.product_name,
            format_remaining(tracker.remaining(&line.order_id))
        );
        if !args.yes && !confirm()? {
            println!("Not cancelled");
            return Ok(());
        }

        // The prompt may have outlasted the window.
        tracker.initialize(&items);
        client(config)?.cancel_within_window(line, &tracker).await?;
        println!("Order {} cancelled", line.order_id);
        Ok::<(), Box<dyn Error>>(())
    })
}
