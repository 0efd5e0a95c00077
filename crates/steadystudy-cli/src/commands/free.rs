use clap::Args;
use steadystudy_core::{find_free_blocks, AvailabilityConstraint};

use super::read_input;

#[derive(Args)]
pub struct FreeArgs {
    /// Constraint JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,
    /// Override the minimum block length in minutes
    #[arg(long)]
    pub min: Option<u32>,
}

pub fn run(args: FreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut constraint: AvailabilityConstraint = serde_json::from_str(&read_input(&args.input)?)?;
    if let Some(min) = args.min {
        constraint.min_duration_minutes = min;
    }

    let blocks = find_free_blocks(&constraint);
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
