use chrono::{DateTime, Utc};
use clap::Args;
use steadystudy_core::{break_down, Assignment, Difficulty};

#[derive(Args)]
pub struct BreakdownArgs {
    /// Assignment title, e.g. "History essay"
    pub title: String,
    /// Assignment id; defaults to the title
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    /// easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,
    /// Due date (RFC 3339)
    #[arg(long)]
    pub due: Option<DateTime<Utc>>,
    /// Emit subtasks in the schedulable task format
    #[arg(long)]
    pub tasks: bool,
}

pub fn run(args: BreakdownArgs) -> Result<(), Box<dyn std::error::Error>> {
    let assignment = Assignment {
        id: args.id.unwrap_or_else(|| args.title.clone()),
        title: args.title,
        subject: args.subject,
        difficulty: args.difficulty,
        due_date: args.due,
    };
    let breakdown = break_down(&assignment);

    let json = if args.tasks {
        serde_json::to_string_pretty(&breakdown.schedulable_tasks(assignment.due_date))?
    } else {
        serde_json::to_string_pretty(&breakdown)?
    };
    println!("{json}");
    Ok(())
}
