use clap::Args;
use serde::{Deserialize, Serialize};
use steadystudy_core::{
    busy_from_events, event_drafts, parse_time_expression, BusyInterval, CalendarEvent, Config,
    DayTimeWindow, EventDraft, FreeBlock, PlacedTask, PlanRequest, SchedulableTask,
    StudyPlanner, TimeInterval, UnplacedTask,
};

use super::read_input;

#[derive(Args)]
pub struct PlanArgs {
    /// Plan request JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,
    /// Message to scan for an explicit time such as "from 3 to 5pm"
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Request document accepted on input. Calendar events are merged into
/// the busy list.
#[derive(Deserialize)]
struct PlanInput {
    horizon: TimeInterval,
    #[serde(default)]
    busy: Vec<BusyInterval>,
    #[serde(default)]
    events: Vec<CalendarEvent>,
    tasks: Vec<SchedulableTask>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    time_override: Option<DayTimeWindow>,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    free_blocks: &'a [FreeBlock],
    placed: &'a [PlacedTask],
    unplaced: &'a [UnplacedTask],
    event_drafts: Vec<EventDraft>,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input: PlanInput = serde_json::from_str(&read_input(&args.input)?)?;
    let config = Config::load()?;

    let mut busy = input.busy;
    busy.extend(busy_from_events(&input.events));

    let detected = args
        .message
        .as_deref()
        .and_then(parse_time_expression)
        .map(|expr| {
            tracing::debug!(window = %expr.window, matched = %expr.matched_text, "time override from message");
            expr.window
        });
    let request = PlanRequest {
        horizon: input.horizon,
        busy,
        tasks: input.tasks,
        subject: input.subject,
        time_override: input.time_override.or(detected),
    };

    let planner = StudyPlanner::new(config.study).with_scheduler_config(config.scheduler);
    let plan = planner.plan(&request)?;

    let output = PlanOutput {
        free_blocks: &plan.free_blocks,
        placed: &plan.outcome.placed,
        unplaced: &plan.outcome.unplaced,
        event_drafts: event_drafts(&plan.outcome.placed),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
