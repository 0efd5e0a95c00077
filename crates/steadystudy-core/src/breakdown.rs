//! Heuristic assignment decomposition.
//!
//! Picks a phase template from keywords in the assignment title and scales
//! its time estimates by difficulty. The resulting subtasks are already in
//! phase order and convert directly into [`SchedulableTask`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulableTask;

/// How hard the student expects the assignment to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, medium or hard)")),
        }
    }
}

/// Template family chosen from the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Paper,
    ProblemSet,
    General,
}

impl AssignmentKind {
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| title.contains(w));
        if has_any(&["paper", "essay", "report"]) {
            AssignmentKind::Paper
        } else if has_any(&["problem", "homework", "pset"]) {
            AssignmentKind::ProblemSet
        } else {
            AssignmentKind::General
        }
    }

    /// (title, description, phase, base minutes)
    fn template(&self) -> &'static [(&'static str, &'static str, &'static str, i64)] {
        match self {
            AssignmentKind::Paper => &[
                ("Research and collect sources", "Find and read credible sources for the paper", "Research", 180),
                ("Create outline and thesis", "Develop paper structure and main argument", "Research", 60),
                ("Write first draft", "Complete first full draft of the paper", "Drafting", 240),
                ("Revise and edit", "Review, edit, and polish the paper", "Revision", 120),
                ("Final formatting and citations", "Format paper and check all citations", "Revision", 60),
            ],
            AssignmentKind::ProblemSet => &[
                ("Review relevant concepts", "Review course materials and notes", "Preparation", 45),
                ("Solve problems", "Work through all problem set questions", "Execution", 120),
                ("Review and check work", "Double-check solutions and formatting", "Review", 45),
            ],
            AssignmentKind::General => &[
                ("Understand requirements", "Review assignment instructions thoroughly", "Planning", 30),
                ("Complete main work", "Work on the assignment", "Execution", 180),
                ("Review and finalize", "Final review and submission prep", "Review", 60),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub assignment_id: String,
    pub title: String,
    pub description: String,
    pub phase: String,
    pub estimated_minutes: i64,
    pub order_index: u32,
}

impl Subtask {
    /// Schedulable form, due with the assignment.
    pub fn to_schedulable(&self, deadline: Option<DateTime<Utc>>) -> SchedulableTask {
        let mut task = SchedulableTask::new(self.id.clone(), self.estimated_minutes)
            .with_title(self.title.clone())
            .with_phase(self.phase.clone())
            .in_assignment(self.assignment_id.clone(), self.order_index);
        task.deadline = deadline;
        task
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub kind: AssignmentKind,
    pub subtasks: Vec<Subtask>,
    pub total_minutes: i64,
}

impl Breakdown {
    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }

    /// All subtasks as schedulable tasks due at the assignment's due date.
    pub fn schedulable_tasks(&self, due_date: Option<DateTime<Utc>>) -> Vec<SchedulableTask> {
        self.subtasks
            .iter()
            .map(|s| s.to_schedulable(due_date))
            .collect()
    }
}

/// Split an assignment into phase-ordered subtasks.
pub fn break_down(assignment: &Assignment) -> Breakdown {
    let kind = AssignmentKind::from_title(&assignment.title);
    let multiplier = assignment.difficulty.multiplier();

    let subtasks: Vec<Subtask> = kind
        .template()
        .iter()
        .zip(0u32..)
        .map(|(&(title, description, phase, minutes), order_index)| Subtask {
            id: uuid::Uuid::new_v4().to_string(),
            assignment_id: assignment.id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            phase: phase.to_string(),
            estimated_minutes: ((minutes as f64 * multiplier) as i64).max(1),
            order_index,
        })
        .collect();
    let total_minutes = subtasks.iter().map(|s| s.estimated_minutes).sum();

    tracing::debug!(
        assignment = %assignment.id,
        ?kind,
        subtasks = subtasks.len(),
        total_minutes,
        "assignment broken down"
    );
    Breakdown {
        kind,
        subtasks,
        total_minutes,
    }
}
