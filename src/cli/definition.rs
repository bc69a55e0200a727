use super::list::{ListArgs, OverviewArgs, ReportArgs, TimelineArgs};
use super::task::{AddArgs, EditArgs, ExcludeArgs, RepeatArgs, SubtaskArgs, TargetArgs};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Calendar task trees with recurring tasks and an activity timeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a local .daybook directory in the current directory
    Init,
    /// Show the tasks of a day, recurring occurrences included
    List(ListArgs),
    /// Add a task, optionally repeating
    Add(AddArgs),
    /// Add a subtask under an existing task
    Subtask(SubtaskArgs),
    /// Mark a task completed
    Done(TargetArgs),
    /// Mark a task delegated
    Delegate(TargetArgs),
    /// Mark a task delayed
    Delay(TargetArgs),
    /// Set a task back to todo
    Todo(TargetArgs),
    /// Flip a task between completed and todo
    Toggle(TargetArgs),
    /// Start a task, or un-start it if it is already in progress
    Start(TargetArgs),
    /// Rename a task
    Edit(EditArgs),
    /// Delete a task and its subtasks
    Delete(TargetArgs),
    /// Change or clear the recurrence of a task
    Repeat(RepeatArgs),
    /// Skip one occurrence of a recurring task
    Exclude(ExcludeArgs),
    /// Show (or clear) the activity timeline of a day
    Timeline(TimelineArgs),
    /// Completion stats for every day of a month
    Overview(OverviewArgs),
    /// Write a markdown report for a day
    Report(ReportArgs),
}
