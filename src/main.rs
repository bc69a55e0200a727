//! daybook - calendar task trees from the command line

use anyhow::Result;
use clap::Parser;
use daybook::cli::{self, Cli, Commands};
use daybook::domain::TaskState;
use daybook::persistence::init_local_daybook;

fn main() -> Result<()> {
    if std::env::var("DAYBOOK_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter("daybook=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let dir = init_local_daybook()?;
            println!("Initialized daybook directory: {}", dir.display());
            println!();
            println!("Daybook will now use this local directory for its data.");
            Ok(())
        }
        Commands::List(args) => cli::list::run_list(args),
        Commands::Add(args) => cli::task::run_add(args),
        Commands::Subtask(args) => cli::task::run_subtask(args),
        Commands::Done(args) => cli::task::run_state(args, TaskState::Completed),
        Commands::Delegate(args) => cli::task::run_state(args, TaskState::Delegated),
        Commands::Delay(args) => cli::task::run_state(args, TaskState::Delayed),
        Commands::Todo(args) => cli::task::run_state(args, TaskState::Todo),
        Commands::Toggle(args) => cli::task::run_toggle(args),
        Commands::Start(args) => cli::task::run_start(args),
        Commands::Edit(args) => cli::task::run_edit(args),
        Commands::Delete(args) => cli::task::run_delete(args),
        Commands::Repeat(args) => cli::task::run_repeat(args),
        Commands::Exclude(args) => cli::task::run_exclude(args),
        Commands::Timeline(args) => cli::list::run_timeline(args),
        Commands::Overview(args) => cli::list::run_overview(args),
        Commands::Report(args) => cli::list::run_report(args),
    }
}
