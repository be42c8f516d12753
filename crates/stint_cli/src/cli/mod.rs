use clap::{Args, Parser, Subcommand};
use stint_core::model::TaskStatus;

#[derive(Parser, Debug)]
#[command(name = "stint", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks
    ///
    /// Example: stint ls
    /// Example: stint ls --all --starts-with deploy
    Ls(LsArgs),
    /// Display a task as its canonical text
    ///
    /// Example: stint show 3
    /// Example: stint show (shows the current task)
    Show {
        identifier: Option<String>,
    },
    /// Create a new task
    ///
    /// Example: stint create "write the report" -e 3 -d "quarterly numbers"
    Create {
        name: String,
        /// Estimate in hours
        #[arg(short, long)]
        estimate: Option<u32>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Start or continue working on a task
    ///
    /// Example: stint workon report
    /// Example: stint workon "new thing" --create -e 2
    Workon {
        identifier: String,
        /// Create the task first if it does not exist
        #[arg(short, long)]
        create: bool,
        /// [Only with --create] Estimate in hours
        #[arg(short, long)]
        estimate: Option<u32>,
        /// [Only with --create] Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Stop working on the current task
    ///
    /// Example: stint stop
    Stop,
    /// Finish a task (defaults to the current task)
    ///
    /// Example: stint finish
    /// Example: stint finish report
    Finish {
        identifier: Option<String>,
    },
    /// Restart a finished task; its progress carries over
    ///
    /// Example: stint restart report
    Restart {
        identifier: String,
    },
    /// Estimate how long a task will take, in hours
    ///
    /// Example: stint estimate 4
    /// Example: stint estimate 4 -t report
    Estimate {
        hours: u32,
        #[arg(short = 't', long = "task")]
        identifier: Option<String>,
    },
    /// Edit a task's text in your editor
    ///
    /// Example: stint edit report
    Edit {
        identifier: Option<String>,
    },
    /// Remove a task
    ///
    /// Example: stint rm report --force
    Rm {
        identifier: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct LsArgs {
    /// List all tasks (short for -citf)
    #[arg(short, long)]
    pub all: bool,
    /// List all open tasks (Current, In Progress, TODO); the default
    #[arg(short, long)]
    pub open: bool,
    /// List all started tasks (Current, In Progress)
    #[arg(short, long)]
    pub started: bool,
    /// List Current tasks
    #[arg(short, long)]
    pub current: bool,
    /// List In Progress tasks
    #[arg(short, long)]
    pub in_progress: bool,
    /// List TODO tasks
    #[arg(short = 't', long)]
    pub todo: bool,
    /// List Finished tasks
    #[arg(short, long)]
    pub finished: bool,
    /// Only tasks whose name starts with STRING
    #[arg(short = 'S', long, value_name = "STRING")]
    pub starts_with: Option<String>,
    /// Only tasks whose name contains STRING
    #[arg(short = 'C', long, value_name = "STRING")]
    pub contains: Option<String>,
}

impl LsArgs {
    /// Statuses selected by the flag combination, in display order. With
    /// no status flag at all, open tasks are listed.
    pub fn statuses(&self) -> Vec<TaskStatus> {
        let mut current = self.current;
        let mut in_progress = self.in_progress;
        let mut todo = self.todo;
        let mut finished = self.finished;

        if self.all {
            (current, in_progress, todo, finished) = (true, true, true, true);
        }
        if self.open {
            (current, in_progress, todo) = (true, true, true);
        }
        if self.started {
            (current, in_progress) = (true, true);
        }
        if !(current || in_progress || todo || finished) {
            (current, in_progress, todo) = (true, true, true);
        }

        let mut statuses = Vec::new();
        if current {
            statuses.push(TaskStatus::Current);
        }
        if in_progress {
            statuses.push(TaskStatus::InProgress);
        }
        if todo {
            statuses.push(TaskStatus::Todo);
        }
        if finished {
            statuses.push(TaskStatus::Finished);
        }
        statuses
    }
}
