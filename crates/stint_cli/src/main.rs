use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use stint_cli::cli::{Cli, Command, LsArgs};
use stint_core::config::{self, Config, Palette};
use stint_core::error::AppError;
use stint_core::model::{Task, TaskStatus};
use stint_core::progress::elapsed_seconds;
use stint_core::task_api;
use stint_core::timefmt::{encode_duration, encode_timestamp};
use tabled::Tabled;
use tabled::settings::Style;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ESTIMATE")]
    estimate: String,
    #[tabled(rename = "PROGRESS")]
    progress: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LAST MODIFIED")]
    last_modified: String,
}

fn task_row(task: &Task, now: i64) -> Result<TaskRow, AppError> {
    Ok(TaskRow {
        id: task.id,
        name: task.name.clone(),
        estimate: task.estimate_display(),
        progress: encode_duration(elapsed_seconds(&task.history, now)),
        status: task.status.label().to_string(),
        last_modified: encode_timestamp(task.last_modified)?,
    })
}

fn print_tasks_table(tasks: &[Task], palette: &Palette) -> Result<(), AppError> {
    let now = task_api::now_epoch();
    let rows = tasks
        .iter()
        .map(|task| task_row(task, now))
        .collect::<Result<Vec<_>, _>>()?;

    let rendered = tabled::Table::new(rows).with(Style::blank()).to_string();

    // Style::blank emits the header on the first line and one line per
    // task after it, which keeps row coloring a plain index lookup.
    for (index, line) in rendered.lines().enumerate() {
        let status = index
            .checked_sub(1)
            .and_then(|row| tasks.get(row))
            .map(|task| task.status);
        let painted = match status {
            Some(TaskStatus::Current) => palette.paint_current(line),
            Some(TaskStatus::InProgress) => palette.paint_in_progress(line),
            _ => line.to_string(),
        };
        println!("{painted}");
    }

    Ok(())
}

fn print_tasks_json(tasks: &[Task]) -> Result<(), AppError> {
    let now = task_api::now_epoch();
    let mut payload = Vec::with_capacity(tasks.len());
    for task in tasks {
        let seconds = elapsed_seconds(&task.history, now);
        payload.push(serde_json::json!({
            "id": task.id,
            "name": task.name,
            "estimate": task.estimate,
            "progress_seconds": seconds,
            "progress": encode_duration(seconds),
            "status": task.status.label(),
            "last_modified": encode_timestamp(task.last_modified)?,
        }));
    }
    println!("{}", serde_json::Value::Array(payload));
    Ok(())
}

fn task_json(task: &Task) -> Result<serde_json::Value, AppError> {
    let history = task
        .history
        .iter()
        .map(|event| {
            Ok(serde_json::json!({
                "kind": if event.is_start { "Start" } else { "Stop" },
                "time": encode_timestamp(event.time)?,
            }))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(serde_json::json!({
        "id": task.id,
        "name": task.name,
        "estimate": task.estimate,
        "description": task.description,
        "status": task.status.label(),
        "last_modified": encode_timestamp(task.last_modified)?,
        "history": history,
    }))
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", task_json(task)?);
    Ok(())
}

fn confirm_removal(task: &Task) -> Result<bool, AppError> {
    print!("Remove '{}'? [y/N] ", task.name);
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;
    let answer = answer.trim();

    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn edit_workflow(identifier: Option<&str>, config: &Config) -> Result<Task, AppError> {
    let task = task_api::get_task(identifier)?;
    let seed = task_api::render_task(&task)?;

    let buffer_path = edit_buffer_path(task.id);
    std::fs::write(&buffer_path, seed + "\n").map_err(|err| AppError::io(err.to_string()))?;

    let result = run_editor(&buffer_path, config).and_then(|_| {
        std::fs::read_to_string(&buffer_path).map_err(|err| AppError::io(err.to_string()))
    });
    std::fs::remove_file(&buffer_path).ok();
    let buffer = result?;

    // Parse and validate gate the edit; a bad buffer leaves the task
    // untouched and surfaces the reason.
    let id = task.id.to_string();
    task_api::replace_task_from_text(Some(&id), &buffer)
}

fn edit_buffer_path(task_id: u64) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("stint-edit-{task_id}-{nanos}.task"))
}

fn run_editor(path: &std::path::Path, config: &Config) -> Result<(), AppError> {
    let editor = config::resolve_editor(config);
    let mut words = editor.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| AppError::invalid_data("editor command is empty"))?;

    let status = std::process::Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .map_err(|err| AppError::io(format!("failed to launch editor '{editor}': {err}")))?;

    if !status.success() {
        return Err(AppError::io(format!(
            "editor '{editor}' exited with failure; edit discarded"
        )));
    }

    Ok(())
}

fn run_ls(args: &LsArgs, json: bool, palette: &Palette) -> Result<(), AppError> {
    let query = task_api::TaskQuery {
        statuses: args.statuses(),
        starts_with: args.starts_with.clone(),
        contains: args.contains.clone(),
    };
    let tasks = task_api::list_tasks(&query)?;

    if json {
        print_tasks_json(&tasks)
    } else {
        print_tasks_table(&tasks, palette)
    }
}

fn run_command(cli: Cli, config: &Config, palette: &Palette) -> Result<(), AppError> {
    match cli.command {
        Command::Ls(args) => run_ls(&args, cli.json, palette)?,
        Command::Show { identifier } => {
            let task = task_api::get_task(identifier.as_deref())?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("{}", task_api::render_task(&task)?);
            }
        }
        Command::Create {
            name,
            estimate,
            description,
        } => {
            let task = task_api::create_task(&name, estimate, description.as_deref())?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Created task: {} ({})", task.name, task.id);
            }
        }
        Command::Workon {
            identifier,
            create,
            estimate,
            description,
        } => {
            let task = if create {
                let existing = match task_api::get_task(Some(&identifier)) {
                    Ok(task) => Some(task),
                    Err(AppError::NotFound(_)) => None,
                    Err(err) => return Err(err),
                };
                let target = match existing {
                    Some(task) if task.name == identifier => task,
                    // The identifier prefix-matched a different task;
                    // --create asks for a task with exactly this name.
                    _ => task_api::create_task(&identifier, estimate, description.as_deref())?,
                };
                task_api::workon_task(&target.id.to_string())?
            } else {
                task_api::workon_task(&identifier)?
            };
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Started working on: {} ({})", task.name, task.id);
            }
        }
        Command::Stop => {
            let task = task_api::stop_current_task()?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Stopped working on: {} ({})", task.name, task.id);
            }
        }
        Command::Finish { identifier } => {
            let task = task_api::finish_task(identifier.as_deref())?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Finished: {} ({})", task.name, task.id);
            }
        }
        Command::Restart { identifier } => {
            let task = task_api::restart_task(&identifier)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Restarted: {} ({})", task.name, task.id);
            }
        }
        Command::Estimate { hours, identifier } => {
            let task = task_api::estimate_task(identifier.as_deref(), hours)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!(
                    "Estimated {} ({}) at {}",
                    task.name,
                    task.id,
                    task.estimate_display()
                );
            }
        }
        Command::Edit { identifier } => {
            let task = edit_workflow(identifier.as_deref(), config)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.name, task.id);
            }
        }
        Command::Rm { identifier, force } => {
            if !force {
                let task = task_api::get_task(Some(&identifier))?;
                if !confirm_removal(&task)? {
                    println!("Kept task: {} ({})", task.name, task.id);
                    return Ok(());
                }
            }
            let task = task_api::remove_task(&identifier)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Removed task: {} ({})", task.name, task.id);
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits an interactive command line into arguments. Both quote styles
/// group words; a backslash escapes the next character inside double
/// quotes and outside quotes.
fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    #[derive(PartialEq)]
    enum Mode {
        Bare,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut has_token = false;
    let mut mode = Mode::Bare;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::Bare => match ch {
                '\'' => {
                    mode = Mode::Single;
                    has_token = true;
                }
                '"' => {
                    mode = Mode::Double;
                    has_token = true;
                }
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| AppError::invalid_input("dangling escape in command"))?;
                    current.push(escaped);
                    has_token = true;
                }
                ch if ch.is_whitespace() => {
                    if has_token {
                        args.push(std::mem::take(&mut current));
                        has_token = false;
                    }
                }
                ch => {
                    current.push(ch);
                    has_token = true;
                }
            },
            Mode::Single => match ch {
                '\'' => mode = Mode::Bare,
                ch => current.push(ch),
            },
            Mode::Double => match ch {
                '"' => mode = Mode::Bare,
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| AppError::invalid_input("dangling escape in command"))?;
                    if escaped != '"' && escaped != '\\' {
                        current.push('\\');
                    }
                    current.push(escaped);
                }
                ch => current.push(ch),
            },
        }
    }

    if mode != Mode::Bare {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if has_token {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive(config: &Config, palette: &Palette) -> Result<(), AppError> {
    let mut input = String::new();

    loop {
        input.clear();
        // No long-lived stdin lock: the rm confirmation prompt reads from
        // stdin too.
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("stint".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, config, palette) {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn main() {
    let config_load = config::load_config_with_fallback();
    if let Some(err) = &config_load.error {
        eprintln!("WARNING: {err}");
    }
    let config = config_load.config;
    let palette = config::palette_for_theme(config.theme.as_deref());

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&config, &palette) {
            eprintln!("ERROR: {err}");
            std::process::exit(err.exit_status());
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap handles --help/--version by "erroring" with the text.
            if err.use_stderr() {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
            err.print().ok();
            return;
        }
    };

    if let Err(err) = run_command(cli, &config, &palette) {
        eprintln!("ERROR: {err}");
        std::process::exit(err.exit_status());
    }
}

#[cfg(test)]
mod tests {
    use super::split_command_line;

    #[test]
    fn splits_bare_words() {
        let args = split_command_line("workon  report").unwrap();
        assert_eq!(args, vec!["workon", "report"]);
    }

    #[test]
    fn quotes_group_words() {
        let args = split_command_line("create \"write the report\" -e 3").unwrap();
        assert_eq!(args, vec!["create", "write the report", "-e", "3"]);

        let args = split_command_line("create 'write the report'").unwrap();
        assert_eq!(args, vec!["create", "write the report"]);
    }

    #[test]
    fn empty_quotes_produce_empty_argument() {
        let args = split_command_line("create \"\"").unwrap();
        assert_eq!(args, vec!["create", ""]);
    }

    #[test]
    fn escapes_inside_double_quotes() {
        let args = split_command_line(r#"create "say \"hi\"""#).unwrap();
        assert_eq!(args, vec!["create", "say \"hi\""]);
    }

    #[test]
    fn rejects_unterminated_quote() {
        let err = split_command_line("create \"oops").unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let err = split_command_line("create 'oops").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn rejects_dangling_escape() {
        assert!(split_command_line("create oops\\").is_err());
    }
}
