use crate::error::AppError;
use crate::model::{HistoryEvent, Task, TaskStatus};
use crate::storage::json_store;
use crate::text::{self, TaskRecord};
use std::cmp::Reverse;
use std::path::Path;
use time::OffsetDateTime;

/// Filters for [`list_tasks`]; empty/None fields match everything.
#[derive(Debug, Default, Clone)]
pub struct TaskQuery {
    pub statuses: Vec<TaskStatus>,
    pub starts_with: Option<String>,
    pub contains: Option<String>,
}

/// The clock enters the API here, once per command; everything below the
/// API boundary takes explicit timestamps.
pub fn now_epoch() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub fn create_task(
    name: &str,
    estimate: Option<u32>,
    description: Option<&str>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    create_task_with_path(&path, name, estimate, description, now_epoch())
}

pub fn get_task(identifier: Option<&str>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, identifier)
}

pub fn current_task() -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, None)
}

pub fn list_tasks(query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path, query)
}

pub fn workon_task(identifier: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    workon_task_with_path(&path, identifier, now_epoch())
}

pub fn restart_task(identifier: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    restart_task_with_path(&path, identifier, now_epoch())
}

pub fn stop_current_task() -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    stop_current_task_with_path(&path, now_epoch())
}

pub fn finish_task(identifier: Option<&str>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    finish_task_with_path(&path, identifier, now_epoch())
}

pub fn estimate_task(identifier: Option<&str>, hours: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    estimate_task_with_path(&path, identifier, hours, now_epoch())
}

pub fn remove_task(identifier: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    remove_task_with_path(&path, identifier)
}

/// Canonical text for a task, both for display and as the seed buffer the
/// `edit` workflow hands to the editor.
pub fn render_task(task: &Task) -> Result<String, AppError> {
    text::render(&TaskRecord::from_task(task))
}

/// Accepts an edited text buffer as the task's new definition.
///
/// The buffer goes through parse then validate; on any error the store is
/// left untouched and the error propagates unchanged for the caller to
/// surface. On success the task keeps its id and takes every text-carried
/// field, history included, from the buffer.
pub fn replace_task_from_text(identifier: Option<&str>, buffer: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    replace_task_from_text_with_path(&path, identifier, buffer, now_epoch())
}

fn create_task_with_path(
    path: &Path,
    name: &str,
    estimate: Option<u32>,
    description: Option<&str>,
    now: i64,
) -> Result<Task, AppError> {
    // Names and descriptions must survive a render -> parse round trip,
    // so they are held to the grammar's phrase rule up front.
    let name = text::normalize_phrase(name)
        .map_err(|err| AppError::invalid_input(format!("name {}", err.message())))?;
    let description = match description {
        Some(value) => Some(
            text::normalize_phrase(value)
                .map_err(|err| AppError::invalid_input(format!("description {}", err.message())))?,
        ),
        None => None,
    };
    if estimate == Some(0) {
        return Err(AppError::invalid_input(
            "estimate must be a positive number of hours",
        ));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = Task {
        id: json_store::allocate_id(&tasks),
        name,
        estimate,
        description,
        status: TaskStatus::Todo,
        last_modified: now,
        history: Vec::new(),
    };
    tasks.push(task.clone());
    json_store::save_tasks(path, &tasks)?;

    Ok(task)
}

fn get_task_with_path(path: &Path, identifier: Option<&str>) -> Result<Task, AppError> {
    let tasks = json_store::load_tasks(path)?;
    let index = resolve_target(&tasks, identifier)?;
    Ok(tasks[index].clone())
}

fn list_tasks_with_path(path: &Path, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let tasks = json_store::load_tasks(path)?;
    let mut filtered: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            (query.statuses.is_empty() || query.statuses.contains(&task.status))
                && query
                    .starts_with
                    .as_deref()
                    .is_none_or(|prefix| task.name.starts_with(prefix))
                && query
                    .contains
                    .as_deref()
                    .is_none_or(|needle| task.name.contains(needle))
        })
        .collect();

    filtered.sort_by_key(|task| (task.status.sort_rank(), Reverse(task.last_modified)));
    Ok(filtered)
}

fn workon_task_with_path(path: &Path, identifier: &str, now: i64) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let target = find_task(&tasks, identifier, None)?;
    start_working(&mut tasks, target, now)?;
    json_store::save_tasks(path, &tasks)?;
    Ok(tasks[target].clone())
}

fn restart_task_with_path(path: &Path, identifier: &str, now: i64) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let target = find_task(&tasks, identifier, Some(&[TaskStatus::Finished]))?;
    start_working(&mut tasks, target, now)?;
    json_store::save_tasks(path, &tasks)?;
    Ok(tasks[target].clone())
}

fn stop_current_task_with_path(path: &Path, now: i64) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let index = current_index(&tasks)?.ok_or_else(no_current_task)?;

    append_event(&mut tasks[index], false, now);
    tasks[index].status = TaskStatus::InProgress;
    tasks[index].last_modified = now;
    json_store::save_tasks(path, &tasks)?;

    Ok(tasks[index].clone())
}

fn finish_task_with_path(
    path: &Path,
    identifier: Option<&str>,
    now: i64,
) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let index = resolve_target(&tasks, identifier)?;

    match tasks[index].status {
        TaskStatus::Finished => {
            return Err(AppError::invalid_input("task is already finished"));
        }
        TaskStatus::Todo => {
            return Err(AppError::invalid_input(
                "cannot finish a task that was never worked on",
            ));
        }
        TaskStatus::Current => append_event(&mut tasks[index], false, now),
        TaskStatus::InProgress => {}
    }

    tasks[index].status = TaskStatus::Finished;
    tasks[index].last_modified = now;
    json_store::save_tasks(path, &tasks)?;

    Ok(tasks[index].clone())
}

fn estimate_task_with_path(
    path: &Path,
    identifier: Option<&str>,
    hours: u32,
    now: i64,
) -> Result<Task, AppError> {
    if hours == 0 {
        return Err(AppError::invalid_input(
            "estimate must be a positive number of hours",
        ));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let index = resolve_target(&tasks, identifier)?;
    tasks[index].estimate = Some(hours);
    tasks[index].last_modified = now;
    json_store::save_tasks(path, &tasks)?;

    Ok(tasks[index].clone())
}

fn remove_task_with_path(path: &Path, identifier: &str) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let index = find_task(&tasks, identifier, None)?;
    let removed = tasks.remove(index);
    json_store::save_tasks(path, &tasks)?;

    Ok(removed)
}

fn replace_task_from_text_with_path(
    path: &Path,
    identifier: Option<&str>,
    buffer: &str,
    now: i64,
) -> Result<Task, AppError> {
    let record = text::parse(buffer)?;
    text::validate(&record)?;

    let mut tasks = json_store::load_tasks(path)?;
    let index = resolve_target(&tasks, identifier)?;
    let task = &mut tasks[index];
    task.name = record.name;
    task.estimate = record.estimate;
    task.description = record.description;
    task.status = record.status;
    task.history = record.history;
    task.last_modified = now;

    let replaced = task.clone();
    json_store::save_tasks(path, &tasks)?;

    Ok(replaced)
}

/// Marks `target` as the task being worked on: whatever was Current gets a
/// stop event and drops to In Progress, the target gets a start event.
fn start_working(tasks: &mut [Task], target: usize, now: i64) -> Result<(), AppError> {
    if let Some(current) = current_index(tasks)? {
        if current == target {
            return Err(AppError::already_working(format!(
                "already working on '{}'",
                tasks[target].name
            )));
        }
        append_event(&mut tasks[current], false, now);
        tasks[current].status = TaskStatus::InProgress;
        tasks[current].last_modified = now;
    }

    append_event(&mut tasks[target], true, now);
    tasks[target].status = TaskStatus::Current;
    tasks[target].last_modified = now;
    Ok(())
}

/// Appends a history event, nudging the timestamp forward if the task
/// already has an event at or after `now` (two commands inside one second,
/// or a clock that stepped back). Stored histories must keep strictly
/// increasing times.
fn append_event(task: &mut Task, is_start: bool, now: i64) {
    let time = match task.history.last() {
        Some(last) if last.time >= now => last.time + 1,
        _ => now,
    };
    task.history.push(HistoryEvent { is_start, time });
}

fn resolve_target(tasks: &[Task], identifier: Option<&str>) -> Result<usize, AppError> {
    match identifier {
        Some(identifier) => find_task(tasks, identifier, None),
        None => current_index(tasks)?.ok_or_else(no_current_task),
    }
}

/// Resolves a task identifier: all digits looks up by id, anything else by
/// name prefix. Exactly one task must match.
fn find_task(
    tasks: &[Task],
    identifier: &str,
    statuses: Option<&[TaskStatus]>,
) -> Result<usize, AppError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::invalid_input("a task identifier is required"));
    }

    let allowed =
        |task: &Task| statuses.is_none_or(|statuses| statuses.contains(&task.status));
    let numeric = identifier.bytes().all(|byte| byte.is_ascii_digit());

    let mut matches = tasks.iter().enumerate().filter(|&(_, task)| {
        allowed(task)
            && if numeric {
                identifier.parse::<u64>() == Ok(task.id)
            } else {
                task.name.starts_with(identifier)
            }
    });

    let Some((index, _)) = matches.next() else {
        return Err(AppError::not_found(format!(
            "could not find a task for identifier '{identifier}'"
        )));
    };

    if matches.next().is_some() {
        return Err(AppError::ambiguous(format!(
            "found multiple tasks for identifier '{identifier}'"
        )));
    }

    Ok(index)
}

fn current_index(tasks: &[Task]) -> Result<Option<usize>, AppError> {
    let mut found = None;
    for (index, task) in tasks.iter().enumerate() {
        if task.status == TaskStatus::Current {
            if found.is_some() {
                return Err(AppError::invalid_data(
                    "store holds more than one Current task",
                ));
            }
            found = Some(index);
        }
    }
    Ok(found)
}

fn no_current_task() -> AppError {
    AppError::no_current_task("no task is currently being worked on")
}
