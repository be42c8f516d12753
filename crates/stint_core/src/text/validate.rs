use crate::error::AppError;
use crate::model::TaskStatus;
use crate::text::TaskRecord;

/// Gates a parsed record against the history state-machine invariants.
///
/// Checks run in a fixed order and the first violation aborts:
/// status/history coherence, then the terminal event kind, then a single
/// left-to-right scan enforcing strictly increasing timestamps and strict
/// Start/Stop alternation beginning with a Start. The record is never
/// mutated or repaired.
pub fn validate(record: &TaskRecord) -> Result<(), AppError> {
    if record.status == TaskStatus::Todo {
        if !record.history.is_empty() {
            return Err(AppError::validation(
                "a task cannot have a history if its status is TODO",
            ));
        }
    } else if record.history.is_empty() {
        return Err(AppError::validation(format!(
            "a task must have a history if its status is {}",
            record.status.label()
        )));
    }

    if let Some(last) = record.history.last() {
        match record.status {
            TaskStatus::Current => {
                if !last.is_start {
                    return Err(AppError::validation(
                        "the last history record must be a Start if the status is Current",
                    ));
                }
            }
            TaskStatus::InProgress | TaskStatus::Finished => {
                if last.is_start {
                    return Err(AppError::validation(format!(
                        "the last history record must be a Stop if the status is {}",
                        record.status.label()
                    )));
                }
            }
            TaskStatus::Todo => {}
        }
    }

    let mut expect_start = true;
    let mut last_time = None;
    for event in &record.history {
        if last_time.is_some_and(|previous| previous >= event.time) {
            return Err(AppError::validation(
                "history must be in strictly ascending order by time",
            ));
        }
        if event.is_start != expect_start {
            return Err(AppError::validation(
                "history must alternate between Start and Stop, beginning with a Start",
            ));
        }
        expect_start = !expect_start;
        last_time = Some(event.time);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::model::{HistoryEvent, TaskStatus};
    use crate::text::TaskRecord;

    fn record(status: TaskStatus, history: Vec<HistoryEvent>) -> TaskRecord {
        TaskRecord {
            name: "demo".to_string(),
            estimate: None,
            description: None,
            status,
            history,
        }
    }

    #[test]
    fn accepts_todo_with_empty_history() {
        validate(&record(TaskStatus::Todo, Vec::new())).unwrap();
    }

    #[test]
    fn accepts_current_ending_in_start() {
        let history = vec![
            HistoryEvent::start(100),
            HistoryEvent::stop(200),
            HistoryEvent::start(300),
        ];
        validate(&record(TaskStatus::Current, history)).unwrap();
    }

    #[test]
    fn accepts_finished_ending_in_stop() {
        let history = vec![HistoryEvent::start(100), HistoryEvent::stop(200)];
        validate(&record(TaskStatus::Finished, history.clone())).unwrap();
        validate(&record(TaskStatus::InProgress, history)).unwrap();
    }

    #[test]
    fn rejects_todo_with_history() {
        let history = vec![HistoryEvent::start(100), HistoryEvent::stop(200)];
        let err = validate(&record(TaskStatus::Todo, history)).unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(err.message().contains("TODO"));
    }

    #[test]
    fn rejects_non_todo_with_empty_history() {
        for status in [
            TaskStatus::Current,
            TaskStatus::InProgress,
            TaskStatus::Finished,
        ] {
            let err = validate(&record(status, Vec::new())).unwrap_err();
            assert_eq!(err.code(), "validation_error", "{status:?}");
        }
    }

    #[test]
    fn rejects_current_ending_in_stop() {
        let history = vec![HistoryEvent::start(100), HistoryEvent::stop(200)];
        let err = validate(&record(TaskStatus::Current, history)).unwrap_err();
        assert!(err.message().contains("Start"));
    }

    #[test]
    fn rejects_finished_ending_in_start() {
        let history = vec![HistoryEvent::start(100)];
        let err = validate(&record(TaskStatus::Finished, history)).unwrap_err();
        assert!(err.message().contains("Stop"));
    }

    #[test]
    fn rejects_consecutive_starts() {
        let history = vec![HistoryEvent::start(1), HistoryEvent::start(2)];
        let err = validate(&record(TaskStatus::Current, history)).unwrap_err();
        assert!(err.message().contains("alternate"));
    }

    #[test]
    fn rejects_history_beginning_with_stop() {
        let history = vec![HistoryEvent::stop(1), HistoryEvent::start(2)];
        let err = validate(&record(TaskStatus::Current, history)).unwrap_err();
        assert!(err.message().contains("alternate"));
    }

    #[test]
    fn rejects_non_monotonic_times() {
        let history = vec![HistoryEvent::start(100), HistoryEvent::stop(50)];
        let err = validate(&record(TaskStatus::InProgress, history)).unwrap_err();
        assert!(err.message().contains("ascending"));
    }

    #[test]
    fn rejects_duplicate_times() {
        let history = vec![HistoryEvent::start(100), HistoryEvent::stop(100)];
        let err = validate(&record(TaskStatus::InProgress, history)).unwrap_err();
        assert!(err.message().contains("ascending"));
    }

    #[test]
    fn time_order_is_checked_before_alternation() {
        // Second event breaks both rules; the ordering error wins.
        let history = vec![HistoryEvent::start(100), HistoryEvent::start(50)];
        let err = validate(&record(TaskStatus::Current, history)).unwrap_err();
        assert!(err.message().contains("ascending"));
    }
}
