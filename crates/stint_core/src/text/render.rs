use crate::error::AppError;
use crate::text::TaskRecord;
use crate::timefmt::encode_timestamp;

/// Renders a record into the canonical task text layout.
///
/// The output is the structural inverse of [`parse`](crate::text::parse):
/// it always parses back, and a valid record survives the round trip
/// field for field. Absent estimate/description render as the literal
/// token `None`; history lines come out in the order supplied (chronology
/// is the caller's responsibility, the renderer does not sort).
pub fn render(record: &TaskRecord) -> Result<String, AppError> {
    let mut lines = Vec::with_capacity(6 + record.history.len());

    lines.push(format!("NAME: {}", record.name));
    lines.push(match record.estimate {
        Some(hours) => format!("ESTIMATE: {hours}"),
        None => "ESTIMATE: None".to_string(),
    });
    lines.push(format!("STATUS: {}", record.status.label()));
    lines.push(match record.description.as_deref() {
        Some(description) => format!("DESCRIPTION: {description}"),
        None => "DESCRIPTION: None".to_string(),
    });
    lines.push(String::new());
    lines.push("HISTORY".to_string());

    for event in &record.history {
        let kind = if event.is_start { "Start" } else { "Stop" };
        lines.push(format!("{kind}\t{}", encode_timestamp(event.time)?));
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::model::{HistoryEvent, TaskStatus};
    use crate::text::TaskRecord;

    #[test]
    fn renders_canonical_layout() {
        let record = TaskRecord {
            name: "fix the build".to_string(),
            estimate: Some(2),
            description: Some("broken on main".to_string()),
            status: TaskStatus::InProgress,
            history: vec![
                HistoryEvent::start(1577836800),
                HistoryEvent::stop(1577836800 + 3661),
            ],
        };

        let text = render(&record).unwrap();
        assert_eq!(
            text,
            "NAME: fix the build\n\
             ESTIMATE: 2\n\
             STATUS: In Progress\n\
             DESCRIPTION: broken on main\n\
             \n\
             HISTORY\n\
             Start\t2020-01-01 00:00:00\n\
             Stop\t2020-01-01 01:01:01"
        );
    }

    #[test]
    fn absent_fields_render_as_none_token() {
        let record = TaskRecord {
            name: "chore".to_string(),
            estimate: None,
            description: None,
            status: TaskStatus::Todo,
            history: Vec::new(),
        };

        let text = render(&record).unwrap();
        assert!(text.contains("ESTIMATE: None"));
        assert!(text.contains("DESCRIPTION: None"));
        assert!(text.ends_with("HISTORY"));
    }

    #[test]
    fn history_renders_in_supplied_order() {
        // Deliberately unsorted; the renderer must not reorder.
        let record = TaskRecord {
            name: "chore".to_string(),
            estimate: None,
            description: None,
            status: TaskStatus::Current,
            history: vec![HistoryEvent::start(1700000000), HistoryEvent::stop(1577836800)],
        };

        let text = render(&record).unwrap();
        let start_line = text.lines().nth(6).unwrap();
        let stop_line = text.lines().nth(7).unwrap();
        assert!(start_line.starts_with("Start\t"));
        assert!(stop_line.starts_with("Stop\t"));
    }
}
