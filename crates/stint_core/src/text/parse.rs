use crate::error::AppError;
use crate::model::{HistoryEvent, TaskStatus};
use crate::text::TaskRecord;
use crate::timefmt::decode_timestamp;

/// Parses a task text buffer into an unvalidated [`TaskRecord`].
///
/// The grammar is fixed: four labeled fields in order (`NAME`, `ESTIMATE`,
/// `STATUS`, `DESCRIPTION`), a `HISTORY` header, then zero or more
/// `Start`/`Stop` lines. Blank lines may separate any two lines. Any
/// deviation fails with a `ParseError` naming the line and the field that
/// could not be matched; nothing is repaired or defaulted. Run
/// [`validate`](crate::text::validate) on the result before trusting it.
pub fn parse(input: &str) -> Result<TaskRecord, AppError> {
    let mut cursor = Cursor::new(input);

    let (line_no, line) = cursor.expect_line("'NAME:' field")?;
    let name = phrase(field_value(line, "NAME", line_no)?, line_no, "NAME")?;

    let (line_no, line) = cursor.expect_line("'ESTIMATE:' field")?;
    let estimate = estimate_value(field_value(line, "ESTIMATE", line_no)?, line_no)?;

    let (line_no, line) = cursor.expect_line("'STATUS:' field")?;
    let status = status_value(field_value(line, "STATUS", line_no)?, line_no)?;

    let (line_no, line) = cursor.expect_line("'DESCRIPTION:' field")?;
    let description = match field_value(line, "DESCRIPTION", line_no)? {
        "None" => None,
        value => Some(phrase(value, line_no, "DESCRIPTION")?),
    };

    let (line_no, line) = cursor.expect_line("HISTORY section")?;
    if line.trim_matches([' ', '\t']) != "HISTORY" {
        return Err(AppError::parse(format!(
            "line {line_no}: expected HISTORY section header"
        )));
    }

    let mut history = Vec::new();
    while let Some((line_no, line)) = cursor.next_content_line() {
        history.push(history_record(line, line_no)?);
    }

    Ok(TaskRecord {
        name,
        estimate,
        description,
        status,
        history,
    })
}

struct Cursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
        }
    }

    /// Next line with any content, skipping blank separator lines.
    /// Line numbers are 1-based.
    fn next_content_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .by_ref()
            .map(|(index, line)| (index + 1, line))
            .find(|(_, line)| !line.trim_matches([' ', '\t']).is_empty())
    }

    fn expect_line(&mut self, wanted: &str) -> Result<(usize, &'a str), AppError> {
        self.next_content_line()
            .ok_or_else(|| AppError::parse(format!("expected {wanted}, found end of input")))
    }
}

/// Strips `LABEL:` from a field line and returns the trimmed value text.
fn field_value<'a>(line: &'a str, label: &str, line_no: usize) -> Result<&'a str, AppError> {
    line.strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(|rest| rest.trim_matches([' ', '\t']))
        .ok_or_else(|| AppError::parse(format!("line {line_no}: expected '{label}:' field")))
}

/// A phrase is one or more words of `[0-9A-Za-z.!?&_-]`; whitespace runs
/// between words collapse to single spaces.
fn phrase(value: &str, line_no: usize, field: &str) -> Result<String, AppError> {
    crate::text::normalize_phrase(value)
        .map_err(|err| AppError::parse(format!("line {line_no}: {field} {}", err.message())))
}

fn estimate_value(value: &str, line_no: usize) -> Result<Option<u32>, AppError> {
    if value == "None" {
        return Ok(None);
    }

    let digits = !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit());
    if !digits || value.starts_with('0') {
        return Err(AppError::parse(format!(
            "line {line_no}: ESTIMATE must be a positive integer without leading zeros, or None"
        )));
    }

    value.parse::<u32>().map(Some).map_err(|_| {
        AppError::parse(format!("line {line_no}: ESTIMATE '{value}' is too large"))
    })
}

fn status_value(value: &str, line_no: usize) -> Result<TaskStatus, AppError> {
    TaskStatus::from_label(value).ok_or_else(|| {
        AppError::parse(format!(
            "line {line_no}: STATUS must be one of TODO, Current, In Progress, Finished"
        ))
    })
}

fn history_record(line: &str, line_no: usize) -> Result<HistoryEvent, AppError> {
    let (kind, rest) = line.split_once([' ', '\t']).unwrap_or((line, ""));
    let is_start = match kind {
        "Start" => true,
        "Stop" => false,
        _ => {
            return Err(AppError::parse(format!(
                "line {line_no}: expected history record starting with Start or Stop"
            )));
        }
    };

    let time = decode_timestamp(rest.trim_matches([' ', '\t']))
        .map_err(|err| AppError::parse(format!("line {line_no}: {}", err.message())))?;

    Ok(HistoryEvent { is_start, time })
}
