//! Reduces a task's start/stop history into total elapsed active seconds.

use crate::model::HistoryEvent;

/// Sums the closed start/stop intervals in `history`; a trailing unmatched
/// start counts as still running and extends to `now`.
///
/// This is a pure reduction: the sequence is taken as given (validation is
/// a separate concern) and `now` is an explicit parameter so callers stay
/// in charge of the clock. A stop with no open start contributes nothing.
pub fn elapsed_seconds(history: &[HistoryEvent], now: i64) -> i64 {
    let mut total = 0;
    let mut open_start = None;

    for event in history {
        if event.is_start {
            open_start = Some(event.time);
        } else if let Some(started) = open_start.take() {
            total += event.time - started;
        }
    }

    if let Some(started) = open_start {
        total += now - started;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::elapsed_seconds;
    use crate::model::HistoryEvent;

    #[test]
    fn empty_history_is_zero() {
        assert_eq!(elapsed_seconds(&[], 0), 0);
        assert_eq!(elapsed_seconds(&[], 123456), 0);
    }

    #[test]
    fn closed_intervals_sum() {
        let history = [
            HistoryEvent::start(1000),
            HistoryEvent::stop(1500),
            HistoryEvent::start(2000),
            HistoryEvent::stop(2300),
        ];
        assert_eq!(elapsed_seconds(&history, 9999), 800);
    }

    #[test]
    fn trailing_start_extends_to_now() {
        let history = [
            HistoryEvent::start(1000),
            HistoryEvent::stop(1500),
            HistoryEvent::start(5000),
        ];
        assert_eq!(elapsed_seconds(&history, 5100), 600);
    }

    #[test]
    fn single_open_interval_tracks_now() {
        let history = [HistoryEvent::start(100)];
        assert_eq!(elapsed_seconds(&history, 100), 0);
        assert_eq!(elapsed_seconds(&history, 160), 60);
    }

    #[test]
    fn stop_without_open_start_is_ignored() {
        let history = [HistoryEvent::stop(500), HistoryEvent::start(600)];
        assert_eq!(elapsed_seconds(&history, 700), 100);
    }
}
