use crate::event_log::event_log_struct::{EventLog, Trace};

///
/// The pattern an event log exclusively repeats, if there is one.
///
/// The candidate pattern is the shortest non-empty trace. It qualifies when
/// every trace is a whole number of verbatim repetitions of it (empty traces
/// count as zero repetitions). `None` when all traces are empty or some trace
/// deviates.
///
pub fn exclusive_pattern(log: &EventLog) -> Option<Trace> {
    let pattern = log
        .traces
        .iter()
        .filter(|t| !t.is_empty())
        .min_by_key(|t| t.len())?;
    let repeats_pattern = |trace: &Trace| {
        trace.len() % pattern.len() == 0
            && trace.chunks(pattern.len()).all(|block| block == &pattern[..])
    };
    log.traces
        .iter()
        .all(repeats_pattern)
        .then(|| pattern.clone())
}

/// Whether the log consists exclusively of repetitions of one pattern.
pub fn is_pattern_exclusively_repeated(log: &EventLog) -> bool {
    exclusive_pattern(log).is_some()
}

///
/// Whether the log must be reduced with a tau loop instead of a structural
/// cut: one pattern is exclusively repeated **and** some trace actually
/// repeats it more than once.
///
/// A log where every trace is a single occurrence of the pattern (e.g. one
/// trace `[A, B]`) is ordinary sequential behavior and is left to the cut
/// checks; without the second condition the pattern check would swallow it
/// and reduction could never terminate.
///
pub fn requires_tau_loop(log: &EventLog) -> bool {
    match exclusive_pattern(log) {
        Some(pattern) => log.traces.iter().any(|t| t.len() > pattern.len()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::DfgNode;

    #[test]
    fn detects_exclusively_repeated_pattern() {
        let log = EventLog::from_activity_traces(&[&["A", "B"], &["A", "B", "A", "B", "A", "B"]]);
        assert!(is_pattern_exclusively_repeated(&log));
        assert_eq!(
            exclusive_pattern(&log),
            Some(vec![DfgNode::activity("A"), DfgNode::activity("B")])
        );
    }

    #[test]
    fn rejects_mismatched_blocks() {
        let log = EventLog::from_activity_traces(&[&["A", "B", "C", "A", "A", "B"]]);
        assert!(!is_pattern_exclusively_repeated(&log));
    }

    #[test]
    fn rejects_partial_repetitions() {
        let log = EventLog::from_activity_traces(&[&["A", "B"], &["A", "B", "A"]]);
        assert!(!is_pattern_exclusively_repeated(&log));
    }

    #[test]
    fn all_empty_traces_is_no_pattern() {
        let log = EventLog {
            traces: vec![vec![], vec![]],
        };
        assert!(!is_pattern_exclusively_repeated(&log));
    }

    #[test]
    fn tau_loop_needs_an_actual_repetition() {
        let single = EventLog::from_activity_traces(&[&["A", "B"]]);
        assert!(is_pattern_exclusively_repeated(&single));
        assert!(!requires_tau_loop(&single));

        let repeated = EventLog::from_activity_traces(&[&["A", "B"], &["A", "B", "A", "B"]]);
        assert!(requires_tau_loop(&repeated));
    }
}
