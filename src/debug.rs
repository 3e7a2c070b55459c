use std::collections::VecDeque;

/// Small ring buffer of recent debug lines, for on-screen inspection and copy-paste.
///
/// Every line is also forwarded to the `log` facade at `debug` level under `target`.
#[derive(Clone, Debug)]
pub struct DebugEventLog {
    target: &'static str,
    capacity: usize,
    lines: VecDeque<String>,
}

impl DebugEventLog {
    pub fn new(target: &'static str, capacity: usize) -> Self {
        Self {
            target,
            capacity: capacity.clamp(1, 10_000),
            lines: VecDeque::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!(target: self.target, "{message}");

        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(message);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn text(&self) -> String {
        itertools::join(self.lines.iter(), "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_lines() {
        let mut log = DebugEventLog::new("test", 2);
        log.push("a");
        log.push("b");
        log.push("c");
        assert_eq!(log.len(), 2);
        assert_eq!(log.text(), "b\nc");
        assert_eq!(log.last(), Some("c"));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = DebugEventLog::new("test", 0);
        log.push("only");
        log.push("newest");
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["newest"]);
        log.clear();
        assert!(log.is_empty());
    }
}
