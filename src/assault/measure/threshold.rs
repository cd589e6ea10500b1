use std::time::Duration;

use super::aggregate::PassSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classified {
    Good,
    Allow,
    Warn,
    Bad,
}
impl Classified {
    pub fn pass_rate(summary: &PassSummary) -> Self {
        let PassSummary { pass, count, pass_rate } = summary;
        if pass == count {
            Classified::Good
        } else if *pass_rate > 0.8 {
            Classified::Allow
        } else if *pass_rate > 0.5 {
            Classified::Warn
        } else {
            Classified::Bad
        }
    }

    pub fn latency(latency: Duration) -> Self {
        if latency > Duration::from_secs(3) {
            Classified::Bad
        } else if latency > Duration::from_secs(1) {
            Classified::Warn
        } else if latency > Duration::from_millis(200) {
            Classified::Allow
        } else {
            Classified::Good
        }
    }

    pub fn count(bad: u64) -> Self {
        if bad == 0 {
            Classified::Good
        } else {
            Classified::Warn
        }
    }
}
