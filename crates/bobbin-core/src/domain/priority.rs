//! Task priority classes and the caller type derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority class assigned once per executable. `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Low,
}

/// Caller classification attached to outbound calls for downstream admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerType {
    Background,
    Preemptable,
}

impl CallerType {
    /// Low priority work may be shed first, everything else runs as background.
    pub fn from_priority(priority: Priority) -> Self {
        match priority {
            Priority::Low => CallerType::Preemptable,
            Priority::High => CallerType::Background,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallerType::Background => "background",
            CallerType::Preemptable => "preemptable",
        }
    }
}

impl fmt::Display for CallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_priority_is_preemptable() {
        assert_eq!(CallerType::from_priority(Priority::Low), CallerType::Preemptable);
        assert_eq!(CallerType::from_priority(Priority::High), CallerType::Background);
    }

    #[test]
    fn high_sorts_before_low() {
        let mut v = vec![Priority::Low, Priority::High];
        v.sort();
        assert_eq!(v, vec![Priority::High, Priority::Low]);
    }
}
