//! Delivery processing status.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Processing status of a delivery record.
///
/// `Pending` is the only non-terminal state. Each of the other four is
/// reached by exactly one dispatch run and is never left again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingStatus {
    /// Accepted and waiting for dispatch.
    #[default]
    Pending,
    /// Every assigned handler returned a result.
    Success,
    /// Some handlers returned a result, others failed or were unresolvable.
    Partial,
    /// Every assigned handler failed or was unresolvable.
    Failed,
    /// The subscription has no handlers assigned.
    NoHandlers,
}

impl ProcessingStatus {
    /// Derives the terminal status from the number of recorded results and errors.
    pub fn from_counts(results: usize, errors: usize) -> Self {
        match (results, errors) {
            (0, 0) => Self::NoHandlers,
            (0, _) => Self::Failed,
            (_, 0) => Self::Success,
            _ => Self::Partial,
        }
    }

    /// Returns whether the status is terminal.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns whether the delivery is still waiting for dispatch.
    #[inline]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns whether at least one handler produced a result.
    #[inline]
    pub fn has_results(self) -> bool {
        matches!(self, Self::Success | Self::Partial)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_status_from_counts() {
        assert_eq!(ProcessingStatus::from_counts(0, 0), ProcessingStatus::NoHandlers);
        assert_eq!(ProcessingStatus::from_counts(0, 2), ProcessingStatus::Failed);
        assert_eq!(ProcessingStatus::from_counts(3, 0), ProcessingStatus::Success);
        assert_eq!(ProcessingStatus::from_counts(1, 1), ProcessingStatus::Partial);
    }

    #[test]
    fn test_only_pending_is_non_terminal() {
        let non_terminal: Vec<_> = ProcessingStatus::iter()
            .filter(|status| !status.is_terminal())
            .collect();
        assert_eq!(non_terminal, vec![ProcessingStatus::Pending]);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(ProcessingStatus::NoHandlers.to_string(), "no_handlers");
        assert_eq!(
            ProcessingStatus::from_str("partial").ok(),
            Some(ProcessingStatus::Partial)
        );
        assert_eq!(
            serde_json::to_value(ProcessingStatus::NoHandlers).ok(),
            Some(serde_json::json!("no_handlers"))
        );
    }
}
