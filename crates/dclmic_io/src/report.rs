//! Run outcome shared by best-effort report models.

use std::fmt;

/// Overall result of a best-effort run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumRunOutcome {
    /// Every attempted item succeeded.
    Success,
    /// Some items failed, the rest went through.
    Partial,
    /// Nothing went through, or a required step failed.
    Failed,
}

impl EnumRunOutcome {
    /// Lower-case label used in one-line summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    /// `true` for [`Self::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for EnumRunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed named step with its error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStepError {
    /// Step label.
    pub step: String,
    /// User-facing error text.
    pub exception: String,
}

/// Classify a run from its success/failure counts.
///
/// `if_fatal` forces [`EnumRunOutcome::Failed`]. Otherwise a run with failures
/// is `Partial` when at least one item succeeded and `Failed` when none did.
pub fn derive_run_outcome(cnt_ok: usize, cnt_failed: usize, if_fatal: bool) -> EnumRunOutcome {
    if if_fatal {
        return EnumRunOutcome::Failed;
    }
    match (cnt_ok, cnt_failed) {
        (_, 0) => EnumRunOutcome::Success,
        (0, _) => EnumRunOutcome::Failed,
        _ => EnumRunOutcome::Partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_run_outcome() {
        assert_eq!(derive_run_outcome(3, 0, false), EnumRunOutcome::Success);
        assert_eq!(derive_run_outcome(0, 0, false), EnumRunOutcome::Success);
        assert_eq!(derive_run_outcome(2, 1, false), EnumRunOutcome::Partial);
        assert_eq!(derive_run_outcome(0, 4, false), EnumRunOutcome::Failed);
        assert_eq!(derive_run_outcome(5, 0, true), EnumRunOutcome::Failed);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(EnumRunOutcome::Partial.to_string(), "partial");
        assert!(EnumRunOutcome::Success.is_success());
        assert!(!EnumRunOutcome::Failed.is_success());
    }
}
