//! Classified result of one execution

use crate::model::ValueModel;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Completed normally; every error-like result was nil
    Success { values: Vec<ValueModel>, trace: Vec<u64> },

    /// Completed, but some error-like result carried a value
    CompletedWithNonNilError { values: Vec<ValueModel>, trace: Vec<u64> },

    /// The program terminated abnormally with `value`
    AbnormalTermination {
        value: ValueModel,
        implements_error: bool,
        trace: Vec<u64>,
    },

    TimedOut { timeout: Duration, trace: Vec<u64> },
}

impl ExecutionOutcome {
    pub fn trace(&self) -> &[u64] {
        match self {
            ExecutionOutcome::Success { trace, .. }
            | ExecutionOutcome::CompletedWithNonNilError { trace, .. }
            | ExecutionOutcome::AbnormalTermination { trace, .. }
            | ExecutionOutcome::TimedOut { trace, .. } => trace,
        }
    }

    /// Decoded result values of a completed execution
    pub fn values(&self) -> Option<&[ValueModel]> {
        match self {
            ExecutionOutcome::Success { values, .. }
            | ExecutionOutcome::CompletedWithNonNilError { values, .. } => Some(values),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionOutcome::Success { .. } => "success",
            ExecutionOutcome::CompletedWithNonNilError { .. } => "non-nil error",
            ExecutionOutcome::AbnormalTermination { .. } => "abnormal termination",
            ExecutionOutcome::TimedOut { .. } => "timeout",
        }
    }
}
