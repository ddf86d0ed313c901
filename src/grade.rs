//! Letter grade computation.

use serde::Serialize;
use strum_macros::Display;

use crate::validation::{Status, ValidationResult};

/// Counts of rule outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl Summary {
    pub fn tally(results: &[ValidationResult]) -> Summary {
        let mut summary = Summary::default();
        for result in results {
            match result.status {
                Status::Pass => summary.passed += 1,
                Status::Warning => summary.warnings += 1,
                Status::Fail => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Grade {
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    A,
    B,
    C,
    F,
}

impl Grade {
    /// Any failure is an `F`; otherwise the grade drops one letter per warning,
    /// bottoming out at `C`.
    pub fn from_summary(summary: &Summary) -> Grade {
        if summary.failed > 0 {
            Grade::F
        } else if summary.warnings >= 3 {
            Grade::C
        } else if summary.warnings >= 2 {
            Grade::B
        } else if summary.warnings >= 1 {
            Grade::A
        } else {
            Grade::APlus
        }
    }
}
