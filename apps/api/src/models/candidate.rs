use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Review status of a candidate. The backend accepts exactly these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Pending,
    Shortlisted,
    Selected,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Selected => "selected",
            CandidateStatus::Rejected => "rejected",
        }
    }

    /// Status after a recruiter presses select/reject on the feedback page:
    /// pressing the decision already in effect reverts to `pending`.
    pub fn after(current: Option<CandidateStatus>, decision: Decision) -> CandidateStatus {
        let target = match decision {
            Decision::Select => CandidateStatus::Selected,
            Decision::Reject => CandidateStatus::Rejected,
        };
        if current == Some(target) {
            CandidateStatus::Pending
        } else {
            target
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CandidateStatus::Pending),
            "shortlisted" => Ok(CandidateStatus::Shortlisted),
            "selected" => Ok(CandidateStatus::Selected),
            "rejected" => Ok(CandidateStatus::Rejected),
            other => Err(format!("unknown candidate status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Select,
    Reject,
}
