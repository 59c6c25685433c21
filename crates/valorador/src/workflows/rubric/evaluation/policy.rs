use super::config::GlobalConfig;
use super::SectionScore;
use serde::{Deserialize, Serialize};

/// Final approval outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    NotApproved,
}

impl Verdict {
    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Approved => "APROBADO",
            Verdict::NotApproved => "NO APROBADO",
        }
    }

    pub const fn from_approved(approved: bool) -> Self {
        if approved {
            Verdict::Approved
        } else {
            Verdict::NotApproved
        }
    }
}

/// `OK` / `NO` marker used when rendering a single threshold condition.
pub const fn condition_label(met: bool) -> &'static str {
    if met {
        "OK"
    } else {
        "NO"
    }
}

pub(crate) struct Conditions {
    pub global_ok: bool,
    pub approved: bool,
}

pub(crate) fn decide_conditions(
    team: &SectionScore,
    body: &SectionScore,
    total: i64,
    global: &GlobalConfig,
) -> Conditions {
    let global_ok = total >= global.minimum_required;
    Conditions {
        global_ok,
        approved: team.meets_minimum && body.meets_minimum && global_ok,
    }
}
