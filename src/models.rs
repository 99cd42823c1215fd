use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Japanese,
    Science,
    Social,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Japanese => "japanese",
            Subject::Science => "science",
            Subject::Social => "social",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Subject::Math),
            "japanese" => Ok(Subject::Japanese),
            "science" => Ok(Subject::Science),
            "social" => Ok(Subject::Social),
            other => Err(anyhow::anyhow!("unknown subject: {other}")),
        }
    }
}

/// One logged study event. `study_date` is already normalized to JST;
/// `logged_at` is used only for last-write-wins ordering within a day.
#[derive(Debug, Clone)]
pub struct StudyRecord {
    pub student_id: Uuid,
    pub subject: Subject,
    pub content: String,
    pub correct_count: u32,
    pub total_count: u32,
    pub study_date: NaiveDate,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SubjectTotals {
    pub correct: u32,
    pub total: u32,
    pub entries: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DaySummary {
    pub entry_count: usize,
    pub high_accuracy_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectProgress {
    pub subject: Subject,
    pub correct: u32,
    pub total: u32,
    pub accuracy: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakState {
    Active,
    Grace,
    Reset,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub total_days: usize,
    pub last_study_date: Option<NaiveDate>,
    pub state: StreakState,
    pub max_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionMode {
    Input,
    Special,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionPanel {
    pub subject: Subject,
    pub is_inputted: bool,
    pub accuracy: Option<u8>,
    pub is_complete: bool,
    pub needs_action: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayMission {
    pub mode: MissionMode,
    pub panels: Vec<MissionPanel>,
    pub status_message: String,
    pub completion_status: String,
    pub all_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialMission {
    pub reflection_completed: bool,
    pub review: Vec<SubjectProgress>,
    pub status_message: String,
}
