use crate::aggregate;
use crate::calendar::JstClock;
use crate::models::{
    MissionMode, MissionPanel, SpecialMission, StudyRecord, Subject, SubjectProgress, TodayMission,
};

const REVIEW_THRESHOLD: u8 = 80;
const REVIEW_LIMIT: usize = 2;

/// Fixed weekday schedule, 0 = Sunday. Sunday has no input block.
pub fn subject_block(weekday: u32) -> &'static [Subject] {
    match weekday {
        1 | 2 => &[Subject::Math, Subject::Japanese, Subject::Social],
        3 | 4 => &[Subject::Math, Subject::Japanese, Subject::Science],
        5 | 6 => &[Subject::Math, Subject::Science, Subject::Social],
        _ => &[],
    }
}

/// Sunday and Saturday afternoon switch to the reflection-only special
/// mode; every other slot asks for subject input.
pub fn mission_mode(weekday: u32, hour: u32) -> MissionMode {
    if weekday == 0 {
        return MissionMode::Special;
    }
    if weekday == 6 && hour >= 12 {
        return MissionMode::Special;
    }
    if subject_block(weekday).is_empty() {
        return MissionMode::Special;
    }
    MissionMode::Input
}

/// How a subject panel counts as complete. The student surface stops
/// nagging on any input; the coach and parent surfaces hold out for the
/// accuracy threshold.
#[derive(Debug, Clone, Copy)]
pub enum CompletionPolicy {
    Mastery { threshold: u8 },
    AnyInput,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::Mastery { threshold: 80 }
    }
}

/// Evaluate today's mission from the day's records. Only entries dated
/// today feed the panels; the clock decides the mode and subject block.
pub fn evaluate_today(
    records: &[StudyRecord],
    clock: &JstClock,
    policy: CompletionPolicy,
) -> TodayMission {
    let weekday = clock.weekday_index();
    let mode = mission_mode(weekday, clock.hour());

    if mode == MissionMode::Special {
        return TodayMission {
            mode,
            panels: Vec::new(),
            status_message: "Wrap up the week with your reflection and a review.".to_string(),
            completion_status: "0/0 inputted".to_string(),
            all_complete: false,
        };
    }

    let totals = aggregate::subject_totals_for(records, clock.today());
    let panels: Vec<MissionPanel> = subject_block(weekday)
        .iter()
        .map(|&subject| {
            let entry = totals.get(&subject).copied();
            let is_inputted = entry.is_some_and(|t| t.total > 0);
            let accuracy = if is_inputted {
                entry.map(|t| aggregate::accuracy(t.correct, t.total))
            } else {
                None
            };
            let is_complete = match policy {
                CompletionPolicy::Mastery { threshold } => {
                    is_inputted && accuracy.unwrap_or(0) >= threshold
                }
                CompletionPolicy::AnyInput => is_inputted,
            };
            MissionPanel {
                subject,
                is_inputted,
                accuracy,
                is_complete,
                needs_action: !is_complete,
            }
        })
        .collect();

    let inputted = panels.iter().filter(|p| p.is_inputted).count();
    let all_complete = panels.iter().all(|p| p.is_complete);

    TodayMission {
        mode,
        status_message: status_message(&panels, inputted, all_complete),
        completion_status: format!("{inputted}/{} inputted", panels.len()),
        all_complete,
        panels,
    }
}

// Priority ladder: all complete > everything inputted > one remaining >
// several remaining. Presentation copy, not contract.
fn status_message(panels: &[MissionPanel], inputted: usize, all_complete: bool) -> String {
    if all_complete {
        return "Perfect mastery! Every subject is done for today.".to_string();
    }
    if inputted == panels.len() {
        let pending: Vec<&str> = panels
            .iter()
            .filter(|p| !p.is_complete)
            .map(|p| p.subject.as_str())
            .collect();
        return format!("Review {} to finish today's mission.", pending.join(", "));
    }
    let remaining: Vec<&MissionPanel> = panels.iter().filter(|p| !p.is_inputted).collect();
    if remaining.len() == 1 {
        return format!(
            "{inputted}/{} inputted. Just {} to go!",
            panels.len(),
            remaining[0].subject
        );
    }
    format!(
        "{inputted}/{} inputted. {} subjects left today.",
        panels.len(),
        remaining.len()
    )
}

/// Weekend special mode: the weekly reflection plus up to the two
/// lowest-accuracy subjects still under the review threshold this week.
pub fn special_mission(weekly: &[SubjectProgress], reflection_completed: bool) -> SpecialMission {
    let mut review: Vec<SubjectProgress> = weekly
        .iter()
        .filter(|p| p.total > 0 && p.accuracy < REVIEW_THRESHOLD)
        .cloned()
        .collect();
    review.sort_by_key(|p| p.accuracy);
    review.truncate(REVIEW_LIMIT);

    let status_message = if reflection_completed && review.is_empty() {
        "Special mission complete. Great week!".to_string()
    } else {
        "Wrap up the week with your reflection and a review.".to_string()
    };

    SpecialMission {
        reflection_completed,
        review,
        status_message,
    }
}
