use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate;
use crate::calendar::JstClock;
use crate::mission::{self, CompletionPolicy};
use crate::models::{MissionMode, StudyRecord};
use crate::streak;

pub fn build_report(
    student: &str,
    clock: &JstClock,
    window_start: NaiveDate,
    records: &[StudyRecord],
    dates: &BTreeSet<NaiveDate>,
    policy: CompletionPolicy,
) -> String {
    let info = streak::streak_info(dates, clock);
    let today_mission = mission::evaluate_today(records, clock, policy);
    let weekly =
        aggregate::weekly_subject_progress(records, clock.this_week_monday(), clock.today());
    let summaries = aggregate::day_summaries(records, window_start, clock.today());

    let mut output = String::new();

    let _ = writeln!(output, "# Daily Spark Progress Report");
    let _ = writeln!(output, "Generated for {} on {}", student, clock.today());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Streak");
    let _ = writeln!(
        output,
        "- Current streak: {} days ({:?})",
        info.current_streak, info.state
    );
    let _ = writeln!(output, "- Best streak: {} days", info.max_streak);
    let _ = writeln!(output, "- Total study days: {}", info.total_days);
    match info.last_study_date {
        Some(date) => {
            let _ = writeln!(output, "- Last studied: {date}");
        }
        None => {
            let _ = writeln!(output, "- No study logs yet.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Today's Mission");
    let _ = writeln!(output, "{}", today_mission.status_message);

    if today_mission.mode == MissionMode::Special {
        let special = mission::special_mission(&weekly, false);
        if special.review.is_empty() {
            let _ = writeln!(output, "- Nothing left to review this week.");
        } else {
            for item in &special.review {
                let _ = writeln!(
                    output,
                    "- Review {}: {}% this week",
                    item.subject, item.accuracy
                );
            }
        }
    } else {
        for panel in &today_mission.panels {
            match panel.accuracy {
                Some(accuracy) => {
                    let note = if panel.is_complete { "complete" } else { "needs review" };
                    let _ = writeln!(output, "- {}: {}% ({})", panel.subject, accuracy, note);
                }
                None => {
                    let _ = writeln!(output, "- {}: not inputted", panel.subject);
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Subject Progress");

    if weekly.is_empty() {
        let _ = writeln!(output, "No logs recorded this week.");
    } else {
        for progress in &weekly {
            let _ = writeln!(
                output,
                "- {}: {}/{} correct ({}%)",
                progress.subject, progress.correct, progress.total, progress.accuracy
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Learning Calendar (since {window_start})");

    if summaries.is_empty() {
        let _ = writeln!(output, "No logs recorded in this window.");
    } else {
        for (date, summary) in summaries.iter().rev() {
            let _ = writeln!(
                output,
                "- {}: {} entries, {} at 80%+",
                date, summary.entry_count, summary.high_accuracy_count
            );
        }
    }

    output
}
