use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{DaySummary, StudyRecord, Subject, SubjectProgress, SubjectTotals};

/// Integer percent, rounded half up. A zero total is 0%, never a division error.
pub fn accuracy(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((f64::from(correct) / f64::from(total)) * 100.0).round() as u8
}

/// Partition records into per-date buckets over the inclusive range
/// `[start, end]`, grouped by subject within each day. Records outside the
/// range are silently excluded.
pub fn bucket_by_day(
    records: &[StudyRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, BTreeMap<Subject, SubjectTotals>> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<Subject, SubjectTotals>> = BTreeMap::new();

    for record in records {
        if record.study_date < start || record.study_date > end {
            continue;
        }
        let totals = buckets
            .entry(record.study_date)
            .or_default()
            .entry(record.subject)
            .or_default();
        totals.correct += record.correct_count;
        totals.total += record.total_count;
        totals.entries += 1;
    }

    buckets
}

/// Per-day entry counts for the learning calendar. An entry is counted as
/// high accuracy when its own ratio is at least 80%; a zero-total entry
/// never qualifies.
pub fn day_summaries(
    records: &[StudyRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, DaySummary> {
    let mut summaries: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();

    for record in records {
        if record.study_date < start || record.study_date > end {
            continue;
        }
        let summary = summaries.entry(record.study_date).or_default();
        summary.entry_count += 1;
        if record.total_count > 0
            && u64::from(record.correct_count) * 5 >= u64::from(record.total_count) * 4
        {
            summary.high_accuracy_count += 1;
        }
    }

    summaries
}

/// Per-subject totals for a single day.
pub fn subject_totals_for(
    records: &[StudyRecord],
    date: NaiveDate,
) -> BTreeMap<Subject, SubjectTotals> {
    bucket_by_day(records, date, date)
        .remove(&date)
        .unwrap_or_default()
}

/// Last write wins per (subject, content) key: the most recently logged
/// entry for each pair is authoritative, the rest are superseded retries.
pub fn latest_per_content(records: &[StudyRecord]) -> Vec<&StudyRecord> {
    let mut sorted: Vec<&StudyRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));

    let mut seen: BTreeSet<(Subject, &str)> = BTreeSet::new();
    let mut latest = Vec::new();
    for record in sorted {
        if seen.insert((record.subject, record.content.as_str())) {
            latest.push(record);
        }
    }
    latest
}

/// Week-scoped per-subject progress: restrict to `[start, end]`, keep only
/// the latest entry per (subject, content), then sum by subject.
pub fn weekly_subject_progress(
    records: &[StudyRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SubjectProgress> {
    let in_range: Vec<StudyRecord> = records
        .iter()
        .filter(|r| r.study_date >= start && r.study_date <= end)
        .cloned()
        .collect();

    let mut totals: BTreeMap<Subject, SubjectTotals> = BTreeMap::new();
    for record in latest_per_content(&in_range) {
        let entry = totals.entry(record.subject).or_default();
        entry.correct += record.correct_count;
        entry.total += record.total_count;
        entry.entries += 1;
    }

    totals
        .into_iter()
        .map(|(subject, t)| SubjectProgress {
            subject,
            correct: t.correct,
            total: t.total,
            accuracy: accuracy(t.correct, t.total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(
        month: u32,
        day: u32,
        hour: u32,
        subject: Subject,
        content: &str,
        correct: u32,
        total: u32,
    ) -> StudyRecord {
        StudyRecord {
            student_id: Uuid::nil(),
            subject,
            content: content.to_string(),
            correct_count: correct,
            total_count: total,
            study_date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            logged_at: Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap(),
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[test]
    fn accuracy_is_bounded_and_total_zero_is_zero() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(0, 10), 0);
        assert_eq!(accuracy(10, 10), 100);
        assert_eq!(accuracy(8, 10), 80);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(7, 8), 88); // 87.5 rounds up
    }

    #[test]
    fn buckets_sum_per_subject_and_exclude_out_of_range() {
        let records = vec![
            record(3, 2, 9, Subject::Math, "drill 1", 5, 10),
            record(3, 2, 10, Subject::Math, "drill 2", 3, 10),
            record(3, 2, 11, Subject::Japanese, "kanji 4", 9, 10),
            record(3, 3, 9, Subject::Math, "drill 3", 8, 10),
            record(2, 20, 9, Subject::Science, "plants", 6, 10),
        ];

        let buckets = bucket_by_day(&records, date(3, 1), date(3, 3));
        assert_eq!(buckets.len(), 2);

        let march_2 = &buckets[&date(3, 2)];
        assert_eq!(march_2[&Subject::Math].correct, 8);
        assert_eq!(march_2[&Subject::Math].total, 20);
        assert_eq!(march_2[&Subject::Math].entries, 2);
        assert_eq!(march_2[&Subject::Japanese].correct, 9);

        let march_3 = &buckets[&date(3, 3)];
        assert_eq!(march_3[&Subject::Math].total, 10);
        assert!(!buckets.contains_key(&date(2, 20)));
    }

    #[test]
    fn no_record_is_lost_or_duplicated_within_the_range() {
        let records = vec![
            record(3, 1, 9, Subject::Math, "a", 1, 10),
            record(3, 1, 10, Subject::Math, "b", 2, 10),
            record(3, 2, 9, Subject::Social, "c", 3, 10),
            record(3, 5, 9, Subject::Science, "d", 4, 10),
        ];

        let summaries = day_summaries(&records, date(3, 1), date(3, 2));
        let counted: usize = summaries.values().map(|s| s.entry_count).sum();
        let expected = records
            .iter()
            .filter(|r| r.study_date >= date(3, 1) && r.study_date <= date(3, 2))
            .count();
        assert_eq!(counted, expected);
        assert_eq!(counted, 3);
    }

    #[test]
    fn high_accuracy_counts_entries_at_or_above_eighty_percent() {
        let records = vec![
            record(3, 2, 9, Subject::Math, "a", 8, 10),      // exactly 80%
            record(3, 2, 10, Subject::Math, "b", 7, 10),     // below
            record(3, 2, 11, Subject::Japanese, "c", 10, 10),
            record(3, 2, 12, Subject::Science, "d", 0, 0),   // zero total never counts
        ];

        let summaries = day_summaries(&records, date(3, 2), date(3, 2));
        let summary = &summaries[&date(3, 2)];
        assert_eq!(summary.entry_count, 4);
        assert_eq!(summary.high_accuracy_count, 2);
    }

    #[test]
    fn latest_entry_wins_per_subject_and_content() {
        let records = vec![
            record(3, 2, 9, Subject::Math, "drill 1", 4, 10),
            record(3, 2, 15, Subject::Math, "drill 1", 9, 10), // retry later the same day
            record(3, 2, 10, Subject::Math, "drill 2", 6, 10),
        ];

        let latest = latest_per_content(&records);
        assert_eq!(latest.len(), 2);
        let drill_1 = latest
            .iter()
            .find(|r| r.content == "drill 1")
            .unwrap();
        assert_eq!(drill_1.correct_count, 9);
    }

    #[test]
    fn weekly_progress_sums_latest_entries_per_subject() {
        let records = vec![
            record(3, 2, 9, Subject::Math, "drill 1", 4, 10),
            record(3, 3, 9, Subject::Math, "drill 1", 8, 10), // supersedes Monday's try
            record(3, 3, 10, Subject::Math, "drill 2", 5, 10),
            record(3, 3, 11, Subject::Japanese, "kanji 4", 9, 10),
            record(2, 20, 9, Subject::Japanese, "kanji 3", 2, 10), // previous week
        ];

        let progress = weekly_subject_progress(&records, date(3, 2), date(3, 8));
        assert_eq!(progress.len(), 2);

        let math = progress.iter().find(|p| p.subject == Subject::Math).unwrap();
        assert_eq!(math.correct, 13);
        assert_eq!(math.total, 20);
        assert_eq!(math.accuracy, 65);

        let japanese = progress
            .iter()
            .find(|p| p.subject == Subject::Japanese)
            .unwrap();
        assert_eq!(japanese.total, 10);
        assert_eq!(japanese.accuracy, 90);
    }

    #[test]
    fn single_day_totals_are_a_one_day_bucket() {
        let records = vec![
            record(3, 3, 9, Subject::Math, "drill", 8, 10),
            record(3, 2, 9, Subject::Math, "drill", 5, 10),
        ];
        let totals = subject_totals_for(&records, date(3, 3));
        assert_eq!(totals[&Subject::Math].correct, 8);
        assert_eq!(totals[&Subject::Math].total, 10);
    }
}
