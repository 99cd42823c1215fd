use std::collections::BTreeSet;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{StudyRecord, Subject};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        (
            Uuid::parse_str("6f1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d")?,
            "Hinata Mori",
            "hinata.mori@dailyspark.jp",
            "5",
        ),
        (
            Uuid::parse_str("1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d")?,
            "Sora Takeda",
            "sora.takeda@dailyspark.jp",
            "6",
        ),
        (
            Uuid::parse_str("9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c6b")?,
            "Riko Hayashi",
            "riko.hayashi@dailyspark.jp",
            "5",
        ),
    ];

    for (id, name, email, grade) in students {
        sqlx::query(
            r#"
            INSERT INTO daily_spark.students (id, display_name, email, grade)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name, grade = EXCLUDED.grade
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(grade)
        .fetch_one(pool)
        .await?;
    }

    let logs: Vec<(&str, &str, &str, &str, i32, i32, NaiveDate)> = vec![
        (
            "seed-001",
            "hinata.mori@dailyspark.jp",
            "math",
            "calc drill 12",
            8,
            10,
            NaiveDate::from_ymd_opt(2026, 2, 2).context("invalid date")?,
        ),
        (
            "seed-002",
            "hinata.mori@dailyspark.jp",
            "japanese",
            "kanji set 8",
            6,
            10,
            NaiveDate::from_ymd_opt(2026, 2, 2).context("invalid date")?,
        ),
        (
            "seed-003",
            "sora.takeda@dailyspark.jp",
            "science",
            "electricity basics",
            9,
            10,
            NaiveDate::from_ymd_opt(2026, 2, 1).context("invalid date")?,
        ),
        (
            "seed-004",
            "riko.hayashi@dailyspark.jp",
            "social",
            "prefectures quiz",
            7,
            10,
            NaiveDate::from_ymd_opt(2026, 1, 30).context("invalid date")?,
        ),
    ];

    for (source_key, email, subject, content, correct, total, study_date) in logs {
        let student_id: Uuid =
            sqlx::query("SELECT id FROM daily_spark.students WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?
                .get("id");

        let logged_at = study_date
            .and_hms_opt(19, 30, 0)
            .context("invalid time")?
            .and_utc();

        sqlx::query(
            r#"
            INSERT INTO daily_spark.study_logs
            (id, student_id, subject, content, correct_count, total_count, study_date, logged_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(subject)
        .bind(content)
        .bind(correct)
        .bind(total)
        .bind(study_date)
        .bind(logged_at)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Records for one student over an inclusive date range. Rows with a
/// subject label the engine does not know are skipped, not fatal.
pub async fn fetch_study_records(
    pool: &PgPool,
    email: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<StudyRecord>> {
    let rows = sqlx::query(
        "SELECT s.id AS student_id, l.subject, l.content, l.correct_count, \
         l.total_count, l.study_date, l.logged_at \
         FROM daily_spark.study_logs l \
         JOIN daily_spark.students s ON s.id = l.student_id \
         WHERE s.email = $1 AND l.study_date >= $2 AND l.study_date <= $3 \
         ORDER BY l.study_date, l.logged_at",
    )
    .bind(email)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::new();
    for row in rows {
        let subject_text: String = row.get("subject");
        let subject = match subject_text.parse::<Subject>() {
            Ok(subject) => subject,
            Err(_) => {
                println!("Skipping log with unknown subject '{subject_text}'.");
                continue;
            }
        };

        let correct: i32 = row.get("correct_count");
        let total: i32 = row.get("total_count");

        records.push(StudyRecord {
            student_id: row.get("student_id"),
            subject,
            content: row.get("content"),
            correct_count: correct.max(0) as u32,
            total_count: total.max(0) as u32,
            study_date: row.get("study_date"),
            logged_at: row.get("logged_at"),
        });
    }

    Ok(records)
}

/// Distinct study dates across the student's full history, for streak math.
pub async fn fetch_study_dates(
    pool: &PgPool,
    email: &str,
) -> anyhow::Result<BTreeSet<NaiveDate>> {
    let rows = sqlx::query(
        "SELECT DISTINCT l.study_date \
         FROM daily_spark.study_logs l \
         JOIN daily_spark.students s ON s.id = l.student_id \
         WHERE s.email = $1",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row.get("study_date")).collect())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        display_name: String,
        email: String,
        grade: String,
        subject: String,
        content: String,
        correct_count: i32,
        total_count: i32,
        study_date: NaiveDate,
        logged_at: Option<DateTime<Utc>>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;

        // Normalize the subject label at the boundary; a bad row fails the
        // import rather than smuggling an unknown label into the table.
        let subject = row
            .subject
            .parse::<Subject>()
            .with_context(|| format!("row for {}", row.email))?;

        let student_id: Uuid = sqlx::query(
            r#"
            INSERT INTO daily_spark.students (id, display_name, email, grade)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name, grade = EXCLUDED.grade
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.display_name)
        .bind(&row.email)
        .bind(&row.grade)
        .fetch_one(pool)
        .await?
        .get("id");

        let logged_at = match row.logged_at {
            Some(ts) => ts,
            None => row
                .study_date
                .and_hms_opt(12, 0, 0)
                .context("invalid time")?
                .and_utc(),
        };

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO daily_spark.study_logs
            (id, student_id, subject, content, correct_count, total_count, study_date, logged_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(subject.as_str())
        .bind(&row.content)
        .bind(row.correct_count)
        .bind(row.total_count)
        .bind(row.study_date)
        .bind(logged_at)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
