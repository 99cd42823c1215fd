use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod aggregate;
mod calendar;
mod db;
mod mission;
mod models;
mod report;
mod streak;

use calendar::JstClock;
use mission::CompletionPolicy;

#[derive(Parser)]
#[command(name = "daily-spark-progress")]
#[command(about = "Study activity aggregation for the Daily Spark tutoring program", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import study logs from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show the consecutive-day study streak
    Streak {
        #[arg(long)]
        email: String,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate today's mission panels
    Mission {
        #[arg(long)]
        email: String,
        /// Accuracy needed for a subject to count as complete
        #[arg(long, default_value_t = 80)]
        threshold: u8,
        /// Count any logged entry as complete (student-surface policy)
        #[arg(long)]
        any_input: bool,
        #[arg(long)]
        json: bool,
    },
    /// Day-by-day learning calendar summary
    Calendar {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 42)]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 42)]
        days: u32,
        #[arg(long, default_value_t = 80)]
        threshold: u8,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} study logs from {}.", csv.display());
        }
        Commands::Streak { email, json } => {
            let clock = JstClock::system();
            let dates = db::fetch_study_dates(&pool, &email).await?;
            let info = streak::streak_info(&dates, &clock);

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{email}: {} day streak ({:?}), best {} days over {} total study days",
                    info.current_streak, info.state, info.max_streak, info.total_days
                );
            }
        }
        Commands::Mission {
            email,
            threshold,
            any_input,
            json,
        } => {
            let clock = JstClock::system();
            let records = db::fetch_study_records(
                &pool,
                &email,
                clock.this_week_monday(),
                clock.today(),
            )
            .await?;

            let policy = if any_input {
                CompletionPolicy::AnyInput
            } else {
                CompletionPolicy::Mastery { threshold }
            };
            let today = mission::evaluate_today(&records, &clock, policy);

            if json {
                println!("{}", serde_json::to_string_pretty(&today)?);
                return Ok(());
            }

            println!("{}", today.status_message);
            println!("{}", today.completion_status);
            for panel in &today.panels {
                match panel.accuracy {
                    Some(accuracy) => println!("- {}: {accuracy}%", panel.subject),
                    None => println!("- {}: not inputted", panel.subject),
                }
            }

            if today.panels.is_empty() {
                let weekly = aggregate::weekly_subject_progress(
                    &records,
                    clock.this_week_monday(),
                    clock.today(),
                );
                let special = mission::special_mission(&weekly, false);
                for item in &special.review {
                    println!("- Review {}: {}% this week", item.subject, item.accuracy);
                }
            }
        }
        Commands::Calendar { email, days, json } => {
            let clock = JstClock::system();
            let start = clock.days_ago(days.saturating_sub(1));
            let records = db::fetch_study_records(&pool, &email, start, clock.today()).await?;
            let summaries = aggregate::day_summaries(&records, start, clock.today());

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }

            if summaries.is_empty() {
                println!("No study logs in the last {days} days.");
            } else {
                for (date, summary) in &summaries {
                    println!(
                        "{date}: {} entries, {} at 80%+",
                        summary.entry_count, summary.high_accuracy_count
                    );
                }
            }
        }
        Commands::Report {
            email,
            days,
            threshold,
            out,
        } => {
            let clock = JstClock::system();
            let start = clock.days_ago(days.saturating_sub(1));
            let records = db::fetch_study_records(&pool, &email, start, clock.today()).await?;
            let dates = db::fetch_study_dates(&pool, &email).await?;
            let report = report::build_report(
                &email,
                &clock,
                start,
                &records,
                &dates,
                CompletionPolicy::Mastery { threshold },
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
