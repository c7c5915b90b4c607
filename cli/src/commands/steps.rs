use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, TimeZone, Utc};
use color_eyre::eyre::{Result, WrapErr};
use stride_health::{HealthStore, JsonHealthStore};
use stride_model::{DateRange, HOURS_PER_DAY};
use tracing::{debug, info};

use crate::config::{TimezoneSetting, UserConfig};
use crate::data::{DateBucketing, DayList, HourList, StepAggregator};
use crate::input::{self, RangeInput};

/// Work that needs the health store.
#[derive(Debug)]
pub enum StepTask {
    Authorize,
    Days(RangeInput),
    Hours(String),
    Export {
        range: RangeInput,
        format: String,
        output: Option<PathBuf>,
    },
}

pub fn run(task: StepTask, config: &UserConfig) -> Result<()> {
    let store: Arc<dyn HealthStore> = Arc::new(
        JsonHealthStore::new(&config.health.source).with_authorized(config.health.authorized),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match config.timezone {
        TimezoneSetting::Local => {
            let bucketing = DateBucketing::new(Local).with_locale(config.locale.as_str());
            runtime.block_on(run_with(task, store, bucketing))
        }
        TimezoneSetting::Fixed(offset) => {
            let bucketing = DateBucketing::new(offset).with_locale(config.locale.as_str());
            runtime.block_on(run_with(task, store, bucketing))
        }
    }
}

async fn run_with<Tz>(
    task: StepTask,
    store: Arc<dyn HealthStore>,
    bucketing: DateBucketing<Tz>,
) -> Result<()>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    let shared = Arc::new(bucketing);
    let bucketing: &DateBucketing<Tz> = &shared;
    let now = Utc::now().with_timezone(bucketing.timezone());
    debug!(
        locale = bucketing.locale(),
        today = %bucketing.day_key(&now),
        "Date bucketing ready"
    );

    store
        .request_read_authorization()
        .await
        .wrap_err("Could not read step count data")?;
    info!(data_type = store.data_type().label(), "Read access granted");

    let aggregator = StepAggregator::new(store, shared.clone());

    match task {
        StepTask::Authorize => {
            println!("Read access to step count data granted.");
        }
        StepTask::Days(range) => {
            let range = input::parse_range(bucketing, &range, &now)?;
            let list = load(&aggregator, range.clone()).await?;
            print_days(bucketing, &range, &list);
        }
        StepTask::Hours(date) => {
            let day = input::parse_day(bucketing, &date)?;
            let list = load(&aggregator, DateRange::single(day.clone())).await?;

            println!("Hourly Steps ({})", bucketing.day_key(&day));
            println!("{}", "=".repeat(30));

            match list.find(bucketing, &day) {
                Some(record) if !record.is_empty() => {
                    print_hours(&HourList::new(bucketing, record));
                    print_gaps(record.failed_queries);
                }
                Some(record) => {
                    println!("No steps recorded for this day.");
                    print_gaps(record.failed_queries);
                }
                None => println!("No steps recorded for this day."),
            }
        }
        StepTask::Export {
            range,
            format,
            output,
        } => {
            let range = input::parse_range(bucketing, &range, &now)?;
            let list = load(&aggregator, range.clone()).await?;

            let from = bucketing.day_key(&range.start);
            let to = bucketing.day_key(&range.end);
            let content = match format.to_lowercase().as_str() {
                "csv" => export_to_csv(bucketing, &from, &to, &list),
                _ => export_to_json(bucketing, &from, &to, &list)?,
            };

            if let Some(path) = output {
                tokio::fs::write(&path, &content).await?;
                println!("Exported to: {}", path.display());
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}

/// Aggregate on a worker and take the result back on this task before
/// building the view.
async fn load<Tz>(aggregator: &StepAggregator<Tz>, range: DateRange<Tz>) -> Result<DayList>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    let records = aggregator
        .spawn(range)
        .await
        .wrap_err("Step aggregation task stopped")?;
    Ok(DayList::new(records))
}

fn print_days<Tz: TimeZone>(bucketing: &DateBucketing<Tz>, range: &DateRange<Tz>, list: &DayList) {
    println!(
        "Daily Steps ({} to {})",
        bucketing.day_key(&range.start),
        bucketing.day_key(&range.end)
    );
    println!("{}", "=".repeat(50));

    if list.is_empty() {
        println!("No days in this range.");
        return;
    }

    println!("{:<14} {:>10}", "Date", "Steps");
    println!("{}", "-".repeat(50));
    for row in list.rows(bucketing) {
        if row.failed_queries > 0 {
            println!(
                "{:<14} {:>10}   ({} of {} hours unavailable)",
                row.date, row.total_steps, row.failed_queries, HOURS_PER_DAY
            );
        } else {
            println!("{:<14} {:>10}", row.date, row.total_steps);
        }
    }
    println!("{}", "-".repeat(50));
    println!("{:<14} {:>10}", "Total", list.total_steps());
}

fn print_hours(hours: &HourList) {
    println!("{:<6} {:>10}", "Hour", "Steps");
    println!("{}", "-".repeat(30));
    for row in hours.rows() {
        println!("{:<6} {:>10}", row.hour, row.steps);
    }
}

fn print_gaps(failed_queries: u32) {
    if failed_queries > 0 {
        println!(
            "\n{} of {} hours could not be read.",
            failed_queries, HOURS_PER_DAY
        );
    }
}

fn export_to_json<Tz: TimeZone>(
    bucketing: &DateBucketing<Tz>,
    from: &str,
    to: &str,
    list: &DayList,
) -> Result<String> {
    let days: Vec<serde_json::Value> = list
        .records()
        .iter()
        .map(|record| {
            let hours: Vec<serde_json::Value> = HourList::new(bucketing, record)
                .entries()
                .iter()
                .map(|h| {
                    serde_json::json!({
                        "hour_key": h.hour_key,
                        "hour": h.hour_label(),
                        "steps": h.steps,
                    })
                })
                .collect();

            serde_json::json!({
                "date": bucketing.day_key(&record.day),
                "day": record.day,
                "total_steps": record.total_steps(),
                "failed_queries": record.failed_queries,
                "hours": hours,
            })
        })
        .collect();

    let export_data = serde_json::json!({
        "period": {
            "from": from,
            "to": to,
        },
        "locale": bucketing.locale(),
        "days": days,
    });
    Ok(serde_json::to_string_pretty(&export_data)?)
}

fn export_to_csv<Tz: TimeZone>(
    bucketing: &DateBucketing<Tz>,
    from: &str,
    to: &str,
    list: &DayList,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Stride Step Export: {} to {}\n\n", from, to));

    output.push_str("# Daily Totals\n");
    output.push_str("date,total_steps,failed_queries\n");
    for row in list.rows(bucketing) {
        output.push_str(&format!(
            "{},{},{}\n",
            row.date, row.total_steps, row.failed_queries
        ));
    }

    output.push_str("\n# Hourly Counts\n");
    output.push_str("date,hour,steps\n");
    for record in list.records() {
        let date = bucketing.day_key(&record.day);
        for row in HourList::new(bucketing, record).rows() {
            output.push_str(&format!("{},{},{}\n", date, row.hour, row.steps));
        }
    }

    output
}
