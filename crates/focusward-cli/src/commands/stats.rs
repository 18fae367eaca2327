use clap::Args;
use focusward_core::stats::{format_hours_minutes, format_minutes, StatsRange, StatsReport};
use focusward_core::storage::{load_sessions, Database};

#[derive(Args)]
pub struct StatsArgs {
    /// today, last-7-days (7d), last-30-days (30d) or all
    #[arg(long, default_value_t = StatsRange::default())]
    range: StatsRange,
    /// Print a short human-readable summary instead of JSON
    #[arg(long)]
    summary: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let sessions = load_sessions(&db);
    let report = StatsReport::compute_local(&sessions, args.range);

    if args.summary {
        print_summary(&report);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn print_summary(report: &StatsReport) {
    println!("range: {}", report.range);
    println!("sessions: {}", report.session_count);
    println!("focus time: {}", format_hours_minutes(report.total_secs as f64));
    println!("average session: {}", format_minutes(report.average_session_secs));
    println!("average distractions: {:.1}", report.average_distractions);
    println!("today: {}", format_hours_minutes(report.today_total_secs as f64));
    println!("all time: {}", format_hours_minutes(report.all_time_total_secs as f64));
    for entry in &report.category_minutes {
        println!(
            "  {}: {}",
            entry.category,
            format_hours_minutes(entry.minutes * 60.0)
        );
    }
}
