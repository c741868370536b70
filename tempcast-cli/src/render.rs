//! Human-friendly output for pipeline results.

use chrono::Timelike;
use tempcast_core::{PipelineConfig, PipelineReport};

pub fn print_report(config: &PipelineConfig, report: &PipelineReport) {
    match &report.evaluation {
        Some(evaluation) => println!(
            "Evaluation over [{}, {}): MAE {:.2}, RMSE {:.2} ({} matched hours)",
            config.train_cutoff, config.test_cutoff, evaluation.mae, evaluation.rmse,
            evaluation.matched,
        ),
        None => println!(
            "Evaluation over [{}, {}): skipped, no ground truth aligned with the forecast",
            config.train_cutoff, config.test_cutoff,
        ),
    }

    println!();
    println!("Forecast for {}:", report.target.date);
    println!("  hour   predicted   interval            actual");

    let actuals = report.target.actuals.observations();
    for point in report.target.forecast.points() {
        let actual = actuals
            .iter()
            .find(|o| o.timestamp == point.timestamp)
            .map_or_else(|| "-".to_string(), |o| format!("{:.1}", o.value));

        println!(
            "  {:02}:00  {:>7.1}    [{:>6.1}, {:>6.1}]    {:>6}",
            point.timestamp.hour(),
            point.predicted,
            point.lower,
            point.upper,
            actual,
        );
    }

    if actuals.is_empty() {
        println!();
        println!("No ground truth is available for {} yet.", report.target.date);
    }
}
