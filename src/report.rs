use byte_unit::{Byte, UnitType};
use itertools::Itertools;

use crate::{
    functions::{Comparison, CommitRef, RunComparison},
    models::short_id,
    timings::{format_amount, format_timespan},
};

/// Markdown summary of a comparison, suitable for a pull request comment.
pub fn markdown(run: &RunComparison) -> String {
    let results = run
        .benchmarks
        .iter()
        .map(|benchmark| {
            let status_text = benchmark.status_text();
            let percent_change = benchmark.percent_change_text();
            let name = &benchmark.name;
            let value = format_value(benchmark.value, &benchmark.unit);
            let diff = benchmark
                .diff()
                .map(|diff| format_diff(diff, &benchmark.unit))
                .unwrap_or_else(|| "-".into());
            format!("| {name} | {value} ({diff}) | {percent_change} | {status_text} |")
        })
        .join("\n");

    let results = if results.is_empty() {
        "No benchmarks were found. Check your CI workflows.".into()
    } else {
        format!(
            "| Name | Value (change) | Change (%) | Outcome |\n\
             | ---- | -------------- | ---------- | ------- |\n\
             {results}\n"
        )
    };

    let current = commit_line(&run.current);
    let previous = run
        .previous
        .as_ref()
        .map(commit_line)
        .unwrap_or_else(|| "none".into());

    let mut body = format!(
        "# Benchmarks\n\n\
         Suite: {}\n\
         Commit: {current}\n\
         Previous: {previous}\n\n\
         {results}",
        run.suite
    );

    let alerts = run.alerts().collect_vec();
    if !alerts.is_empty() {
        body.push_str(&alert_section(&alerts, run.threshold));
    }
    body
}

fn alert_section(alerts: &[&Comparison], threshold: f64) -> String {
    let rows = alerts
        .iter()
        .map(|alert| {
            let previous = alert
                .previous
                .map(|previous| format_value(previous, &alert.unit))
                .unwrap_or_default();
            let ratio = alert.ratio().unwrap_or_default();
            format!(
                "| {} | {previous} | {} | {ratio:.2} |",
                alert.name,
                format_value(alert.value, &alert.unit)
            )
        })
        .join("\n");
    format!(
        "\n## Possible regressions\n\n\
         Benches more than {threshold}x worse than the previous commit:\n\n\
         | Name | Previous | Current | Ratio |\n\
         | ---- | -------- | ------- | ----- |\n\
         {rows}\n"
    )
}

fn commit_line(commit: &CommitRef) -> String {
    format!("[{}]({}) {}", short_id(&commit.id), commit.url, commit.summary)
}

/// Human rendering of a measured value according to its unit.
pub fn format_value(value: f64, unit: &str) -> String {
    match unit {
        "ns" if value >= 1000.0 => format_timespan(value.round() as u64),
        "bytes" if value >= 0.0 => {
            let bytes = Byte::from_u64(value.round() as u64);
            format!("{:.2}", bytes.get_appropriate_unit(UnitType::Binary))
        }
        "amount" if value >= 0.0 && value.fract() == 0.0 => format_amount(value as u64),
        "amount" => format!("{value}"),
        _ => format!("{value} {unit}"),
    }
}

fn format_diff(diff: f64, unit: &str) -> String {
    let sign = if diff < 0.0 { "-" } else { "+" };
    format!("{sign}{}", format_value(diff.abs(), unit))
}
