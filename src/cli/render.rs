//! Text rendering of estimates, metrics and the dataset report

use colored::*;

use super::{accent, dim, muted, ok, section};
use crate::data::{Dataset, ExerciseInput, FeatureMatrix, Gender, GENDER_COLUMN};
use crate::error::Result;
use crate::stats::{self, ColumnSummary, Histogram};
use crate::training::EvaluationMetrics;

/// Columns plotted as histograms
const HISTOGRAM_COLUMNS: [&str; 3] = ["Age", "Height", "Weight"];
const BAR_WIDTH: usize = 40;
const CELL: usize = 11;

pub fn estimate(input: &ExerciseInput, kcal: f64) {
    println!();
    println!(
        "  {} {}, {} yrs, {} cm, {} kg, {} min at {} bpm, {} °C",
        muted("input"),
        input.gender,
        input.age,
        input.height,
        input.weight,
        input.duration,
        input.heart_rate,
        input.body_temp
    );
    println!();
    println!(
        "  {} {}",
        "Estimated Calories Burned:".white().bold(),
        ok(&format!("{kcal:.2} kcal")).bold()
    );
    println!();
}

pub fn metrics(metrics: &EvaluationMetrics) {
    println!("  {:<22} {}", muted("R² Score"), accent(&format!("{:.2}", metrics.r2)));
    println!("  {:<22} {}", muted("Mean Absolute Error"), accent(&format!("{:.2}", metrics.mae)));
    println!();
}

/// Preview, summary table, gender counts and histograms
pub fn dataset_report(dataset: &Dataset, rows: usize, bins: usize) -> Result<()> {
    section("Preview");
    preview(dataset, rows)?;

    section("Summary");
    summary_table(&stats::describe(dataset)?);

    section("Gender");
    let gender = dataset.column_values(GENDER_COLUMN)?;
    let counts: Vec<(String, usize)> = stats::category_counts(&gender)
        .into_iter()
        .map(|(code, n)| (gender_label(code), n))
        .collect();
    bars(&counts);

    for column in HISTOGRAM_COLUMNS {
        section(&format!("{column} distribution"));
        let values = dataset.column_values(column)?;
        histogram(&stats::histogram(&values, bins)?);
    }
    println!();
    Ok(())
}

fn gender_label(code: f64) -> String {
    if code == Gender::Male.encode() {
        Gender::Male.to_string()
    } else if code == Gender::Female.encode() {
        Gender::Female.to_string()
    } else {
        format!("{code}")
    }
}

fn preview(dataset: &Dataset, rows: usize) -> Result<()> {
    let columns = dataset.column_names();
    let head = FeatureMatrix::from_frame(&dataset.head(rows), &columns)?;

    let header: String = columns.iter().map(|c| format!("{:>CELL$}", truncate(c))).collect();
    println!("  {}", header.white().bold());
    for row in head.values().rows() {
        let line: String = row.iter().map(|v| format!("{:>CELL$}", format_value(*v))).collect();
        println!("  {line}");
    }
    println!("  {}", dim(&format!("{} of {} rows", head.nrows(), dataset.len())));
    Ok(())
}

fn summary_table(summaries: &[ColumnSummary]) {
    let header: String = summaries
        .iter()
        .map(|s| format!("{:>CELL$}", truncate(&s.name)))
        .collect();
    println!("  {:<6}{}", "", header.white().bold());

    let row = |label: &str, pick: fn(&ColumnSummary) -> f64| {
        let cells: String = summaries
            .iter()
            .map(|s| format!("{:>CELL$}", format_value(pick(s))))
            .collect();
        println!("  {:<6}{}", muted(label), cells);
    };

    row("count", |s| s.count as f64);
    row("mean", |s| s.mean);
    row("std", |s| s.std);
    row("min", |s| s.min);
    row("25%", |s| s.q25);
    row("50%", |s| s.median);
    row("75%", |s| s.q75);
    row("max", |s| s.max);
}

fn bars(counts: &[(String, usize)]) {
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (label, n) in counts {
        println!("  {:<16} {} {}", label, accent(&bar(*n, max)), dim(&n.to_string()));
    }
}

fn histogram(hist: &Histogram) {
    let max = hist.max_count();
    for (i, n) in hist.counts.iter().enumerate() {
        let label = format!("{:.1}–{:.1}", hist.edges[i], hist.edges[i + 1]);
        println!("  {:<16} {} {}", muted(&label), accent(&bar(*n, max)), dim(&n.to_string()));
    }
}

fn bar(n: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (n * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(name: &str) -> String {
    name.chars().take(CELL - 1).collect()
}
