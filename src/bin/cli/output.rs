//! Output formatting for command results.
//!
//! Every printer takes the selected [`OutputFormat`]: `json` writes a single
//! JSON document to stdout, `pretty` writes colored text and tables.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use plagiscan::api::results::{HealthCheckStatus, HealthStatus, SubmissionReceipt};
use plagiscan::core::records::{Report, SubmissionSummary};
use plagiscan::io::content_store::StoredFile;
use plagiscan::io::ledger::AssignmentSummary;

use crate::cli::args::OutputFormat;

/// Serialize `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn flag_label(is_plagiarism: bool) -> String {
    if is_plagiarism {
        "FLAGGED".bright_red().bold().to_string()
    } else {
        "clear".bright_green().to_string()
    }
}

fn score_label(score: f64) -> String {
    format!("{score:.4}")
}

pub fn print_stored_file(stored: &StoredFile, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(stored);
    }

    println!(
        "{} {}",
        "✅ Stored".bright_green().bold(),
        stored.file_name.cyan()
    );

    #[derive(Tabled)]
    struct Row {
        field: &'static str,
        value: String,
    }

    let m = &stored.metrics;
    let rows: Vec<Row> = [
        ("file_id", stored.file_id.clone()),
        ("file_size", stored.file_size.to_string()),
        ("total_lines", m.total_lines.to_string()),
        ("code_lines", m.code_lines.to_string()),
        ("comment_lines", m.comment_lines.to_string()),
        ("comment_ratio", format!("{:.3}", m.comment_ratio)),
    ]
    .into_iter()
    .map(|(field, value)| Row { field, value })
    .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}

fn print_report_body(report: &Report) {
    #[derive(Tabled)]
    struct Row {
        metric: &'static str,
        value: String,
    }

    let matched = report.matched_work_id.clone().unwrap_or_else(|| "-".to_string());
    let rows: Vec<Row> = [
        ("similarity", score_label(report.similarity_score)),
        ("jaccard", score_label(report.jaccard_similarity)),
        ("structural", score_label(report.structural_similarity)),
        ("matched work", matched),
        ("matched shingles", report.matched_shingle_count.to_string()),
    ]
    .into_iter()
    .map(|(metric, value)| Row { metric, value })
    .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
}

pub fn print_report(report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(report);
    }

    println!(
        "{} {} {}",
        "📄 Report".bright_blue().bold(),
        report.report_id.cyan(),
        flag_label(report.is_plagiarism)
    );
    print_report_body(report);
    Ok(())
}

pub fn print_receipt(receipt: &SubmissionReceipt, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(receipt);
    }

    println!(
        "{} {} ({} / {}) {}",
        "🔍 Analyzed".bright_blue().bold(),
        receipt.work_id.cyan(),
        receipt.student_id,
        receipt.assignment_id,
        flag_label(receipt.report.is_plagiarism)
    );
    print_report_body(&receipt.report);
    Ok(())
}

pub fn print_submissions(
    assignment_id: &str,
    submissions: &[SubmissionSummary],
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(submissions);
    }

    if submissions.is_empty() {
        println!("No submissions for {}", assignment_id.cyan());
        return Ok(());
    }

    #[derive(Tabled)]
    struct Row {
        work_id: String,
        student: String,
        shingles: usize,
        similarity: String,
        status: String,
    }

    let rows: Vec<Row> = submissions
        .iter()
        .map(|s| Row {
            work_id: s.work_id.clone(),
            student: s.student_id.clone(),
            shingles: s.shingle_count,
            similarity: s.similarity_score.map_or_else(|| "-".to_string(), score_label),
            status: s.is_plagiarism.map_or_else(|| "-".to_string(), flag_label),
        })
        .collect();

    let flagged = submissions
        .iter()
        .filter(|s| s.is_plagiarism == Some(true))
        .count();

    println!(
        "{} {} ({} submissions, {} flagged)",
        "📊 Assignment".bright_blue().bold(),
        assignment_id.cyan(),
        submissions.len(),
        flagged.to_string().bright_yellow()
    );
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}

pub fn print_assignments(
    assignments: &[AssignmentSummary],
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(assignments);
    }

    if assignments.is_empty() {
        println!("No submissions recorded yet");
        return Ok(());
    }

    #[derive(Tabled)]
    struct Row {
        assignment: String,
        submissions: usize,
    }

    let rows: Vec<Row> = assignments
        .iter()
        .map(|a| Row {
            assignment: a.assignment_id.clone(),
            submissions: a.submissions,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}

pub fn print_health(health: &HealthStatus, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(health);
    }

    if health.healthy {
        println!("{}", "✅ Healthy".bright_green().bold());
    } else {
        println!("{}", "❌ Unhealthy".bright_red().bold());
    }

    #[derive(Tabled)]
    struct Row {
        check: String,
        status: String,
        details: String,
    }

    let rows: Vec<Row> = health
        .checks
        .iter()
        .map(|c| Row {
            check: c.name.clone(),
            status: match c.status {
                HealthCheckStatus::Passed => "passed".bright_green().to_string(),
                HealthCheckStatus::Failed => "failed".bright_red().to_string(),
            },
            details: c.message.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}

/// Per-file outcome of a batch run
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub path: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn print_batch(entries: &[BatchEntry], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(entries);
    }

    #[derive(Tabled)]
    struct Row {
        file: String,
        student: String,
        work_id: String,
        similarity: String,
        matched: String,
        status: String,
    }

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| match &entry.receipt {
            Some(receipt) => Row {
                file: entry.path.clone(),
                student: entry.student_id.clone(),
                work_id: receipt.work_id.clone(),
                similarity: score_label(receipt.report.similarity_score),
                matched: receipt
                    .report
                    .matched_work_id
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                status: flag_label(receipt.report.is_plagiarism),
            },
            None => Row {
                file: entry.path.clone(),
                student: entry.student_id.clone(),
                work_id: "-".to_string(),
                similarity: "-".to_string(),
                matched: "-".to_string(),
                status: entry.error.clone().unwrap_or_default().red().to_string(),
            },
        })
        .collect();

    let flagged = entries
        .iter()
        .filter(|e| e.receipt.as_ref().is_some_and(|r| r.report.is_plagiarism))
        .count();

    println!(
        "{} {} files, {} flagged",
        "✅ Batch complete:".bright_green().bold(),
        entries.len(),
        flagged.to_string().bright_yellow()
    );
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}
