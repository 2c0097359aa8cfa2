//! Command execution for the plagiscan CLI.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::{info, warn};
use walkdir::WalkDir;

use plagiscan::api::engine::LocalEngine;
use plagiscan::api::results::AnalysisRequest;
use plagiscan::core::config::PlagiscanConfig;
use plagiscan::core::errors::PlagiarismResultExt;
use plagiscan::io::ledger::SubmissionLedger;

use crate::cli::args::{
    AnalyzeArgs, BatchArgs, Cli, InitConfigArgs, ListArgs, OutputFormat, ReportArgs, SubmitArgs,
    UploadArgs,
};
use crate::cli::config_layer::{load_configuration, resolve_config_path, CliOverrides};
use crate::cli::output::{
    print_assignments, print_batch, print_health, print_receipt, print_report,
    print_stored_file, print_submissions, BatchEntry,
};

/// Global options every command needs
#[derive(Debug)]
pub struct GlobalOptions {
    pub config_path: Option<PathBuf>,
    pub overrides: CliOverrides,
    pub format: OutputFormat,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            overrides: CliOverrides {
                data_dir: cli.data_dir.clone(),
            },
            format: cli.format,
        }
    }

    async fn open_engine(&self) -> anyhow::Result<LocalEngine> {
        let config = load_configuration(self.config_path.as_deref(), &self.overrides).await?;
        Ok(LocalEngine::open(config)?)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn read_upload(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(bytes)
}

/// Store a file and print its id and metrics
pub async fn upload_command(ctx: &GlobalOptions, args: UploadArgs) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    let bytes = read_upload(&args.path).await?;
    let stored = engine
        .upload(&file_name_of(&args.path), &bytes)
        .with_context(|| format!("uploading {}", args.path.display()))?;
    print_stored_file(&stored, ctx.format)
}

/// Analyze a stored file
pub async fn analyze_command(ctx: &GlobalOptions, args: AnalyzeArgs) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    let request = AnalysisRequest::new(args.file_id, args.student, args.assignment);
    let report = engine.analyze(&request)?;
    print_report(&report, ctx.format)
}

/// Upload and analyze one file
pub async fn submit_command(ctx: &GlobalOptions, args: SubmitArgs) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    let bytes = read_upload(&args.path).await?;
    let receipt = engine.submit(
        &file_name_of(&args.path),
        &bytes,
        &args.student,
        &args.assignment,
    )?;
    print_receipt(&receipt, ctx.format)
}

/// Files under `dir` paired with the student directory they sit in, in path order.
///
/// Files directly inside `dir` have no student and are skipped.
pub fn collect_batch_files(dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir)?;
        let mut components = relative.components();
        let student = components
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        match (student, components.next()) {
            (Some(student), Some(_)) => files.push((student, entry.path().to_path_buf())),
            _ => warn!(
                path = %entry.path().display(),
                "Skipping file outside a student directory"
            ),
        }
    }
    Ok(files)
}

/// Submit every file of a `<dir>/<student>/...` tree
pub async fn batch_command(ctx: &GlobalOptions, args: BatchArgs) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let engine = ctx.open_engine().await?;
    let files = collect_batch_files(&args.dir)?;
    info!(files = files.len(), assignment_id = %args.assignment, "Starting batch");

    let pb = if ctx.format == OutputFormat::Pretty {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template(
            "🔍 {msg} [{bar:40.bright_blue/blue}] {pos}/{len} {elapsed_precise}",
        )?
        .progress_chars("=>-"),
    );
    pb.set_message("Submitting");

    let mut entries = Vec::with_capacity(files.len());
    for (student_id, path) in files {
        let rel_path = path
            .strip_prefix(&args.dir)
            .unwrap_or(&path)
            .display()
            .to_string();

        let outcome = match read_upload(&path).await {
            Ok(bytes) => engine
                .submit(&file_name_of(&path), &bytes, &student_id, &args.assignment)
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        let entry = match outcome {
            Ok(receipt) => BatchEntry {
                path: rel_path,
                student_id,
                receipt: Some(receipt),
                error: None,
            },
            Err(e) => {
                warn!(path = %rel_path, error = %e, "Submission failed");
                BatchEntry {
                    path: rel_path,
                    student_id,
                    receipt: None,
                    error: Some(e.to_string()),
                }
            }
        };
        entries.push(entry);
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_batch(&entries, ctx.format)?;

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} submissions failed", entries.len());
    }
    Ok(())
}

/// Print the report of one submission
pub async fn report_command(ctx: &GlobalOptions, args: ReportArgs) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    let report = engine.report(&args.work_id)?;
    print_report(&report, ctx.format)
}

/// List an assignment's submissions, or all assignments
pub async fn list_command(ctx: &GlobalOptions, args: ListArgs) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    match args.assignment {
        Some(assignment_id) => {
            let submissions = engine.submissions(&assignment_id)?;
            print_submissions(&assignment_id, &submissions, ctx.format)
        }
        None => {
            let assignments = engine
                .ledger()
                .assignments()
                .context("listing assignments")?;
            print_assignments(&assignments, ctx.format)
        }
    }
}

/// Check store and ledger; fails when any check fails
pub async fn health_command(ctx: &GlobalOptions) -> anyhow::Result<()> {
    let engine = ctx.open_engine().await?;
    let health = engine.health();
    print_health(&health, ctx.format)?;
    if !health.healthy {
        anyhow::bail!("health check failed");
    }
    Ok(())
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default plagiscan configuration".dimmed());
    println!(
        "{}",
        "# Save this to .plagiscan.yml or pass it with --config".dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&PlagiscanConfig::default())?;
    println!("{yaml_output}");
    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Configuration file already exists: {}. Use --force to overwrite or choose a different name with --output",
            args.output.display()
        );
    }

    PlagiscanConfig::default().to_yaml_file(&args.output)?;

    println!(
        "{} {}",
        "✅ Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "🔧 Key settings you can customize:".bright_blue().bold());

    #[derive(Tabled)]
    struct CustomizationRow {
        setting: &'static str,
        description: &'static str,
    }

    let rows = vec![
        CustomizationRow {
            setting: "fingerprint.shingle_size",
            description: "Tokens per shingle (default: 5)",
        },
        CustomizationRow {
            setting: "scoring.plagiarism_threshold",
            description: "Scores strictly above this are flagged (default: 0.65)",
        },
        CustomizationRow {
            setting: "scoring.jaccard_weight",
            description: "Weight of shingle overlap (default: 0.8)",
        },
        CustomizationRow {
            setting: "scoring.structural_weight",
            description: "Weight of size similarity (default: 0.2)",
        },
        CustomizationRow {
            setting: "storage.data_dir",
            description: "Uploads and ledger location (default: .plagiscan)",
        },
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}

/// Validate the configuration file given with `--config` (or the implicit one)
pub async fn validate_config(ctx: &GlobalOptions) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let Some(path) = resolve_config_path(ctx.config_path.as_deref(), &cwd) else {
        anyhow::bail!("No configuration file found; pass one with --config");
    };

    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        path.display().to_string().cyan()
    );

    match load_configuration(Some(path.as_path()), &ctx.overrides).await {
        Ok(config) => {
            println!("{}", "✅ Configuration file is valid!".bright_green().bold());

            #[derive(Tabled)]
            struct DetailRow {
                setting: &'static str,
                value: String,
            }

            let rows = vec![
                DetailRow {
                    setting: "shingle_size",
                    value: config.fingerprint.shingle_size.to_string(),
                },
                DetailRow {
                    setting: "weights (jaccard / structural)",
                    value: format!(
                        "{} / {}",
                        config.scoring.jaccard_weight, config.scoring.structural_weight
                    ),
                },
                DetailRow {
                    setting: "plagiarism_threshold",
                    value: config.scoring.plagiarism_threshold.to_string(),
                },
                DetailRow {
                    setting: "data_dir",
                    value: config.storage.data_dir.display().to_string(),
                },
            ];
            let mut table = Table::new(rows);
            table.with(TableStyle::rounded());
            println!("{table}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Configuration validation failed:".red(), e);
            eprintln!(
                "{}",
                "💡 Tip: Use 'plagiscan print-default-config' to see valid format".dimmed()
            );
            Err(e.context("Configuration validation failed"))
        }
    }
}
