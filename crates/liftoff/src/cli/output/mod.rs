//! Output formatting utilities

use console::{style, Style};

use liftoff_core::types::UploadStatus;
use liftoff_core::workflow::{ReleasePlan, ReleaseReport, RunOutcome};

use super::OutputFormat;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths and URLs
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Escape a message for a GitHub Actions workflow command
pub fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Print the result of a release run
pub fn print_outcome(
    outcome: &RunOutcome,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Github => print_github(outcome),
        OutputFormat::Text => {
            if !quiet {
                print_text(outcome);
            }
        }
    }
    Ok(())
}

fn print_text(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Untagged => info("No tag found on the current commit, nothing to release"),
        RunOutcome::Released(report) => print_report(report),
        RunOutcome::Planned(plan) => print_plan(plan),
    }
}

fn print_report(report: &ReleaseReport) {
    println!();
    println!("{}", header("Release"));
    println!(
        "{}",
        key_value("Tag", &tag_style().apply_to(&report.tag).to_string())
    );
    println!("{}", key_value("Id", &report.release.id.to_string()));
    println!(
        "{}",
        key_value(
            "URL",
            &path_style().apply_to(&report.release.html_url).to_string()
        )
    );
    println!();

    for upload in &report.uploads {
        match &upload.status {
            UploadStatus::Uploaded(asset) => {
                success(&format!("{} ({} bytes)", upload.file_name, asset.size))
            }
            UploadStatus::Failed(message) => {
                warning(&format!("{}: {}", upload.file_name, message))
            }
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "  {}",
            style(format!("{} file(s) skipped by asset policy", report.skipped.len())).dim()
        );
    }

    println!();
    let failed = report.failed_uploads().count();
    if failed == 0 {
        success(&format!(
            "Released {} with {} asset(s)",
            style(&report.tag).yellow(),
            report.uploads.len()
        ));
    } else {
        warning(&format!(
            "Released {} but {} of {} asset(s) failed to upload",
            style(&report.tag).yellow(),
            failed,
            report.uploads.len()
        ));
    }
}

fn print_plan(plan: &ReleasePlan) {
    println!();
    println!("{}", header("Release Preview"));
    println!(
        "{}",
        key_value("Tag", &tag_style().apply_to(&plan.request.tag).to_string())
    );
    println!("{}", key_value("Title", &plan.request.title));
    println!("{}", key_value("Draft", &plan.request.draft.to_string()));
    println!(
        "{}",
        key_value("Prerelease", &plan.request.prerelease.to_string())
    );
    println!();
    println!("{}", style("Body").dim());
    for line in plan.request.body.lines() {
        println!("  {}", line);
    }
    println!();

    for asset in &plan.assets {
        info(&format!(
            "would upload {} ({} bytes, {})",
            asset.file_name, asset.size_bytes, asset.mime_type
        ));
    }
    for asset in &plan.skipped {
        println!("  {}", style(format!("skip {}", asset.file_name)).dim());
    }
    println!();
    println!("  {}", style("[DRY RUN - no release created]").yellow().bold());
}

fn print_github(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Untagged => println!("::notice::No tag found, release skipped"),
        RunOutcome::Released(report) => {
            for upload in report.failed_uploads() {
                if let UploadStatus::Failed(message) = &upload.status {
                    println!(
                        "::warning::{}",
                        escape_workflow_data(&format!(
                            "Failed to upload {}: {}",
                            upload.file_name, message
                        ))
                    );
                }
            }
            println!(
                "::notice::Created release {} ({})",
                escape_workflow_data(&report.tag),
                report.release.html_url
            );
        }
        RunOutcome::Planned(plan) => println!(
            "::notice::Dry run for {}: {} asset(s) would be uploaded",
            escape_workflow_data(&plan.request.tag),
            plan.assets.len()
        ),
    }
}
