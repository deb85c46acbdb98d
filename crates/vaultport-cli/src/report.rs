use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use vaultport_engine::{UnresolvedRef, UploadReport};

pub const CSV_REPORT: &str = "migration_files_report.csv";
pub const FAILURE_REPORT: &str = "migration_failed_files.txt";

/// Writes the end-of-run reports into `dir`: a CSV covering every file
/// outcome, and a plain-text failure report only when something went wrong.
pub fn write_reports(
    dir: &Path,
    report: &UploadReport,
    unresolved: &[UnresolvedRef],
) -> io::Result<()> {
    write_csv_report(&dir.join(CSV_REPORT), report, unresolved)?;

    if report.failed.is_empty() && unresolved.is_empty() {
        return Ok(());
    }
    write_failure_report(&dir.join(FAILURE_REPORT), report, unresolved)
}

fn write_csv_report(
    path: &PathBuf,
    report: &UploadReport,
    unresolved: &[UnresolvedRef],
) -> io::Result<()> {
    let mut out = String::new();
    csv_row(
        &mut out,
        &[
            "file_path",
            "file_name",
            "status",
            "notion_page_id",
            "notion_file_id",
            "error_reason",
            "referenced_from",
        ],
    );

    for item in &report.uploaded {
        csv_row(
            &mut out,
            &[
                &item.file.display().to_string(),
                &file_name(&item.file),
                "uploaded",
                &item.page,
                &item.file_ref,
                "",
                "",
            ],
        );
    }

    for item in &report.failed {
        csv_row(
            &mut out,
            &[
                &item.file.display().to_string(),
                &file_name(&item.file),
                "upload_failed",
                "",
                "",
                &item.reason,
                "",
            ],
        );
    }

    for item in unresolved {
        csv_row(
            &mut out,
            &[
                "",
                &item.reference,
                "not_found",
                "",
                "",
                "File not found in vault",
                item.note.as_str(),
            ],
        );
    }

    fs::write(path, out)?;
    info!("CSV report written to: {}", path.display());
    info!("  - {} successful uploads", report.uploaded.len());
    info!("  - {} failed uploads", report.failed.len());
    info!("  - {} unresolved references", unresolved.len());
    Ok(())
}

fn write_failure_report(
    path: &PathBuf,
    report: &UploadReport,
    unresolved: &[UnresolvedRef],
) -> io::Result<()> {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Obsidian to Notion Migration - Failed Files Report");
    let _ = writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{rule}\n");

    if !unresolved.is_empty() {
        let _ = writeln!(out, "UNRESOLVED FILE REFERENCES ({})", unresolved.len());
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "These files were referenced but could not be found:\n");
        for item in unresolved {
            let _ = writeln!(out, "  Note: {}", item.note);
            let _ = writeln!(out, "  Reference: {}\n", item.reference);
        }
    }

    if !report.failed.is_empty() {
        let _ = writeln!(out, "\nFAILED UPLOADS ({})", report.failed.len());
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "These files were found but could not be uploaded:\n");
        for item in &report.failed {
            let _ = writeln!(out, "  File: {}", item.file.display());
            let _ = writeln!(out, "  Reason: {}\n", item.reason);
        }
    }

    fs::write(path, out)?;
    info!("Failure report written to: {}", path.display());
    warn!("  - {} unresolved file references", unresolved.len());
    warn!("  - {} failed uploads", report.failed.len());
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn csv_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

/// Quotes a field when it contains a delimiter, quote, or newline. Internal
/// quotes are doubled.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
