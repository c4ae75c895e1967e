//! `pcap analyse`: decode a capture into a JSON session report.

use std::fs;
use std::path::{Path, PathBuf};

use aabus_core::{PcapOptions, SessionReport};
use anyhow::Context;
use clap::Args;
use glob::glob;

use crate::CliError;

#[derive(Args, Debug)]
pub struct AnalyseArgs {
    /// Path to a .pcap or .pcapng file (glob patterns must match one file)
    pub input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    pub report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    pub stdout: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    pub compact: bool,

    /// Only decode TCP segments with this port on either side
    #[arg(long, env = "AABUS_PORT")]
    pub port: Option<u16>,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,

    /// Exit with a non-zero code if any message or record was rejected
    #[arg(long)]
    pub strict: bool,

    /// List rejections after analysis
    #[arg(long)]
    pub list_rejections: bool,
}

pub fn cmd_pcap_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = match (&args.report, args.stdout) {
        (_, true) => None,
        (Some(path), false) => {
            ensure_distinct_output(path, &input_abs)?;
            Some(path.clone())
        }
        (None, false) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };

    let options = PcapOptions { port: args.port };
    let rep = aabus_core::analyze_pcap_file(&resolved_input, options)
        .context("PCAP/PCAPNG analysis failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match &report_path {
        None => print!("{}", json),
        Some(path) => write_report(path, &json)?,
    }

    if args.list_rejections && !args.quiet {
        print_rejections(&rep);
    }
    if let Some(path) = &report_path {
        if !args.quiet {
            eprintln!("OK: report written -> {}", path.display());
        }
    }
    if args.strict && rep.summary.rejections > 0 {
        return Err(CliError::new(
            format!("{} rejections detected", rep.summary.rejections),
            Some("use --list-rejections to inspect".to_string()),
        ));
    }
    Ok(())
}

/// `replay --report`: decode a raw dump into the same session report.
pub fn cmd_replay_report(input: &Path, report_path: &Path, pretty: bool) -> Result<(), CliError> {
    if input == Path::new("-") {
        return Err(CliError::new(
            "cannot build a report from stdin",
            Some("save the stream to a file first".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw dump of the bridge stream".to_string()),
        ));
    }
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    ensure_distinct_output(report_path, &input_abs)?;

    let rep = aabus_core::analyze_raw_file(input).context("raw dump analysis failed")?;
    let json = serialize_report(&rep, pretty, false)?;
    write_report(report_path, &json)?;
    eprintln!("OK: report written -> {}", report_path.display());
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let Some(parent) = report_path.parent() else {
        return Ok(());
    };
    let report_dir = if parent.as_os_str().is_empty() {
        fs::canonicalize(".")
    } else {
        fs::canonicalize(parent)
    };
    // A directory that does not exist yet cannot hold the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn write_report(path: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

fn serialize_report(rep: &SessionReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_rejections(rep: &SessionReport) {
    eprintln!("Rejections:");
    for entry in &rep.rejections {
        eprintln!("  {} ({})", entry.kind, entry.count);
        for example in &entry.examples {
            eprintln!("    {}", example);
        }
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file; use `aabus replay` for raw dumps".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut message = format!(
                "multiple files match pattern '{}' ({} matches); matches: ",
                pattern, count
            );
            message.push_str(
                &matches
                    .iter()
                    .take(3)
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if count > 3 {
                message.push_str(", ...");
            }
            Err(CliError::new(
                message,
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
