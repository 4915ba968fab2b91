//! Workdays CLI - batch front-end for the workday engine
//!
//! Commands:
//! - transform: consolidate a raw activity log file into workday rows
//! - validate: schema and ordering checks over a raw activity log file,
//!   without producing output

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use workday_engine::{
    CatalogTables, NameCatalog, PipelineConfig, RawActivityRecord, WorkdayProcessor,
    ENGINE_VERSION,
};

/// Workdays - consolidate raw activity logs into workday sessions
#[derive(Parser)]
#[command(name = "workdays")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Consolidate raw app/site activity logs into workday rows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate raw activity records into workday rows (batch mode)
    Transform {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Catalog tables file (JSON: app/site mappings, exclusions, local apps)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Pipeline config file (JSON thresholds and rejection window)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the workday gap threshold in seconds
        #[arg(long)]
        max_workday_gap_secs: Option<i64>,
    },

    /// Check raw activity records for schema and ordering problems
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one row per session)
    Ndjson,
    /// JSON array of rows
    Json,
    /// Pretty-printed JSON array
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Transform {
            input,
            output,
            input_format,
            output_format,
            catalog,
            config,
            max_workday_gap_secs,
        } => cmd_transform(
            &input,
            &output,
            input_format,
            output_format,
            catalog.as_deref(),
            config.as_deref(),
            max_workday_gap_secs,
        ),
        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_transform(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    catalog_path: Option<&Path>,
    config_path: Option<&Path>,
    max_workday_gap_secs: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = read_records(input, input_format)?;

    let tables: CatalogTables = match catalog_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => CatalogTables::default(),
    };
    let mut config: PipelineConfig = match config_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    if let Some(secs) = max_workday_gap_secs {
        config.max_workday_gap_secs = secs;
    }

    let processor = WorkdayProcessor::new(NameCatalog::from_tables(tables), config);
    let rows = processor.process_to_rows(&records)?;

    let rendered = match output_format {
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for row in &rows {
                out.push_str(&serde_json::to_string(row)?);
                out.push('\n');
            }
            out
        }
        OutputFormat::Json => serde_json::to_string(&rows)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&rows)?,
    };

    write_output(output, &rendered)?;
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(input)?;

    let mut total = 0usize;
    let mut errors: Vec<String> = Vec::new();
    let mut parsed: Vec<(String, RawActivityRecord)> = Vec::new();

    match input_format {
        InputFormat::Ndjson => {
            for (lineno, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                total += 1;
                match serde_json::from_str::<RawActivityRecord>(line) {
                    Ok(record) => parsed.push((format!("line {}", lineno + 1), record)),
                    Err(e) => errors.push(format!("line {}: {e}", lineno + 1)),
                }
            }
        }
        InputFormat::Json => match serde_json::from_str::<Vec<RawActivityRecord>>(&text) {
            Ok(records) => {
                total = records.len();
                for (idx, record) in records.into_iter().enumerate() {
                    parsed.push((format!("record {}", idx + 1), record));
                }
            }
            Err(e) => errors.push(e.to_string()),
        },
    }

    let checks = check_records(&parsed);
    errors.extend(checks.errors);
    let out_of_order = checks.out_of_order;

    if as_json {
        let report = serde_json::json!({
            "records": total,
            "errors": errors,
            "out_of_order": out_of_order,
            "valid": errors.is_empty(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{total} records, {} errors, {} out of order",
            errors.len(),
            out_of_order.len()
        );
        for error in &errors {
            println!("  error: {error}");
        }
        for warning in &out_of_order {
            println!("  out of order: {warning}");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

/// Outcome of the record-level checks run after deserialization
#[derive(Debug, Default)]
struct RecordChecks {
    /// Records the pipeline would reject: missing fields, end before start
    errors: Vec<String>,
    /// Per-employee start times that go backwards. The pipeline re-sorts on
    /// entry, so these are reported but do not fail validation.
    out_of_order: Vec<String>,
}

fn check_records(records: &[(String, RawActivityRecord)]) -> RecordChecks {
    let mut checks = RecordChecks::default();
    let mut last_start: HashMap<&str, i64> = HashMap::new();

    for (position, record) in records {
        if record.app.is_none() {
            checks.errors.push(format!("{position}: missing field `app`"));
        }
        let (Some(start), Some(end)) = (record.start, record.end) else {
            let field = if record.start.is_none() { "start" } else { "end" };
            checks
                .errors
                .push(format!("{position}: missing field `{field}`"));
            continue;
        };
        if end < start {
            checks.errors.push(format!(
                "{position}: end {end} is before start {start}"
            ));
        }

        match last_start.get(record.employee_id.as_str()) {
            Some(&previous) if start < previous => {
                checks.out_of_order.push(format!(
                    "{position}: start {start} precedes earlier record for {}",
                    record.employee_id
                ));
            }
            _ => {
                last_start.insert(record.employee_id.as_str(), start);
            }
        }
    }

    checks
}

fn read_records(
    input: &Path,
    input_format: InputFormat,
) -> Result<Vec<RawActivityRecord>, Box<dyn std::error::Error>> {
    let text = read_input(input)?;
    let records = match input_format {
        InputFormat::Ndjson => {
            let mut records = Vec::new();
            for line in text.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                records.push(serde_json::from_str(line)?);
            }
            records
        }
        InputFormat::Json => serde_json::from_str(&text)?,
    };
    Ok(records)
}

fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &Path, content: &str) -> io::Result<()> {
    if path == Path::new("-") {
        io::stdout().write_all(content.as_bytes())
    } else {
        fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_record(employee: &str, start_ms: i64, end_ms: i64) -> RawActivityRecord {
        RawActivityRecord {
            employee_id: employee.to_string(),
            app: Some("notepad.exe".to_string()),
            site: None,
            active: Some(true),
            start: Some(start_ms),
            end: Some(end_ms),
            mouse_clicks: Some(1),
            keystrokes: Some(10),
            mouse_scroll: Some(0),
            mic: Some(false),
            camera: Some(false),
        }
    }

    fn positioned(records: Vec<RawActivityRecord>) -> Vec<(String, RawActivityRecord)> {
        records
            .into_iter()
            .enumerate()
            .map(|(idx, r)| (format!("record {}", idx + 1), r))
            .collect()
    }

    #[test]
    fn test_clean_batch_has_no_findings() {
        let checks = check_records(&positioned(vec![
            make_record("emp-1", 0, 60_000),
            make_record("emp-1", 60_000, 120_000),
        ]));
        assert!(checks.errors.is_empty());
        assert!(checks.out_of_order.is_empty());
    }

    #[test]
    fn test_missing_fields_reported_as_errors() {
        let mut no_app = make_record("emp-1", 0, 60_000);
        no_app.app = None;
        let mut no_end = make_record("emp-1", 60_000, 120_000);
        no_end.end = None;

        let checks = check_records(&positioned(vec![no_app, no_end]));
        assert_eq!(checks.errors.len(), 2);
        assert!(checks.errors[0].contains("`app`"));
        assert!(checks.errors[1].contains("`end`"));
    }

    #[test]
    fn test_end_before_start_reported_as_error() {
        let checks = check_records(&positioned(vec![make_record("emp-1", 60_000, 0)]));
        assert_eq!(checks.errors.len(), 1);
        assert!(checks.errors[0].contains("before start"));
    }

    #[test]
    fn test_backwards_start_reported_out_of_order() {
        let checks = check_records(&positioned(vec![
            make_record("emp-1", 120_000, 180_000),
            make_record("emp-1", 0, 60_000),
        ]));
        assert!(checks.errors.is_empty());
        assert_eq!(checks.out_of_order.len(), 1);
        assert!(checks.out_of_order[0].contains("emp-1"));
    }

    #[test]
    fn test_ordering_tracked_per_employee() {
        // Interleaved employees each stay chronological on their own
        let checks = check_records(&positioned(vec![
            make_record("emp-1", 120_000, 180_000),
            make_record("emp-2", 0, 60_000),
            make_record("emp-1", 180_000, 240_000),
        ]));
        assert!(checks.out_of_order.is_empty());
    }
}
