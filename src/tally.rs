use log::{debug, info, warn};

use snafu::prelude::*;
use stock_tally::capture::{ScanStation, TextDecoder};
use stock_tally::*;

use std::fs;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;
use crate::tally::io_common::{file_extension, is_stdout, resolve_path};

pub mod config_reader;
pub mod export;
mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_scans;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find worksheet {name:?} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display(
        "The Excel file {path} has several worksheets ({}), the worksheet name must be provided",
        names.join(", ")
    ))]
    TooManyWorksheets { path: String, names: Vec<String> },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error loading the stock file {path}"))]
    Validation {
        source: ValidationError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the input"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Expected a positive number for {field}"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("Error serializing the report"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing Excel report {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error writing CSV report {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid report {path}, line {lineno}: {message}"))]
    ReportParse {
        path: String,
        lineno: usize,
        message: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceKind {
    Xlsx,
    Csv,
}

impl SourceKind {
    fn from_name(name: &str, path: &str) -> TallyResult<SourceKind> {
        match name.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(SourceKind::Xlsx),
            "csv" => Ok(SourceKind::Csv),
            x => whatever!(
                "Cannot read the stock file {} of type {:?}: only xlsx and csv are supported",
                path,
                x
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReportFormat {
    Csv,
    Xlsx,
    Json,
    Text,
}

impl ReportFormat {
    fn from_name(name: &str) -> TallyResult<ReportFormat> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            x => whatever!(
                "Unknown report format {:?}: expected csv, xlsx, json or text",
                x
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReferencePlan {
    pub path: String,
    pub kind: SourceKind,
    pub header_row: Option<usize>,
    pub worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OutputTarget {
    /// None for the standard output.
    pub path: Option<String>,
    pub format: ReportFormat,
}

/// Everything a session needs to run, once the command line and the configuration file
/// have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionPlan {
    pub reference: Option<ReferencePlan>,
    pub scan_paths: Vec<String>,
    pub manual_codes: Vec<String>,
    pub read_stdin: bool,
    pub output: OutputTarget,
    pub check: Option<String>,
}

pub fn plan_session(args: &Args) -> TallyResult<SessionPlan> {
    let (config, root_p) = match args.config.as_deref() {
        Some(config_path) => {
            info!("Reading configuration {:?}", config_path);
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .to_path_buf();
            (config, root_p)
        }
        None => (SessionConfig::default(), Path::new("").to_path_buf()),
    };

    // The stock file
    let config_reference = config.reference_source.clone();
    let reference_path: Option<String> = args.reference.clone().or_else(|| {
        config_reference
            .as_ref()
            .map(|r| resolve_path(&root_p, &r.file_path))
    });
    let reference = match reference_path {
        None => None,
        Some(path) => {
            let kind_name: Option<String> = args
                .reference_type
                .clone()
                .or_else(|| config_reference.as_ref().and_then(|r| r.provider.clone()))
                .or_else(|| file_extension(&path));
            let kind = match kind_name {
                Some(name) => SourceKind::from_name(&name, &path)?,
                None => whatever!(
                    "Cannot guess the type of the stock file {}, use --reference-type",
                    path
                ),
            };
            let header_row = match (args.header_row, config_reference.as_ref()) {
                (Some(x), _) => Some(x),
                (None, Some(r)) => r.header_row_index()?,
                (None, None) => None,
            };
            let worksheet_name = args.excel_worksheet_name.clone().or_else(|| {
                config_reference
                    .as_ref()
                    .and_then(|r| r.excel_worksheet_name.clone())
            });
            Some(ReferencePlan {
                path,
                kind,
                header_row,
                worksheet_name,
            })
        }
    };

    // The scans
    let scan_paths: Vec<String> = if !args.scans.is_empty() {
        args.scans.clone()
    } else {
        let mut paths: Vec<String> = Vec::new();
        for source in config.scan_sources.iter() {
            match source.provider.as_deref() {
                None | Some("text") => paths.push(resolve_path(&root_p, &source.file_path)),
                Some(x) => whatever!("Scan provider not implemented: {:?}", x),
            }
        }
        paths
    };
    let manual_codes: Vec<String> = if !args.code.is_empty() {
        args.code.clone()
    } else {
        config.manual_codes.clone()
    };

    // The report
    let output_settings = config.output_settings.clone().unwrap_or_default();
    let out_path: Option<String> = args
        .out
        .clone()
        .or_else(|| {
            output_settings
                .output_path
                .as_ref()
                .map(|p| if is_stdout(p) { p.clone() } else { resolve_path(&root_p, p) })
        })
        .filter(|p| !is_stdout(p));
    let format_name: Option<String> = args
        .out_type
        .clone()
        .or_else(|| output_settings.output_format.clone())
        .or_else(|| out_path.as_deref().and_then(file_extension));
    let format = match (format_name, &out_path) {
        (Some(name), _) => ReportFormat::from_name(&name)?,
        (None, None) => ReportFormat::Text,
        (None, Some(p)) => whatever!(
            "Cannot guess the format of the report {}, use --out-type",
            p
        ),
    };

    let check = args.check.clone().or_else(|| {
        config
            .expected_report
            .as_ref()
            .map(|p| resolve_path(&root_p, p))
    });

    let plan = SessionPlan {
        reference,
        scan_paths,
        manual_codes,
        read_stdin: args.stdin,
        output: OutputTarget {
            path: out_path,
            format,
        },
        check,
    };
    debug!("plan_session: {:?}", plan);
    Ok(plan)
}

pub fn load_reference(plan: &ReferencePlan) -> TallyResult<ReferenceTable> {
    info!("Attempting to read stock file {:?}", plan.path);
    let table = match plan.kind {
        SourceKind::Xlsx => {
            io_excel::read_excel_table(&plan.path, plan.worksheet_name.as_deref())?
        }
        SourceKind::Csv => io_csv::read_csv_table(&plan.path)?,
    };
    ReferenceTable::load(&table, plan.header_row).context(ValidationSnafu {
        path: plan.path.clone(),
    })
}

/// Runs a full session: loads the stock file, records all the scans, writes the report.
pub fn run_session(args: &Args) -> TallyResult<Report> {
    let plan = plan_session(args)?;

    let reference: Option<ReferenceTable> = match plan.reference.as_ref() {
        Some(reference_plan) => Some(load_reference(reference_plan)?),
        None => {
            warn!("No stock file provided: all the expected counts are 0");
            None
        }
    };

    let mut engine = ReconciliationEngine::new();
    let mut station = ScanStation::new(TextDecoder);
    let scanned = io_scans::record_scan_logs(&mut engine, &mut station, &plan.scan_paths)?;
    let typed = io_scans::record_manual_codes(&mut engine, &plan.manual_codes);
    let read = if plan.read_stdin {
        info!("Reading codes from the standard input, one per line");
        let stdin = std::io::stdin();
        io_scans::record_lines(&mut engine, stdin.lock())?
    } else {
        0
    };
    info!(
        "Recorded {} scanned, {} manual and {} piped code(s): {} distinct identifier(s)",
        scanned,
        typed,
        read,
        engine.len()
    );

    let report = engine.build_report(reference.as_ref());
    export::write_report(&report, &plan.output)?;

    // The reference report, if provided for comparison
    if let Some(check_path) = plan.check.as_deref() {
        check_report(&report, check_path)?;
    }
    Ok(report)
}

/// Compares a report with a report saved earlier in CSV.
pub fn check_report(report: &Report, expected_path: &str) -> TallyResult<()> {
    let expected = Report {
        rows: export::read_report_csv(expected_path)?,
    };
    info!(
        "Comparing the report with {:?} ({} rows)",
        expected_path,
        expected.len()
    );
    if expected != *report {
        let expected_csv = export::report_to_csv_string(&expected)?;
        let computed_csv = export::report_to_csv_string(report)?;
        warn!("Found differences with the expected report");
        print_diff(expected_csv.as_str(), computed_csv.as_str(), "\n");
        whatever!(
            "Difference detected between the computed report and the expected report {}",
            expected_path
        )
    }
    Ok(())
}
