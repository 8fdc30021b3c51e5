// Writing and reading back reports.

use std::io::Write;

use rust_xlsxwriter::{Color, Format, Workbook};

use crate::tally::*;

/// The columns of an exported report, in order.
pub const REPORT_COLUMNS: [&str; 4] = ["identifier", "expected", "observed", "delta"];

pub fn write_report(report: &Report, target: &OutputTarget) -> TallyResult<()> {
    let path = target.path.as_deref().filter(|p| !is_stdout(p));
    info!(
        "Writing report ({} rows) as {:?} to {}",
        report.len(),
        target.format,
        path.unwrap_or("stdout")
    );
    match (target.format, path) {
        (ReportFormat::Xlsx, Some(p)) => write_xlsx(report, p),
        (ReportFormat::Xlsx, None) => {
            whatever!("An Excel report cannot be written to the standard output, use --out")
        }
        (ReportFormat::Csv, Some(p)) => {
            let file = fs::File::create(p).context(WritingFileSnafu { path: p })?;
            write_csv(report, file, p)
        }
        (ReportFormat::Csv, None) => write_csv(report, std::io::stdout(), "stdout"),
        (ReportFormat::Json, p) => {
            let js = report_to_json(report);
            let pretty_js = serde_json::to_string_pretty(&js).context(SerializingJsonSnafu {})?;
            write_text(&pretty_js, p)
        }
        (ReportFormat::Text, p) => write_text(&render_text(report), p),
    }
}

fn write_text(content: &str, path: Option<&str>) -> TallyResult<()> {
    match path {
        Some(p) => fs::write(p, content).context(WritingFileSnafu { path: p }),
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", content).context(WritingFileSnafu { path: "stdout" })
        }
    }
}

pub fn write_csv<W: Write>(report: &Report, writer: W, path: &str) -> TallyResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(REPORT_COLUMNS)
        .context(WritingCsvSnafu { path })?;
    for row in report.rows.iter() {
        wtr.write_record(&[
            row.identifier.clone(),
            row.expected.to_string(),
            row.observed.to_string(),
            row.delta.to_string(),
        ])
        .context(WritingCsvSnafu { path })?;
    }
    wtr.flush().context(WritingFileSnafu { path })?;
    Ok(())
}

pub fn report_to_csv_string(report: &Report) -> TallyResult<String> {
    let mut buffer: Vec<u8> = Vec::new();
    write_csv(report, &mut buffer, "memory")?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// Writes the report in a single worksheet. Shortages are shown in red and surpluses in blue.
pub fn write_xlsx(report: &Report, path: &str) -> TallyResult<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let shortage_format = Format::new().set_font_color(Color::Red);
    let surplus_format = Format::new().set_font_color(Color::Blue);
    let plain_format = Format::new();

    let worksheet = workbook
        .add_worksheet()
        .set_name("report")
        .context(WritingExcelSnafu { path })?;

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .context(WritingExcelSnafu { path })?;
    }
    for (idx, row) in report.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        let delta_format = match row.status() {
            DeltaStatus::Shortage => &shortage_format,
            DeltaStatus::Match => &plain_format,
            DeltaStatus::Surplus => &surplus_format,
        };
        worksheet
            .write_string(row_num, 0, &row.identifier)
            .context(WritingExcelSnafu { path })?;
        worksheet
            .write_number(row_num, 1, row.expected as f64)
            .context(WritingExcelSnafu { path })?;
        worksheet
            .write_number(row_num, 2, row.observed as f64)
            .context(WritingExcelSnafu { path })?;
        worksheet
            .write_number_with_format(row_num, 3, row.delta as f64, delta_format)
            .context(WritingExcelSnafu { path })?;
    }

    workbook.save(path).context(WritingExcelSnafu { path })?;
    Ok(())
}

pub fn report_to_json(report: &Report) -> JSValue {
    let rows: Vec<JSValue> = report
        .rows
        .iter()
        .map(|row| {
            json!({
                "identifier": row.identifier,
                "expected": row.expected,
                "observed": row.observed,
                "delta": row.delta,
            })
        })
        .collect();
    json!({
        "rows": rows,
        "summary": {
            "totalExpected": report.total_expected(),
            "totalObserved": report.total_observed(),
            "shortages": report.count_status(DeltaStatus::Shortage),
            "matches": report.count_status(DeltaStatus::Match),
            "surpluses": report.count_status(DeltaStatus::Surplus),
        }
    })
}

fn status_label(status: DeltaStatus) -> &'static str {
    match status {
        DeltaStatus::Shortage => "missing",
        DeltaStatus::Match => "ok",
        DeltaStatus::Surplus => "surplus",
    }
}

/// A table for the terminal.
pub fn render_text(report: &Report) -> String {
    if report.is_empty() {
        return "No data to display.".to_string();
    }
    let mut lines: Vec<[String; 5]> = vec![[
        REPORT_COLUMNS[0].to_string(),
        REPORT_COLUMNS[1].to_string(),
        REPORT_COLUMNS[2].to_string(),
        REPORT_COLUMNS[3].to_string(),
        "status".to_string(),
    ]];
    for row in report.rows.iter() {
        lines.push([
            row.identifier.clone(),
            row.expected.to_string(),
            row.observed.to_string(),
            row.delta.to_string(),
            status_label(row.status()).to_string(),
        ]);
    }
    let mut widths = [0usize; 5];
    for line in lines.iter() {
        for (w, cell) in widths.iter_mut().zip(line.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for line in lines.iter() {
        // Identifier and status are left-aligned, the numbers right-aligned.
        let rendered = format!(
            "{:<w0$}  {:>w1$}  {:>w2$}  {:>w3$}  {}",
            line[0],
            line[1],
            line[2],
            line[3],
            line[4],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
        out.push_str(rendered.trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} item(s): {} missing, {} ok, {} surplus. Expected {}, scanned {}.",
        report.len(),
        report.count_status(DeltaStatus::Shortage),
        report.count_status(DeltaStatus::Match),
        report.count_status(DeltaStatus::Surplus),
        report.total_expected(),
        report.total_observed()
    ));
    out
}

/// Reads a report written in CSV, keeping the order of the rows.
pub fn read_report_csv(path: &str) -> TallyResult<Vec<ReportRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let table = io_csv::read_records(rdr, path)?;
    report_rows_from_table(&table, path)
}

pub fn report_rows_from_table(table: &RawTable, path: &str) -> TallyResult<Vec<ReportRow>> {
    let header: Vec<String> = table
        .rows
        .first()
        .map(|r| r.iter().map(|c| c.as_text().trim().to_lowercase()).collect())
        .unwrap_or_default();
    let mut col_indexes: Vec<usize> = Vec::new();
    for name in REPORT_COLUMNS.iter() {
        let idx = header
            .iter()
            .position(|h| h == name)
            .context(ReportParseSnafu {
                path,
                lineno: 1usize,
                message: format!("missing column {}", name),
            })?;
        col_indexes.push(idx);
    }

    let mut rows: Vec<ReportRow> = Vec::new();
    for (idx, line) in table.rows.iter().enumerate().skip(1) {
        let lineno = idx + 1;
        let field = |col: usize| -> String {
            line.get(col_indexes[col])
                .map(|c| c.as_text())
                .unwrap_or_default()
        };
        let number = |col: usize| -> TallyResult<i64> {
            let s = field(col);
            s.trim().parse::<i64>().ok().context(ReportParseSnafu {
                path,
                lineno,
                message: format!("{} is not a whole number: {:?}", REPORT_COLUMNS[col], s),
            })
        };
        let expected = number(1)?;
        let observed = number(2)?;
        if expected < 0 || observed < 0 {
            return ReportParseSnafu {
                path,
                lineno,
                message: "counts cannot be negative".to_string(),
            }
            .fail();
        }
        let row = ReportRow::new(&field(0), expected as u64, observed as u64);
        let delta = number(3)?;
        if delta != row.delta {
            return ReportParseSnafu {
                path,
                lineno,
                message: format!(
                    "delta {} does not match observed - expected = {}",
                    delta, row.delta
                ),
            }
            .fail();
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        let reference = ReferenceTable::from_entries(vec![("A", 5), ("B", 2), ("Z, wide", 1)]);
        let mut engine = ReconciliationEngine::new();
        engine.record_batch(["A", "A", "A", "B", "B", "C", "Z, wide"]);
        engine.build_report(Some(&reference))
    }

    #[test]
    fn csv_round_trip() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv").display().to_string();
        write_report(
            &report,
            &OutputTarget {
                path: Some(path.clone()),
                format: ReportFormat::Csv,
            },
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("identifier,expected,observed,delta\nA,5,3,-2\n"));
        let rows = read_report_csv(&path).unwrap();
        assert_eq!(rows, report.rows);
    }

    #[test]
    fn xlsx_round_trip() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx").display().to_string();
        write_xlsx(&report, &path).unwrap();

        let table = io_excel::read_excel_table(&path, Some("report")).unwrap();
        let rows = report_rows_from_table(&table, &path).unwrap();
        assert_eq!(rows, report.rows);
    }

    #[test]
    fn json_output() {
        let js = report_to_json(&sample_report());
        assert_eq!(js["rows"][0]["identifier"], "A");
        assert_eq!(js["rows"][0]["delta"], -2);
        assert_eq!(js["rows"].as_array().unwrap().len(), 4);
        assert_eq!(js["summary"]["totalExpected"], 8);
        assert_eq!(js["summary"]["totalObserved"], 7);
        assert_eq!(js["summary"]["surpluses"], 1);
    }

    #[test]
    fn text_table() {
        let text = render_text(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "identifier  expected  observed  delta  status");
        assert_eq!(lines[1], "A                  5         3     -2  missing");
        assert_eq!(lines[4], "C                  0         1      1  surplus");
        assert!(lines[5].starts_with("4 item(s): 1 missing, 2 ok, 1 surplus."));
        assert_eq!(render_text(&Report::default()), "No data to display.");
    }

    #[test]
    fn bad_reports() {
        let parse = |content: &str| {
            let rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(content.as_bytes());
            let table = io_csv::read_records(rdr, "inline.csv").unwrap();
            report_rows_from_table(&table, "inline.csv")
        };
        assert!(matches!(
            parse("identifier,expected,observed\nA,1,1\n"),
            Err(TallyError::ReportParse { lineno: 1, .. })
        ));
        assert!(matches!(
            parse("identifier,expected,observed,delta\nA,1,x,0\n"),
            Err(TallyError::ReportParse { lineno: 2, .. })
        ));
        assert!(matches!(
            parse("identifier,expected,observed,delta\nA,-1,0,1\n"),
            Err(TallyError::ReportParse { lineno: 2, .. })
        ));
        assert!(matches!(
            parse("identifier,expected,observed,delta\nA,1,1,0\nB,5,1,4\n"),
            Err(TallyError::ReportParse { lineno: 3, .. })
        ));
        assert_eq!(parse("identifier,expected,observed,delta\n").unwrap(), vec![]);
    }
}
