// Scan sources: scan logs, manual codes and the standard input.

use std::io::BufRead;

use stock_tally::capture::{Capture, CaptureOutcome, Decoder, ScanStation};

use crate::tally::{io_common::simplify_file_name, *};

/// Reads a scan log as a single capture. The path is the capture id.
pub fn read_capture(path: &str) -> TallyResult<Capture> {
    info!("Attempting to read scan log {:?}", path);
    let payload = fs::read(path).context(OpeningFileSnafu { path })?;
    Ok(Capture {
        id: path.to_string(),
        payload,
    })
}

/// Feeds all the scan logs into the engine. Returns the number of codes recorded.
pub fn record_scan_logs<D: Decoder>(
    engine: &mut ReconciliationEngine,
    station: &mut ScanStation<D>,
    paths: &[String],
) -> TallyResult<u64> {
    let mut recorded: u64 = 0;
    for path in paths.iter() {
        let capture = read_capture(path)?;
        match station.process(engine, &capture) {
            CaptureOutcome::Recorded(feedback) => {
                recorded += feedback.iter().map(|f| f.added).sum::<u64>();
            }
            CaptureOutcome::NothingDecoded => {
                warn!("No code found in {}", simplify_file_name(path));
            }
            CaptureOutcome::AlreadyProcessed => {
                warn!(
                    "{} was given twice in a row, counting it once",
                    simplify_file_name(path)
                );
            }
        }
    }
    Ok(recorded)
}

/// Records codes typed by hand. Returns the number of codes recorded.
pub fn record_manual_codes(engine: &mut ReconciliationEngine, codes: &[String]) -> u64 {
    let mut recorded: u64 = 0;
    for code in codes.iter() {
        match engine.record(code) {
            Some(count) => {
                info!("Added manually: {} (new count: {})", code.trim(), count);
                recorded += 1;
            }
            None => {
                warn!("Skipping blank manual code {:?}", code);
            }
        }
    }
    recorded
}

/// Records one code per line until the end of the input.
pub fn record_lines<R: BufRead>(engine: &mut ReconciliationEngine, reader: R) -> TallyResult<u64> {
    let mut recorded: u64 = 0;
    for line_r in reader.lines() {
        let line = line_r.context(ReadingInputSnafu {})?;
        if let Some(count) = engine.record(&line) {
            info!("Added: {} (new count: {})", line.trim(), count);
            recorded += 1;
        }
    }
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use stock_tally::capture::TextDecoder;

    #[test]
    fn manual_and_stdin() {
        let mut engine = ReconciliationEngine::new();
        let n = record_manual_codes(&mut engine, &["A".to_string(), " ".to_string(), " A ".to_string()]);
        assert_eq!(n, 2);
        let n = record_lines(&mut engine, Cursor::new("B\n\nA\r\n  \nC")).unwrap();
        assert_eq!(n, 3);
        assert_eq!(engine.count("A"), 3);
        assert_eq!(engine.count("B"), 1);
        assert_eq!(engine.count("C"), 1);
    }

    #[test]
    fn scan_logs() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = dir.path().join("aisle1.txt").display().to_string();
        let p2 = dir.path().join("aisle2.txt").display().to_string();
        fs::write(&p1, "A\nB\nA\n").unwrap();
        fs::write(&p2, "\n\n").unwrap();

        let mut engine = ReconciliationEngine::new();
        let mut station = ScanStation::new(TextDecoder);
        let paths = vec![p1.clone(), p1.clone(), p2, p1];
        let n = record_scan_logs(&mut engine, &mut station, &paths).unwrap();
        // The repeated file is skipped once, the empty log records nothing.
        assert_eq!(n, 6);
        assert_eq!(engine.count("A"), 4);
        assert_eq!(engine.count("B"), 2);
    }

    #[test]
    fn missing_scan_log() {
        let mut engine = ReconciliationEngine::new();
        let mut station = ScanStation::new(TextDecoder);
        let res = record_scan_logs(
            &mut engine,
            &mut station,
            &["/nonexistent/scans.txt".to_string()],
        );
        assert!(matches!(res, Err(TallyError::OpeningFile { .. })));
    }
}
