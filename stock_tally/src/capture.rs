/*!
Capture sources.

A capture is anything that may carry item codes: a photo of several QR labels, a video
frame, the buffer of a handheld scanner. How the codes are extracted from the capture is
the business of a [Decoder]; the tally only sees the decoded strings.
*/
use log::{debug, info, warn};

use crate::config::ScanFeedback;
use crate::ReconciliationEngine;

/// Turns the payload of a capture into zero or more item codes.
pub trait Decoder {
    fn decode(&self, payload: &[u8]) -> Vec<String>;
}

/// Decodes text payloads, one code per line.
///
/// This is the output format of keyboard-style barcode scanners and of most command line
/// QR decoders. A payload that is not valid UTF-8 decodes to nothing.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&self, payload: &[u8]) -> Vec<String> {
        match std::str::from_utf8(payload) {
            Ok(text) => text
                .lines()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(|l| l.to_string())
                .collect(),
            Err(e) => {
                warn!("TextDecoder: payload is not valid text: {}", e);
                vec![]
            }
        }
    }
}

/// One capture event.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Capture {
    /// Identifies the capture, so that the same capture is not counted twice.
    pub id: String,
    pub payload: Vec<u8>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CaptureOutcome {
    /// The codes found in the capture, as recorded.
    Recorded(Vec<ScanFeedback>),
    NothingDecoded,
    /// The capture was the same as the previous one and was skipped.
    AlreadyProcessed,
}

/// Feeds captures into a tally.
///
/// Front ends tend to resubmit the last capture (a page refresh, a camera widget that keeps
/// its last photo). The station remembers the id of the last capture it processed and
/// skips it if it comes again right away.
#[derive(Debug, Clone)]
pub struct ScanStation<D: Decoder> {
    decoder: D,
    last_capture_id: Option<String>,
}

impl<D: Decoder> ScanStation<D> {
    pub fn new(decoder: D) -> ScanStation<D> {
        ScanStation {
            decoder,
            last_capture_id: None,
        }
    }

    pub fn process(
        &mut self,
        engine: &mut ReconciliationEngine,
        capture: &Capture,
    ) -> CaptureOutcome {
        if self.last_capture_id.as_deref() == Some(capture.id.as_str()) {
            debug!("process: capture {:?} already processed", capture.id);
            return CaptureOutcome::AlreadyProcessed;
        }
        self.last_capture_id = Some(capture.id.clone());

        let codes = self.decoder.decode(&capture.payload);
        debug!("process: capture {:?} decoded {:?}", capture.id, codes);
        let feedback = engine.record_batch(codes);
        if feedback.is_empty() {
            warn!("No code could be read from capture {:?}", capture.id);
            CaptureOutcome::NothingDecoded
        } else {
            let summary: Vec<String> = feedback
                .iter()
                .map(|f| format!("{} (+{}, new count: {})", f.identifier, f.added, f.total))
                .collect();
            info!("Scanned from {}: {}", capture.id, summary.join("; "));
            CaptureOutcome::Recorded(feedback)
        }
    }

    /// Forgets the last capture. To be called along with clearing the tally.
    pub fn reset(&mut self) {
        self.last_capture_id = None;
    }
}
