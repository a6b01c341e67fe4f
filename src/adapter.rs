//! Producer payload adapters
//!
//! Parses the JSON shapes emitted by the upstream services into the engine's
//! data model: the transcription service's verbose JSON (word-level
//! timestamps preferred, segment-level as fallback) and the visual/acoustic
//! frame logs.
//!
//! The adapter is the validation boundary: structurally broken records
//! (`end < start`, negative timestamps) are rejected here so the engine can
//! assume clean inputs.

use crate::error::FusionError;
use crate::types::{AcousticFrame, AnchorMode, SpeechAnchor, VisualFrame};
use serde::Deserialize;

/// Word-level record from the transcription service
#[derive(Debug, Clone, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Segment-level record from the transcription service
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRecord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Verbose transcription payload.
///
/// Word timestamps are requested from the producer but may be absent; a
/// payload may carry segments only, or neither when transcription failed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Option<Vec<WordRecord>>,
    #[serde(default)]
    pub segments: Option<Vec<SegmentRecord>>,
}

/// Parse a transcription payload JSON string
pub fn parse_transcript(json: &str) -> Result<TranscriptPayload, FusionError> {
    serde_json::from_str(json)
        .map_err(|e| FusionError::ParseError(format!("Failed to parse transcript: {}", e)))
}

/// Extract speech anchors from a transcript payload.
///
/// Prefers word-level timestamps (high precision) and falls back to
/// segment-level (low precision). Returns `None` when the payload carries no
/// timing data at all, which callers treat as a recoverable degenerate case.
pub fn transcript_to_anchors(
    payload: &TranscriptPayload,
) -> Result<Option<(Vec<SpeechAnchor>, AnchorMode)>, FusionError> {
    if let Some(words) = &payload.words {
        let anchors = words
            .iter()
            .map(|w| validate_anchor(SpeechAnchor::new(w.word.clone(), w.start, w.end)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some((anchors, AnchorMode::Word)));
    }

    if let Some(segments) = &payload.segments {
        let anchors = segments
            .iter()
            .map(|s| validate_anchor(SpeechAnchor::new(s.text.clone(), s.start, s.end)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some((anchors, AnchorMode::Segment)));
    }

    Ok(None)
}

fn validate_anchor(anchor: SpeechAnchor) -> Result<SpeechAnchor, FusionError> {
    if anchor.start < 0.0 || anchor.end < 0.0 {
        return Err(FusionError::InvalidAnchor(format!(
            "negative timestamp on \"{}\": {} - {}",
            anchor.text, anchor.start, anchor.end
        )));
    }
    if anchor.end < anchor.start {
        return Err(FusionError::InvalidAnchor(format!(
            "end precedes start on \"{}\": {} - {}",
            anchor.text, anchor.start, anchor.end
        )));
    }
    Ok(anchor)
}

/// Parse a visual frame log JSON array.
///
/// Producer frames carry extra fields (roll, blink state) that the engine
/// does not consume; they are ignored.
pub fn parse_visual_log(json: &str) -> Result<Vec<VisualFrame>, FusionError> {
    let frames: Vec<VisualFrame> = serde_json::from_str(json)
        .map_err(|e| FusionError::ParseError(format!("Failed to parse visual log: {}", e)))?;

    for frame in &frames {
        if frame.timestamp < 0.0 {
            return Err(FusionError::InvalidFrame(format!(
                "negative visual frame timestamp: {}",
                frame.timestamp
            )));
        }
    }

    Ok(frames)
}

/// Parse an acoustic frame log JSON array.
///
/// Producer frames carry a volume field the engine does not consume; it is
/// ignored.
pub fn parse_acoustic_log(json: &str) -> Result<Vec<AcousticFrame>, FusionError> {
    let frames: Vec<AcousticFrame> = serde_json::from_str(json)
        .map_err(|e| FusionError::ParseError(format!("Failed to parse acoustic log: {}", e)))?;

    for frame in &frames {
        if frame.timestamp < 0.0 {
            return Err(FusionError::InvalidFrame(format!(
                "negative acoustic frame timestamp: {}",
                frame.timestamp
            )));
        }
    }

    Ok(frames)
}
