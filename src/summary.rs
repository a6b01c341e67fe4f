//! Whole-response aggregates
//!
//! This module computes the response-level metrics that sit next to the
//! timeline in the encoded payload: speaking rate, voiced pitch statistics,
//! gaze and head-pose percentages, and pause totals.

use crate::classify::modal;
use crate::types::{
    AcousticFrame, Emotion, GazeDirection, ResponseSummary, SpeechAnchor, Timeline, TimelineEvent,
    VisualFrame,
};

/// A pause longer than this (seconds) reads as freezing under cognitive load
pub const FREEZE_PAUSE_SEC: f64 = 3.0;

/// Per-frame pose magnitude (degrees) counted toward nod/shake percentages.
///
/// Deliberately looser than the windowed-mean threshold used for posture
/// classification: single frames are noisier than window means.
const POSE_FRAME_THRESHOLD_DEG: f64 = 15.0;

/// Summarizer for whole-response aggregate metrics
pub struct ResponseSummarizer;

impl ResponseSummarizer {
    /// Compute aggregates over the full response.
    ///
    /// `timeline` must be the fused output for the same inputs; pause totals
    /// are read from it rather than recomputed.
    pub fn summarize(
        anchors: &[SpeechAnchor],
        visual: &[VisualFrame],
        acoustic: &[AcousticFrame],
        timeline: &Timeline,
    ) -> ResponseSummary {
        let (voiced_mean, voiced_stddev) = voiced_pitch_stats(acoustic);
        let (pause_count, total_pause_sec, longest_pause_sec) = pause_stats(timeline);

        ResponseSummary {
            words_per_minute: words_per_minute(anchors, acoustic),
            voiced_pitch_mean_hz: voiced_mean,
            voiced_pitch_stddev_hz: voiced_stddev,
            screen_gaze_pct: screen_gaze_pct(visual),
            dominant_emotion: dominant_emotion(visual),
            nodding_pct: pose_pct(visual, |f| f.pitch),
            shaking_pct: pose_pct(visual, |f| f.yaw),
            pause_count,
            total_pause_sec,
            longest_pause_sec,
            froze: longest_pause_sec > FREEZE_PAUSE_SEC,
        }
    }
}

/// Speaking rate over the response, truncated to whole words per minute.
///
/// The response duration is taken from whichever stream extends furthest:
/// the acoustic log (sampled over the full recording) or the last anchor.
fn words_per_minute(anchors: &[SpeechAnchor], acoustic: &[AcousticFrame]) -> u32 {
    let word_count: usize = anchors
        .iter()
        .map(|a| a.text.split_whitespace().count())
        .sum();

    let anchor_end = anchors.last().map(|a| a.end).unwrap_or(0.0);
    let acoustic_end = acoustic.last().map(|f| f.timestamp).unwrap_or(0.0);
    let duration = anchor_end.max(acoustic_end);

    if duration > 0.0 {
        ((word_count as f64 / duration) * 60.0) as u32
    } else {
        0
    }
}

/// Mean and population standard deviation of voiced pitch samples
fn voiced_pitch_stats(acoustic: &[AcousticFrame]) -> (f64, f64) {
    let voiced: Vec<f64> = acoustic
        .iter()
        .map(|f| f.pitch)
        .filter(|p| *p > 0.0)
        .collect();

    if voiced.is_empty() {
        return (0.0, 0.0);
    }

    let n = voiced.len() as f64;
    let mean = voiced.iter().sum::<f64>() / n;
    let variance = voiced.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}

/// Percentage of frames with gaze on the screen, truncated
fn screen_gaze_pct(visual: &[VisualFrame]) -> u32 {
    let screen = visual
        .iter()
        .filter(|f| f.gaze == GazeDirection::Screen)
        .count();
    ((screen * 100) / visual.len().max(1)) as u32
}

/// Modal emotion over the full log, Neutral included; Neutral for an empty log
fn dominant_emotion(visual: &[VisualFrame]) -> Emotion {
    modal(visual.iter().map(|f| f.emotion)).unwrap_or(Emotion::Neutral)
}

/// Percentage of frames whose per-frame pose angle magnitude exceeds the
/// frame threshold
fn pose_pct(visual: &[VisualFrame], angle: impl Fn(&VisualFrame) -> f64) -> u32 {
    let moving = visual
        .iter()
        .filter(|f| angle(f).abs() > POSE_FRAME_THRESHOLD_DEG)
        .count();
    ((moving * 100) / visual.len().max(1)) as u32
}

/// Count, total duration, and longest duration of pause events
fn pause_stats(timeline: &Timeline) -> (u32, f64, f64) {
    let mut count = 0u32;
    let mut total = 0.0;
    let mut longest = 0.0f64;

    for event in timeline.iter() {
        if let TimelineEvent::Pause(p) = event {
            count += 1;
            total += p.duration_sec;
            longest = longest.max(p.duration_sec);
        }
    }

    (count, total, longest)
}
