//! Per-window classification rules
//!
//! This module turns a window of sensor frames into categorical behavior
//! labels: head posture from mean pose angles, dominant gaze and
//! micro-expression by majority vote, voiced pitch aggregation, the gaze
//! state of a silence gap, and the significance gate that decides whether a
//! window is worth emitting at all.

use crate::types::{AcousticFrame, AnchorMode, Emotion, GazeDirection, PauseGaze, Posture, VisualFrame};

/// Mean head pitch beyond this (degrees) reads as nodding / chin-up
pub const HEAD_PITCH_THRESHOLD_DEG: f64 = 10.0;

/// Mean head yaw magnitude beyond this (degrees) reads as head shaking
pub const HEAD_YAW_THRESHOLD_DEG: f64 = 10.0;

/// Classify head posture from the mean pose angles over a window.
///
/// The pitch check takes priority: a window that is simultaneously nodding
/// and turning is reported as nodding. All comparisons are strict, so
/// boundary values fall through to `Static`, as do out-of-range angles.
pub fn classify_posture(frames: &[&VisualFrame]) -> Posture {
    if frames.is_empty() {
        return Posture::Static;
    }

    let n = frames.len() as f64;
    let mean_pitch = frames.iter().map(|f| f.pitch).sum::<f64>() / n;
    let mean_yaw = frames.iter().map(|f| f.yaw).sum::<f64>() / n;

    if mean_pitch > HEAD_PITCH_THRESHOLD_DEG {
        Posture::Nodding
    } else if mean_pitch < -HEAD_PITCH_THRESHOLD_DEG {
        Posture::ChinUp
    } else if mean_yaw.abs() > HEAD_YAW_THRESHOLD_DEG {
        Posture::Shaking
    } else {
        Posture::Static
    }
}

/// Modal gaze label over a window; `Screen` when the window is empty.
pub fn dominant_gaze(frames: &[&VisualFrame]) -> GazeDirection {
    modal(frames.iter().map(|f| f.gaze)).unwrap_or(GazeDirection::Screen)
}

/// Modal non-Neutral emotion over a window; `Neutral` when no non-Neutral
/// observation exists.
pub fn micro_expression(frames: &[&VisualFrame]) -> Emotion {
    modal(
        frames
            .iter()
            .map(|f| f.emotion)
            .filter(|e| *e != Emotion::Neutral),
    )
    .unwrap_or(Emotion::Neutral)
}

/// Mean of voiced pitch samples over a window, truncated to integer Hz.
///
/// Frames with pitch 0 are unvoiced and excluded; a window with no voiced
/// frames reports 0.
pub fn voiced_pitch_hz(frames: &[&AcousticFrame]) -> u32 {
    let voiced: Vec<f64> = frames
        .iter()
        .map(|f| f.pitch)
        .filter(|p| *p > 0.0)
        .collect();

    if voiced.is_empty() {
        return 0;
    }

    (voiced.iter().sum::<f64>() / voiced.len() as f64) as u32
}

/// Classify the gaze behavior of a silence gap.
///
/// Counts frames with gaze off the screen: strictly fewer averted frames
/// than half the gap's frames reads as staring blankly, otherwise the
/// candidate looked away to think.
pub fn pause_gaze_state(frames: &[&VisualFrame]) -> PauseGaze {
    let averted = frames
        .iter()
        .filter(|f| f.gaze != GazeDirection::Screen)
        .count();

    if averted * 2 < frames.len() {
        PauseGaze::StaringBlankly
    } else {
        PauseGaze::LookingAwayThinking
    }
}

/// Decide whether a classified anchor window is worth emitting.
///
/// Segment anchors are always significant (their content carries the
/// response); word anchors pass only when something behaviorally notable
/// happened, which keeps word-level timelines sparse.
pub fn is_significant(
    mode: AnchorMode,
    posture: Posture,
    gaze: GazeDirection,
    expression: Emotion,
) -> bool {
    mode == AnchorMode::Segment
        || posture != Posture::Static
        || gaze != GazeDirection::Screen
        || matches!(
            expression,
            Emotion::Happy | Emotion::Surprise | Emotion::Fear | Emotion::Disgust
        )
}

/// Most frequent label, ties broken by first label encountered in iteration
/// order. Deterministic for any fixed input order.
pub(crate) fn modal<T: PartialEq + Copy>(labels: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut winner: Option<(T, usize)> = None;
    for (label, count) in counts {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((label, count)),
        }
    }
    winner.map(|(label, _)| label)
}
