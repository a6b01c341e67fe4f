//! Timeline fusion
//!
//! This module provides the public API for interlace. It aligns the three
//! independently-sampled input streams into one chronological timeline:
//! per-anchor windowing → classification → significance gate → pause
//! detection → stable merge.
//!
//! Fusion is a pure, synchronous transformation over fully materialized
//! in-memory logs. It holds no shared state and is safe to call from any
//! thread.

use crate::adapter::{parse_acoustic_log, parse_transcript, parse_visual_log, transcript_to_anchors};
use crate::classify::{
    classify_posture, dominant_gaze, is_significant, micro_expression, pause_gaze_state,
    voiced_pitch_hz,
};
use crate::error::FusionError;
use crate::narrative::TimelineEncoder;
use crate::summary::ResponseSummarizer;
use crate::types::{
    AcousticFrame, AnchorMode, BehaviorEvent, PauseEvent, SpeechAnchor, TimeRange, Timeline,
    TimelineEvent, VisualFrame,
};
use crate::window::{slice_acoustic, slice_visual, PAUSE_GAP_THRESHOLD_SEC};
use tracing::debug;

/// Fuse already-parsed logs into a timeline with default settings.
///
/// # Arguments
/// * `anchors` - Timestamped speech units in non-decreasing start order
/// * `mode` - Whether the anchors are word- or segment-level
/// * `visual` - Visual frame log for the response
/// * `acoustic` - Acoustic frame log for the response
///
/// # Returns
/// A chronologically ordered timeline; empty when `anchors` is empty.
///
/// # Example
/// ```ignore
/// let timeline = fuse(&anchors, AnchorMode::Word, &visual_log, &acoustic_log);
/// ```
pub fn fuse(
    anchors: &[SpeechAnchor],
    mode: AnchorMode,
    visual: &[VisualFrame],
    acoustic: &[AcousticFrame],
) -> Timeline {
    TimelineFuser::new().fuse(anchors, mode, visual, acoustic)
}

/// Fuse raw producer JSON logs into an encoded timeline payload.
///
/// One-shot convenience over the full pipeline: adapt → fuse → summarize →
/// encode. A transcript without timing data yields a payload with an empty
/// timeline, not an error.
pub fn fuse_logs_to_payload(
    transcript_json: &str,
    visual_json: &str,
    acoustic_json: &str,
) -> Result<String, FusionError> {
    TimelineFuser::new().fuse_logs(transcript_json, visual_json, acoustic_json)
}

/// Configurable fusion engine.
///
/// The only tunable is the pause significance threshold; everything else is
/// fixed by the classification rules.
pub struct TimelineFuser {
    pause_threshold_sec: f64,
}

impl Default for TimelineFuser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineFuser {
    /// Create a fuser with the default pause threshold (1.5 s)
    pub fn new() -> Self {
        Self {
            pause_threshold_sec: PAUSE_GAP_THRESHOLD_SEC,
        }
    }

    /// Create a fuser with a specific pause threshold in seconds
    pub fn with_pause_threshold(pause_threshold_sec: f64) -> Self {
        Self {
            pause_threshold_sec,
        }
    }

    /// Fuse the three input streams into one chronological timeline.
    ///
    /// Anchors with no overlapping visual frames contribute nothing (visual
    /// evidence is required; acoustic is best-effort). Gaps between
    /// consecutive anchors longer than the pause threshold become pause
    /// events when at least one visual frame falls inside the gap.
    pub fn fuse(
        &self,
        anchors: &[SpeechAnchor],
        mode: AnchorMode,
        visual: &[VisualFrame],
        acoustic: &[AcousticFrame],
    ) -> Timeline {
        if anchors.is_empty() {
            debug!("no speech anchors; returning empty timeline");
            return Timeline::default();
        }

        debug!(
            anchors = anchors.len(),
            mode = mode.as_str(),
            visual_frames = visual.len(),
            acoustic_frames = acoustic.len(),
            "fusing streams"
        );

        let mut events: Vec<TimelineEvent> = Vec::new();

        for anchor in anchors {
            let v_frames = slice_visual(visual, anchor.start, anchor.end);
            if v_frames.is_empty() {
                continue;
            }
            let a_frames = slice_acoustic(acoustic, anchor.start, anchor.end);

            let posture = classify_posture(&v_frames);
            let gaze = dominant_gaze(&v_frames);
            let expression = micro_expression(&v_frames);

            if !is_significant(mode, posture, gaze, expression) {
                continue;
            }

            events.push(TimelineEvent::Behavior(BehaviorEvent {
                range: TimeRange::new(anchor.start, anchor.end),
                spoken_text: anchor.text.trim().to_string(),
                posture,
                dominant_gaze: gaze,
                micro_expression: expression,
                voice_pitch_hz: voiced_pitch_hz(&a_frames),
            }));
        }

        let behavior_count = events.len();

        for pair in anchors.windows(2) {
            let gap_start = pair[0].end;
            let gap_end = pair[1].start;
            let gap = gap_end - gap_start;

            if gap > self.pause_threshold_sec {
                let silent_frames = slice_visual(visual, gap_start, gap_end);
                if silent_frames.is_empty() {
                    continue;
                }

                events.push(TimelineEvent::Pause(PauseEvent {
                    range: TimeRange::new(gap_start, gap_end),
                    duration_sec: gap,
                    gaze_state: pause_gaze_state(&silent_frames),
                }));
            }
        }

        debug!(
            behavior_events = behavior_count,
            pause_events = events.len() - behavior_count,
            "fusion complete"
        );

        // Stable sort keeps insertion order for equal start times:
        // behavior events in anchor order, pause events in gap order.
        events.sort_by(|a, b| a.start().total_cmp(&b.start()));

        Timeline::new(events)
    }

    /// Run the full pipeline from producer JSON to an encoded payload.
    ///
    /// Pipeline stages:
    /// 1. Adapters - parse and validate the three producer logs
    /// 2. Fusion - build the chronological timeline
    /// 3. Summarizer - whole-response aggregates
    /// 4. Encoder - versioned timeline payload JSON
    pub fn fuse_logs(
        &self,
        transcript_json: &str,
        visual_json: &str,
        acoustic_json: &str,
    ) -> Result<String, FusionError> {
        let transcript = parse_transcript(transcript_json)?;
        let visual = parse_visual_log(visual_json)?;
        let acoustic = parse_acoustic_log(acoustic_json)?;

        let (anchors, mode) = match transcript_to_anchors(&transcript)? {
            Some((anchors, mode)) => (anchors, Some(mode)),
            None => {
                debug!("transcript carries no timing data; producing empty timeline");
                (Vec::new(), None)
            }
        };

        let timeline = self.fuse(
            &anchors,
            mode.unwrap_or(AnchorMode::Word),
            &visual,
            &acoustic,
        );

        let summary = ResponseSummarizer::summarize(&anchors, &visual, &acoustic, &timeline);

        let encoder = TimelineEncoder::new();
        encoder.encode_to_json(&timeline, &summary, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Emotion, GazeDirection, PauseGaze, Posture};
    use pretty_assertions::assert_eq;

    fn vframe(timestamp: f64, pitch: f64, yaw: f64, gaze: GazeDirection, emotion: Emotion) -> VisualFrame {
        VisualFrame {
            timestamp,
            pitch,
            yaw,
            gaze,
            emotion,
        }
    }

    fn quiet_frame(timestamp: f64) -> VisualFrame {
        vframe(timestamp, 0.0, 0.0, GazeDirection::Screen, Emotion::Neutral)
    }

    fn aframe(timestamp: f64, pitch: f64) -> AcousticFrame {
        AcousticFrame { timestamp, pitch }
    }

    #[test]
    fn test_empty_anchors_yield_empty_timeline() {
        let visual = vec![quiet_frame(0.5)];
        let acoustic = vec![aframe(0.5, 120.0)];
        let timeline = fuse(&[], AnchorMode::Word, &visual, &acoustic);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_anchor_without_visual_frames_contributes_nothing() {
        let anchors = vec![SpeechAnchor::new("hello", 0.0, 1.0)];
        let acoustic = vec![aframe(0.5, 120.0)];
        let timeline = fuse(&anchors, AnchorMode::Segment, &[], &acoustic);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_segment_anchors_always_produce_events() {
        // Coverage invariant: segment mode passes the gate even when the
        // window is completely quiet.
        let anchors = vec![
            SpeechAnchor::new("I started in QA.", 0.0, 2.0),
            SpeechAnchor::new("Then I moved to backend.", 2.2, 4.0),
        ];
        let visual = vec![quiet_frame(1.0), quiet_frame(3.0)];

        let timeline = fuse(&anchors, AnchorMode::Segment, &visual, &[]);
        assert_eq!(timeline.len(), 2);
        for event in timeline.iter() {
            assert!(matches!(event, TimelineEvent::Behavior(_)));
        }
    }

    #[test]
    fn test_quiet_word_anchor_is_gated_out() {
        let anchors = vec![SpeechAnchor::new("hello", 0.0, 1.0)];
        let visual = vec![quiet_frame(0.5)];
        let acoustic = vec![aframe(0.5, 120.0)];

        let timeline = fuse(&anchors, AnchorMode::Word, &visual, &acoustic);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_nodding_word_anchor_passes_gate() {
        // All frames gaze Screen but pitch 20 triggers
        // Nodding, which alone passes the gate.
        let anchors = vec![SpeechAnchor::new("hello", 0.0, 1.0)];
        let visual = vec![
            vframe(0.2, 20.0, 0.0, GazeDirection::Screen, Emotion::Neutral),
            vframe(0.8, 20.0, 0.0, GazeDirection::Screen, Emotion::Neutral),
        ];

        let timeline = fuse(&anchors, AnchorMode::Word, &visual, &[]);
        assert_eq!(timeline.len(), 1);
        match &timeline.events[0] {
            TimelineEvent::Behavior(e) => {
                assert_eq!(e.posture, Posture::Nodding);
                assert_eq!(e.dominant_gaze, GazeDirection::Screen);
                assert_eq!(e.spoken_text, "hello");
            }
            other => panic!("expected behavior event, got {:?}", other),
        }
    }

    #[test]
    fn test_pause_scenario_with_gap_frame_only() {
        // Two words separated by a 2.0 s gap, one averted
        // frame inside the gap, no frames inside either anchor window.
        let anchors = vec![
            SpeechAnchor::new("go", 0.0, 0.5),
            SpeechAnchor::new("there", 2.5, 3.0),
        ];
        let visual = vec![vframe(1.0, 0.0, 0.0, GazeDirection::Up, Emotion::Neutral)];

        let timeline = fuse(&anchors, AnchorMode::Word, &visual, &[]);
        assert_eq!(timeline.len(), 1);
        match &timeline.events[0] {
            TimelineEvent::Pause(p) => {
                assert!((p.range.start - 0.5).abs() < f64::EPSILON);
                assert!((p.range.end - 2.5).abs() < f64::EPSILON);
                assert!((p.duration_sec - 2.0).abs() < f64::EPSILON);
                assert_eq!(p.gaze_state, PauseGaze::LookingAwayThinking);
            }
            other => panic!("expected pause event, got {:?}", other),
        }
    }

    #[test]
    fn test_pause_threshold_boundary() {
        // A gap of exactly 1.5 s is not a pause; 1.51 s is.
        let visual = vec![quiet_frame(1.0)];

        let at_threshold = vec![
            SpeechAnchor::new("a", 0.0, 0.5),
            SpeechAnchor::new("b", 2.0, 2.5),
        ];
        let timeline = fuse(&at_threshold, AnchorMode::Word, &visual, &[]);
        assert!(timeline.is_empty());

        let past_threshold = vec![
            SpeechAnchor::new("a", 0.0, 0.5),
            SpeechAnchor::new("b", 2.01, 2.5),
        ];
        let timeline = fuse(&past_threshold, AnchorMode::Word, &visual, &[]);
        assert_eq!(timeline.len(), 1);
        assert!(matches!(timeline.events[0], TimelineEvent::Pause(_)));
    }

    #[test]
    fn test_gap_without_frames_is_skipped() {
        let anchors = vec![
            SpeechAnchor::new("a", 0.0, 0.5),
            SpeechAnchor::new("b", 3.0, 3.5),
        ];
        let timeline = fuse(&anchors, AnchorMode::Word, &[], &[]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_events_are_chronological() {
        // Behavior and pause events interleave by range start.
        let anchors = vec![
            SpeechAnchor::new("First segment.", 0.0, 1.0),
            SpeechAnchor::new("Second segment.", 3.0, 4.0),
            SpeechAnchor::new("Third segment.", 4.2, 5.0),
        ];
        let visual = vec![
            quiet_frame(0.5),
            vframe(2.0, 0.0, 0.0, GazeDirection::Left, Emotion::Neutral),
            quiet_frame(3.5),
            quiet_frame(4.5),
        ];

        let timeline = fuse(&anchors, AnchorMode::Segment, &visual, &[]);
        assert_eq!(timeline.len(), 4);

        for pair in timeline.events.windows(2) {
            assert!(pair[0].start() <= pair[1].start());
        }

        assert!(matches!(timeline.events[0], TimelineEvent::Behavior(_)));
        assert!(matches!(timeline.events[1], TimelineEvent::Pause(_)));
        assert!(matches!(timeline.events[2], TimelineEvent::Behavior(_)));
        assert!(matches!(timeline.events[3], TimelineEvent::Behavior(_)));
    }

    #[test]
    fn test_boundary_frames_shared_between_anchor_and_pause_windows() {
        // No deduplication: a frame at an anchor edge counts for both the
        // anchor window and the adjacent gap window.
        let anchors = vec![
            SpeechAnchor::new("First one.", 0.0, 1.0),
            SpeechAnchor::new("Second one.", 3.0, 4.0),
        ];
        let visual = vec![
            vframe(1.0, 0.0, 0.0, GazeDirection::Up, Emotion::Neutral),
            quiet_frame(3.0),
        ];

        let timeline = fuse(&anchors, AnchorMode::Segment, &visual, &[]);
        // Two behavior events plus the pause between them.
        assert_eq!(timeline.len(), 3);
        assert!(matches!(timeline.events[1], TimelineEvent::Pause(_)));
    }

    #[test]
    fn test_voice_pitch_from_overlapping_acoustic_frames() {
        let anchors = vec![SpeechAnchor::new("Answer text.", 0.0, 1.0)];
        let visual = vec![quiet_frame(0.5)];
        let acoustic = vec![
            aframe(0.1, 200.0),
            aframe(0.2, 0.0),
            aframe(0.3, 211.0),
            aframe(5.0, 90.0),
        ];

        let timeline = fuse(&anchors, AnchorMode::Segment, &visual, &acoustic);
        match &timeline.events[0] {
            TimelineEvent::Behavior(e) => assert_eq!(e.voice_pitch_hz, 205),
            other => panic!("expected behavior event, got {:?}", other),
        }
    }

    #[test]
    fn test_spoken_text_is_trimmed() {
        let anchors = vec![SpeechAnchor::new("  hello ", 0.0, 1.0)];
        let visual = vec![vframe(0.5, 20.0, 0.0, GazeDirection::Screen, Emotion::Neutral)];

        let timeline = fuse(&anchors, AnchorMode::Word, &visual, &[]);
        match &timeline.events[0] {
            TimelineEvent::Behavior(e) => assert_eq!(e.spoken_text, "hello"),
            other => panic!("expected behavior event, got {:?}", other),
        }
    }

    #[test]
    fn test_fuse_is_idempotent() {
        let anchors = vec![
            SpeechAnchor::new("go", 0.0, 0.5),
            SpeechAnchor::new("there", 2.5, 3.0),
            SpeechAnchor::new("now", 3.1, 3.4),
        ];
        let visual = vec![
            vframe(0.2, 15.0, 0.0, GazeDirection::Screen, Emotion::Happy),
            vframe(1.0, 0.0, 0.0, GazeDirection::Up, Emotion::Neutral),
            quiet_frame(2.7),
            quiet_frame(3.2),
        ];
        let acoustic = vec![aframe(0.2, 180.0), aframe(2.6, 150.0)];

        let first = fuse(&anchors, AnchorMode::Word, &visual, &acoustic);
        let second = fuse(&anchors, AnchorMode::Word, &visual, &acoustic);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_pause_threshold() {
        let anchors = vec![
            SpeechAnchor::new("a", 0.0, 0.5),
            SpeechAnchor::new("b", 1.5, 2.0),
        ];
        let visual = vec![quiet_frame(1.0)];

        // Gap of 1.0 s: below the default threshold, above a custom 0.8 s.
        let default_fuser = TimelineFuser::new();
        assert!(default_fuser
            .fuse(&anchors, AnchorMode::Word, &visual, &[])
            .is_empty());

        let tight_fuser = TimelineFuser::with_pause_threshold(0.8);
        let timeline = tight_fuser.fuse(&anchors, AnchorMode::Word, &visual, &[]);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_fuse_logs_end_to_end() {
        let transcript = r#"{
            "text": "go there",
            "words": [
                {"word": "go", "start": 0.0, "end": 0.5},
                {"word": "there", "start": 2.5, "end": 3.0}
            ]
        }"#;
        let visual = r#"[
            {"timestamp": 1.0, "pitch": 0, "yaw": 0, "roll": 0,
             "gaze": "Up", "emotion": "Neutral"}
        ]"#;
        let acoustic = r#"[{"timestamp": 1.0, "pitch": 0.0, "volume": 10.0}]"#;

        let json = fuse_logs_to_payload(transcript, visual, acoustic).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["timeline_version"], "interview.timeline.v1");
        assert_eq!(payload["producer"]["name"], "interlace");
        assert_eq!(payload["granularity"], "word");
        assert_eq!(payload["events"].as_array().unwrap().len(), 1);
        assert_eq!(payload["events"][0]["kind"], "pause");
        assert_eq!(payload["summary"]["pause_count"], 1);
    }

    #[test]
    fn test_fuse_logs_without_timing_data() {
        // Missing timing data is a recoverable degenerate case: an empty
        // timeline with a null granularity, not an error.
        let json = fuse_logs_to_payload(r#"{"text": "hello"}"#, "[]", "[]").unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(payload["granularity"].is_null());
        assert_eq!(payload["events"].as_array().unwrap().len(), 0);
    }
}
