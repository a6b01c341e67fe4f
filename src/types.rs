//! Core types for the interlace fusion engine
//!
//! This module defines the data structures that flow through fusion: speech
//! anchors from the transcription service, visual and acoustic frame logs,
//! the fused timeline events, and the encoded output payload.

use serde::{Deserialize, Serialize};

/// Transcript granularity for one response.
///
/// Producers emit either word-level or segment-level timestamps, never both
/// mixed within a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    Word,
    Segment,
}

impl AnchorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorMode::Word => "word",
            AnchorMode::Segment => "segment",
        }
    }
}

/// Gaze direction label from the visual analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum GazeDirection {
    Screen,
    Up,
    Down,
    Left,
    Right,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Screen => "Screen",
            GazeDirection::Up => "Up",
            GazeDirection::Down => "Down",
            GazeDirection::Left => "Left",
            GazeDirection::Right => "Right",
        }
    }
}

/// Emotion label from the visual analyzer (FER+ label set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Emotion {
    Neutral,
    Happy,
    Surprise,
    Sad,
    Anger,
    Disgust,
    Fear,
    Contempt,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Happy => "Happy",
            Emotion::Surprise => "Surprise",
            Emotion::Sad => "Sad",
            Emotion::Anger => "Anger",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Contempt => "Contempt",
        }
    }
}

/// Head posture classified over an anchor window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Static,
    Nodding,
    ChinUp,
    Shaking,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Static => "Static",
            Posture::Nodding => "Nodding",
            Posture::ChinUp => "Chin-Up",
            Posture::Shaking => "Shaking",
        }
    }
}

/// Gaze behavior classified over a silence gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseGaze {
    StaringBlankly,
    LookingAwayThinking,
}

impl PauseGaze {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseGaze::StaringBlankly => "Staring Blankly",
            PauseGaze::LookingAwayThinking => "Looking Away (Thinking)",
        }
    }
}

/// One recognized unit of speech with its timestamps.
///
/// Invariant: `start <= end`. Anchors arrive in non-decreasing `start` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechAnchor {
    /// Word or segment content
    pub text: String,
    /// Start of the spoken unit (seconds into the response)
    pub start: f64,
    /// End of the spoken unit (seconds into the response)
    pub end: f64,
}

impl SpeechAnchor {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// One sampled visual observation (2-5 fps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFrame {
    /// Seconds into the response, monotonically increasing
    pub timestamp: f64,
    /// Head nod angle (degrees, signed; positive = downward nod)
    pub pitch: f64,
    /// Head turn angle (degrees, signed)
    pub yaw: f64,
    pub gaze: GazeDirection,
    pub emotion: Emotion,
}

/// One sampled acoustic observation (10 fps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticFrame {
    /// Seconds into the response
    pub timestamp: f64,
    /// Voice pitch in Hz; 0 denotes unvoiced/silence
    pub pitch: f64,
}

/// Time interval in seconds; both bounds are inclusive when used for frame
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A fused observation tied to one speech anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub range: TimeRange,
    /// What the candidate said during this window (trimmed)
    pub spoken_text: String,
    pub posture: Posture,
    pub dominant_gaze: GazeDirection,
    /// Modal non-Neutral emotion in the window; Neutral only when no
    /// non-Neutral observation exists
    pub micro_expression: Emotion,
    /// Mean voiced pitch over the window, truncated to integer Hz; 0 when
    /// no voiced acoustic frames overlap
    pub voice_pitch_hz: u32,
}

/// A fused silence observation between two consecutive anchors.
///
/// Only emitted when the gap exceeds the pause significance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseEvent {
    pub range: TimeRange,
    pub duration_sec: f64,
    pub gaze_state: PauseGaze,
}

/// One entry in the fused timeline.
///
/// Consumers must branch on the `kind` tag; the two variants do not share a
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    Behavior(BehaviorEvent),
    Pause(PauseEvent),
}

impl TimelineEvent {
    /// Start of the event's time range, used for chronological ordering
    pub fn start(&self) -> f64 {
        match self {
            TimelineEvent::Behavior(e) => e.range.start,
            TimelineEvent::Pause(e) => e.range.start,
        }
    }

    pub fn range(&self) -> TimeRange {
        match self {
            TimelineEvent::Behavior(e) => e.range,
            TimelineEvent::Pause(e) => e.range,
        }
    }
}

/// Ordered sequence of behavior and pause events, ascending by range start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEvent> {
        self.events.iter()
    }
}

/// Whole-response aggregate metrics computed next to the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSummary {
    /// Spoken words per minute over the response, truncated
    pub words_per_minute: u32,
    /// Mean of voiced pitch samples (Hz); 0 when nothing was voiced
    pub voiced_pitch_mean_hz: f64,
    /// Population standard deviation of voiced pitch samples (Hz)
    pub voiced_pitch_stddev_hz: f64,
    /// Percentage of visual frames with gaze on the screen, truncated
    pub screen_gaze_pct: u32,
    /// Modal emotion over the full visual log, Neutral included
    pub dominant_emotion: Emotion,
    /// Percentage of frames with per-frame |pitch| beyond the nod threshold
    pub nodding_pct: u32,
    /// Percentage of frames with per-frame |yaw| beyond the shake threshold
    pub shaking_pct: u32,
    pub pause_count: u32,
    pub total_pause_sec: f64,
    pub longest_pause_sec: f64,
    /// Whether any pause exceeded the freeze duration
    pub froze: bool,
}

/// Producer metadata embedded in every timeline payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete encoded output for one candidate response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePayload {
    pub timeline_version: String,
    pub producer: TimelineProducer,
    pub computed_at_utc: String,
    /// Transcript granularity; absent when the transcript carried no timing
    /// data and the timeline is empty
    pub granularity: Option<AnchorMode>,
    pub events: Timeline,
    pub summary: ResponseSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaze_labels_match_producer_casing() {
        let frame: VisualFrame = serde_json::from_str(
            r#"{"timestamp": 0.2, "pitch": 1.0, "yaw": 0.0, "gaze": "Screen", "emotion": "Happy"}"#,
        )
        .unwrap();
        assert_eq!(frame.gaze, GazeDirection::Screen);
        assert_eq!(frame.emotion, Emotion::Happy);
    }

    #[test]
    fn test_timeline_event_tag() {
        let event = TimelineEvent::Pause(PauseEvent {
            range: TimeRange::new(0.5, 2.5),
            duration_sec: 2.0,
            gaze_state: PauseGaze::LookingAwayThinking,
        });

        let json = serde_json::to_string(&event).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "pause");
        assert_eq!(value["gaze_state"], "looking_away_thinking");

        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_timeline_serializes_as_array() {
        let timeline = Timeline::new(vec![TimelineEvent::Behavior(BehaviorEvent {
            range: TimeRange::new(0.0, 1.0),
            spoken_text: "hello".to_string(),
            posture: Posture::Nodding,
            dominant_gaze: GazeDirection::Screen,
            micro_expression: Emotion::Neutral,
            voice_pitch_hz: 120,
        })]);

        let json = serde_json::to_string(&timeline).unwrap();
        assert!(json.starts_with('['));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "behavior");
        assert_eq!(value[0]["posture"], "nodding");
    }

    #[test]
    fn test_time_range_duration() {
        assert!((TimeRange::new(0.5, 2.5).duration() - 2.0).abs() < f64::EPSILON);
    }
}
