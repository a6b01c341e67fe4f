//! Timeline encoding and narrative rendering
//!
//! Encodes a fused timeline into the versioned payload consumed by the
//! scoring step, and renders timelines as human-readable lines for
//! embedding into a downstream prompt. Rendering branches on the event
//! kind; the two variants do not share a shape.

use crate::error::FusionError;
use crate::types::{
    AnchorMode, ResponseSummary, Timeline, TimelineEvent, TimelinePayload, TimelineProducer,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current timeline payload schema version
pub const TIMELINE_VERSION: &str = "interview.timeline.v1";

/// Number of leading events retained when a timeline is compacted for
/// long-term storage
pub const COMPACT_EVENT_LIMIT: usize = 10;

/// Encoder for producing versioned timeline payloads
pub struct TimelineEncoder {
    instance_id: String,
}

impl Default for TimelineEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a fused timeline and its summary into a payload
    pub fn encode(
        &self,
        timeline: &Timeline,
        summary: &ResponseSummary,
        granularity: Option<AnchorMode>,
    ) -> TimelinePayload {
        TimelinePayload {
            timeline_version: TIMELINE_VERSION.to_string(),
            producer: TimelineProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            granularity,
            events: timeline.clone(),
            summary: summary.clone(),
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        timeline: &Timeline,
        summary: &ResponseSummary,
        granularity: Option<AnchorMode>,
    ) -> Result<String, FusionError> {
        let payload = self.encode(timeline, summary, granularity);
        serde_json::to_string_pretty(&payload).map_err(FusionError::JsonError)
    }
}

/// Render a timeline as one human-readable line per event.
///
/// Matches on the event tag: behavior events carry the spoken text and the
/// classified labels, pause events carry the silence duration and gaze
/// state.
pub fn render_lines(timeline: &Timeline) -> Vec<String> {
    timeline
        .iter()
        .map(|event| match event {
            TimelineEvent::Behavior(e) => format!(
                "{:.1}s - {:.1}s | \"{}\" | posture: {}, gaze: {}, expression: {}, voice: {}Hz",
                e.range.start,
                e.range.end,
                e.spoken_text,
                e.posture.as_str(),
                e.dominant_gaze.as_str(),
                e.micro_expression.as_str(),
                e.voice_pitch_hz,
            ),
            TimelineEvent::Pause(e) => format!(
                "{:.1}s - {:.1}s | LONG_PAUSE ({:.1}s) | {}",
                e.range.start,
                e.range.end,
                e.duration_sec,
                e.gaze_state.as_str(),
            ),
        })
        .collect()
}

/// Render a timeline as a single newline-joined narrative block
pub fn render_narrative(timeline: &Timeline) -> String {
    render_lines(timeline).join("\n")
}

/// The bounded timeline prefix retained for reporting once the full
/// per-frame logs are discarded
pub fn compact(timeline: &Timeline, max_events: usize) -> Timeline {
    Timeline::new(timeline.events.iter().take(max_events).cloned().collect())
}
