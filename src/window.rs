//! Temporal windowing
//!
//! Slices frame logs against anchor and gap intervals. Both interval bounds
//! are inclusive, so a frame sampled exactly at an anchor boundary belongs
//! to that anchor's window as well as to an adjacent gap window.

use crate::types::{AcousticFrame, VisualFrame};

/// Minimum silence gap (in seconds) between anchors to count as a pause
pub const PAUSE_GAP_THRESHOLD_SEC: f64 = 1.5;

/// Visual frames whose timestamp falls within `[start, end]`
pub fn slice_visual(log: &[VisualFrame], start: f64, end: f64) -> Vec<&VisualFrame> {
    log.iter()
        .filter(|f| f.timestamp >= start && f.timestamp <= end)
        .collect()
}

/// Acoustic frames whose timestamp falls within `[start, end]`
pub fn slice_acoustic(log: &[AcousticFrame], start: f64, end: f64) -> Vec<&AcousticFrame> {
    log.iter()
        .filter(|f| f.timestamp >= start && f.timestamp <= end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Emotion, GazeDirection};

    fn frame(timestamp: f64) -> VisualFrame {
        VisualFrame {
            timestamp,
            pitch: 0.0,
            yaw: 0.0,
            gaze: GazeDirection::Screen,
            emotion: Emotion::Neutral,
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let log = vec![frame(0.0), frame(0.5), frame(1.0), frame(1.5)];

        let window = slice_visual(&log, 0.5, 1.0);
        assert_eq!(window.len(), 2);
        assert!((window[0].timestamp - 0.5).abs() < f64::EPSILON);
        assert!((window[1].timestamp - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_window() {
        let log = vec![frame(0.0), frame(2.0)];
        assert!(slice_visual(&log, 0.5, 1.5).is_empty());
        assert!(slice_visual(&[], 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_boundary_frame_shared_between_windows() {
        // A frame at an anchor boundary belongs to both the anchor window
        // and the adjacent gap window.
        let log = vec![frame(1.0)];
        assert_eq!(slice_visual(&log, 0.0, 1.0).len(), 1);
        assert_eq!(slice_visual(&log, 1.0, 3.0).len(), 1);
    }

    #[test]
    fn test_acoustic_slice() {
        let log = vec![
            AcousticFrame {
                timestamp: 0.0,
                pitch: 120.0,
            },
            AcousticFrame {
                timestamp: 0.1,
                pitch: 0.0,
            },
            AcousticFrame {
                timestamp: 0.2,
                pitch: 130.0,
            },
        ];

        let window = slice_acoustic(&log, 0.05, 0.15);
        assert_eq!(window.len(), 1);
        assert!((window[0].timestamp - 0.1).abs() < f64::EPSILON);
    }
}
