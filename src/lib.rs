//! interlace - Multi-modal timeline fusion engine for automated interview analysis
//!
//! interlace aligns independently-sampled per-response logs (word- or
//! segment-level speech timestamps, a visual frame log, an acoustic frame
//! log) into one chronological behavioral timeline through a deterministic
//! pipeline: producer adaptation → per-anchor windowing → classification →
//! significance gating → pause detection → stable merge → payload encoding.
//!
//! Fusion is a pure function over fully materialized in-memory logs: no
//! I/O, no shared state, safe to call from any thread.

pub mod adapter;
pub mod classify;
pub mod error;
pub mod fuse;
pub mod narrative;
pub mod summary;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::FusionError;
pub use fuse::{fuse, fuse_logs_to_payload, TimelineFuser};
pub use narrative::{render_lines, render_narrative, TimelineEncoder};
pub use types::{Timeline, TimelineEvent, TimelinePayload};

/// Engine version embedded in all timeline payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for timeline payloads
pub const PRODUCER_NAME: &str = "interlace";
