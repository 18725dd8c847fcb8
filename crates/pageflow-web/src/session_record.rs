#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! Provides [`SessionRecorder`] for recording host events and time steps
//! during a session, and [`replay`] for feeding them through a fresh
//! [`WebSite`] to verify that surface checksums match exactly.
//!
//! # Trace format
//!
//! One JSON object per line, tagged by `type`:
//!
//! - **header**: schema version, page list, initial page and URL.
//! - **input**: a timestamped [`HostEvent`].
//! - **tick**: explicit time advancement to an absolute timestamp.
//! - **frame**: surface checkpoint after every step, with an FNV-1a checksum
//!   and chain.
//! - **summary**: total frames and final checksum chain.
//!
//! # Determinism contract
//!
//! Given identical recorded inputs and the same site configuration, replay
//! **must** produce identical frame checksums. Time only advances through
//! tick records and events are only taken from the trace.
//!
//! # Example
//!
//! ```ignore
//! let mut recorder = SessionRecorder::new(config.clone(), PageIndex::FIRST, "/")?;
//! recorder.init();
//! recorder.push_event(0, HostEvent::MenuToggle);
//! recorder.advance_time(16_000_000, Duration::from_millis(16));
//! recorder.step()?;
//!
//! let trace = recorder.finish();
//! let result = replay(config, &trace)?;
//! assert!(result.ok());
//! ```

use core::time::Duration;

use pageflow_core::{PageIndex, SiteConfig};
use serde::{Deserialize, Serialize};

use crate::WebError;
use crate::host::{HostEvent, StepResult, WebSite};
use crate::surface::fnv1a64_pair;

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "pageflow-trace-v1";

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema: String,
        pages: Vec<String>,
        initial: PageIndex,
        url: String,
    },
    /// A host event at a specific timestamp.
    Input { ts_ns: u64, event: HostEvent },
    /// Time advanced to `ts_ns`.
    Tick { ts_ns: u64 },
    /// Surface checkpoint.
    Frame {
        frame_idx: u64,
        ts_ns: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_frames: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of frame checkpoints in the trace.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Frame { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Encode as JSON lines.
    pub fn to_jsonl(&self) -> Result<String, WebError> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record).map_err(|e| WebError::Json(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Decode JSON lines; blank lines are skipped.
    pub fn from_jsonl(text: &str) -> Result<Self, WebError> {
        let records = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .map_err(|e| WebError::Json(format!("line {}: {e}", n + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }
}

/// Records a session for deterministic replay.
///
/// Wraps a [`WebSite`] and intercepts all input operations, recording them
/// as [`TraceRecord`]s. A frame checkpoint is taken after every step, so
/// replay steps at exactly the same points.
#[derive(Debug)]
pub struct SessionRecorder {
    site: WebSite,
    records: Vec<TraceRecord>,
    frame_idx: u64,
    checksum_chain: u64,
    current_ts_ns: u64,
}

impl SessionRecorder {
    /// Create a recorder around a fresh site.
    pub fn new(
        config: SiteConfig,
        initial: PageIndex,
        url: impl Into<String>,
    ) -> Result<Self, WebError> {
        let url = url.into();
        let records = vec![TraceRecord::Header {
            schema: SCHEMA_VERSION.to_string(),
            pages: config.page_list().to_vec(),
            initial,
            url: url.clone(),
        }];
        Ok(Self {
            site: WebSite::new(config, initial, url)?,
            records,
            frame_idx: 0,
            checksum_chain: 0,
            current_ts_ns: 0,
        })
    }

    /// Record the initial frame checkpoint.
    pub fn init(&mut self) {
        self.site.take_ops();
        self.record_frame();
    }

    /// Record a host event at the given timestamp (nanoseconds since start).
    pub fn push_event(&mut self, ts_ns: u64, event: HostEvent) {
        self.current_ts_ns = ts_ns;
        self.records.push(TraceRecord::Input {
            ts_ns,
            event: event.clone(),
        });
        self.site.push_event(event);
    }

    /// Record a time advancement at the given timestamp.
    ///
    /// The tick stores the clock reading after advancing, so replay stays
    /// aligned even if `ts_ns` and `dt` disagree.
    pub fn advance_time(&mut self, ts_ns: u64, dt: Duration) {
        self.current_ts_ns = ts_ns;
        self.site.advance_time(dt);
        let now = self.site.clock().now().as_nanos().min(u128::from(u64::MAX)) as u64;
        self.records.push(TraceRecord::Tick { ts_ns: now });
    }

    /// Process one step and record its frame checkpoint.
    pub fn step(&mut self) -> Result<StepResult, WebError> {
        let result = self.site.step();
        self.site.take_ops();
        self.record_frame();
        result
    }

    /// Finish recording and return the completed trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_frames: self.frame_idx,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    #[must_use]
    pub fn site(&self) -> &WebSite {
        &self.site
    }

    /// Mutably access the site, e.g. to drain content requests.
    pub fn site_mut(&mut self) -> &mut WebSite {
        &mut self.site
    }

    fn record_frame(&mut self) {
        let checksum = self.site.surface().checksum();
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Frame {
            frame_idx: self.frame_idx,
            ts_ns: self.current_ts_ns,
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.frame_idx += 1;
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Total frames replayed.
    pub total_frames: u64,
    /// Final checksum chain from replay.
    pub final_checksum_chain: u64,
    /// First frame where a checksum mismatch was detected, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay produced identical checksums.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Description of a checksum mismatch during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub frame_idx: u64,
    pub expected: u64,
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace is missing a header record.
    MissingHeader,
    /// The header names a schema this build cannot replay.
    UnsupportedSchema(String),
    /// The trace was recorded against a different page list.
    PageMismatch {
        recorded: Vec<String>,
        configured: Vec<String>,
    },
    /// Building the site failed.
    Web(WebError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::UnsupportedSchema(s) => write!(f, "unsupported trace schema: {s}"),
            Self::PageMismatch {
                recorded,
                configured,
            } => write!(
                f,
                "trace pages {recorded:?} do not match configured pages {configured:?}"
            ),
            Self::Web(e) => write!(f, "web error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<WebError> for ReplayError {
    fn from(e: WebError) -> Self {
        Self::Web(e)
    }
}

/// Replay a recorded session trace through a fresh site.
///
/// Input and tick records feed the site; each frame record triggers a step
/// (except the initial frame) and a checksum comparison. Event errors were
/// already part of the recorded session and do not abort the replay.
pub fn replay(config: SiteConfig, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let (schema, pages, initial, url) = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header {
                schema,
                pages,
                initial,
                url,
            } => Some((schema, pages, *initial, url)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)?;
    if schema != SCHEMA_VERSION {
        return Err(ReplayError::UnsupportedSchema(schema.clone()));
    }
    if pages.as_slice() != config.page_list() {
        return Err(ReplayError::PageMismatch {
            recorded: pages.clone(),
            configured: config.page_list().to_vec(),
        });
    }

    let mut site = WebSite::new(config, initial, url.clone())?;
    let mut replay_frame_idx: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { event, .. } => site.push_event(event.clone()),
            TraceRecord::Tick { ts_ns } => site.set_time(Duration::from_nanos(*ts_ns)),
            TraceRecord::Frame {
                frame_idx: expected_idx,
                checksum: expected,
                ..
            } => {
                if replay_frame_idx > 0 {
                    if let Err(err) = site.step() {
                        tracing::debug!(
                            target: "pageflow.web",
                            frame = *expected_idx,
                            error = %err,
                            "replay step reported an error"
                        );
                    }
                }
                site.take_ops();
                let actual = site.surface().checksum();
                checksum_chain = fnv1a64_pair(checksum_chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    tracing::warn!(
                            target: "pageflow.web",
                        frame = *expected_idx,
                        expected = *expected,
                        actual,
                        "replay checksum mismatch"
                    );
                    first_mismatch = Some(ReplayMismatch {
                        frame_idx: *expected_idx,
                        expected: *expected,
                        actual,
                    });
                }
                replay_frame_idx += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_frames: replay_frame_idx,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
