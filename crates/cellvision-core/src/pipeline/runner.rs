//! Acquisition and processing threads.
//!
//! The capture thread pushes frames into a [`FrameSlot`]; the worker thread
//! takes the newest one, runs a full pass, then takes the next. Frames that
//! arrive while the worker is busy replace each other and are counted as dropped.
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, trace, warn};

use crate::error::{Result, VisionError};
use crate::frame::Frame;
use crate::source::FrameSource;

use super::driver::{DriverStats, PipelineDriver};

#[derive(Default)]
struct SlotState {
    frame: Option<Frame>,
    closed: bool,
    dropped: usize,
}

/// Single-frame handoff where a newer frame overwrites an undelivered one.
#[derive(Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`. Returns `true` when an undelivered frame was replaced.
    /// Frames offered after `close` are discarded.
    pub fn offer(&self, frame: Frame) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        let replaced = state.frame.replace(frame).is_some();
        if replaced {
            state.dropped += 1;
        }
        drop(state);
        self.ready.notify_one();
        replaced
    }

    /// Block until a frame is available. Returns `None` once the slot is
    /// closed and empty.
    pub fn take(&self) -> Option<Frame> {
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.frame.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Non-blocking variant of [`take`](Self::take).
    pub fn try_take(&self) -> Option<Frame> {
        self.lock().frame.take()
    }

    /// Wake every waiter. A pending frame is still delivered.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn dropped(&self) -> usize {
        self.lock().dropped
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Closes the slot when a thread exits, including by panic.
struct CloseOnExit(Arc<FrameSlot>);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Totals for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_captured: usize,
    pub frames_processed: usize,
    pub frames_dropped: usize,
    pub targets_found: usize,
}

/// Run capture and processing on their own threads and wait for both.
///
/// Returns when the source is exhausted and the last frame is processed, or
/// when the worker stops on a fatal error. An endless source never returns.
/// `pace` throttles capture to one frame per period.
pub fn run_threaded(
    source: Box<dyn FrameSource>,
    driver: PipelineDriver,
    pace: Option<Duration>,
) -> Result<RunSummary> {
    let slot = Arc::new(FrameSlot::new());

    let capture = thread::Builder::new()
        .name("cellvision-capture".into())
        .spawn({
            let slot = Arc::clone(&slot);
            move || {
                let _guard = CloseOnExit(Arc::clone(&slot));
                capture_loop(source, &slot, pace)
            }
        })?;

    let worker = match thread::Builder::new()
        .name("cellvision-worker".into())
        .spawn({
            let slot = Arc::clone(&slot);
            move || {
                let _guard = CloseOnExit(Arc::clone(&slot));
                worker_loop(driver, &slot)
            }
        }) {
        Ok(handle) => handle,
        Err(e) => {
            slot.close();
            let _ = capture.join();
            return Err(e.into());
        }
    };

    let captured = capture.join().map_err(|_| VisionError::ThreadPanic("capture"));
    slot.close();
    let processed = worker.join().map_err(|_| VisionError::ThreadPanic("worker"));

    let stats = processed??;
    let frames_captured = captured??;

    let summary = RunSummary {
        frames_captured,
        frames_processed: stats.frames_processed,
        frames_dropped: slot.dropped(),
        targets_found: stats.targets_found,
    };
    info!(
        captured = summary.frames_captured,
        processed = summary.frames_processed,
        dropped = summary.frames_dropped,
        targets = summary.targets_found,
        "Run finished"
    );
    Ok(summary)
}

/// Process every frame of `source` on the calling thread. No frame is dropped.
pub fn run_sequential(
    mut source: Box<dyn FrameSource>,
    mut driver: PipelineDriver,
) -> Result<RunSummary> {
    let mut frames_captured = 0;
    while let Some(frame) = source.next_frame()? {
        frames_captured += 1;
        match driver.run_pass(&frame) {
            Ok(_) => {}
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => warn!(frame = frame.metadata.frame_index, error = %e, "Frame failed"),
        }
    }
    let stats = driver.finish()?;
    Ok(RunSummary {
        frames_captured,
        frames_processed: stats.frames_processed,
        frames_dropped: 0,
        targets_found: stats.targets_found,
    })
}

fn capture_loop(
    mut source: Box<dyn FrameSource>,
    slot: &FrameSlot,
    pace: Option<Duration>,
) -> Result<usize> {
    let mut captured = 0;
    let mut deadline = Instant::now();
    while !slot.is_closed() {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Frame acquisition failed");
                return Err(e);
            }
        };
        captured += 1;
        let index = frame.metadata.frame_index;
        if slot.offer(frame) {
            trace!(frame = index, "Replaced unprocessed frame");
        }

        if let Some(period) = pace {
            deadline += period;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }
    }
    Ok(captured)
}

fn worker_loop(mut driver: PipelineDriver, slot: &FrameSlot) -> Result<DriverStats> {
    while let Some(frame) = slot.take() {
        match driver.run_pass(&frame) {
            Ok(_) => {}
            Err(e) if is_fatal(&e) => {
                error!(error = %e, "Stopping worker");
                slot.close();
                if let Err(finish_err) = driver.finish() {
                    warn!(error = %finish_err, "Video sink did not finish cleanly");
                }
                return Err(e);
            }
            Err(e) => warn!(frame = frame.metadata.frame_index, error = %e, "Frame failed"),
        }
    }
    driver.finish()
}

/// Errors that end the run instead of skipping a frame.
fn is_fatal(error: &VisionError) -> bool {
    matches!(error, VisionError::DimensionMismatch { .. })
}
