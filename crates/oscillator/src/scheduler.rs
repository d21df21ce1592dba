//! Fixed-rate frame scheduling on top of a variable-rate frame pump.
//!
//! Hosts such as a browser call back once per display refresh, at whatever
//! rate the display runs. [`FrameScheduler`] turns those callbacks into
//! logical frames at a configured rate: a frame is produced only when
//! `floor(elapsed_ms / (1000 / fps))` moves past the last index produced.
//!
//! Elapsed time is tracked continuously and is available on every tick,
//! so physics can use true time while redraws stay throttled.

use std::convert::Infallible;

use tracing::{debug, trace};

/// Lowest accepted logical frame rate.
const MIN_FPS: u32 = 1;

/// Highest accepted logical frame rate.
const MAX_FPS: u32 = 120;

/// Returns the length of one logical frame in milliseconds.
///
/// ```rust
/// use oscillator::fps;
///
/// assert!((fps(60) - 16.666_666).abs() < 1e-5);
/// ```
#[inline]
pub fn fps(n: u32) -> f64 {
    1000.0 / n.clamp(MIN_FPS, MAX_FPS) as f64
}

/// Handle of a pending frame request, as issued by a [`FrameHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// The host's per-frame callback mechanism.
///
/// A request asks the host to deliver exactly one tick (with a millisecond
/// timestamp) at its next frame. Delivery happens by the host calling
/// [`FrameScheduler::tick`] (usually through the controller). A cancelled
/// request must never be delivered.
pub trait FrameHost {
    /// Error raised by the host when a request cannot be made or cancelled.
    type Error;

    /// Requests one tick at the next frame.
    ///
    /// # Errors
    ///
    /// Host specific.
    fn request_frame(&mut self) -> Result<FrameRequest, Self::Error>;

    /// Cancels a pending request.
    ///
    /// # Errors
    ///
    /// Host specific.
    fn cancel_frame(&mut self, request: FrameRequest) -> Result<(), Self::Error>;
}

/// One logical frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Logical frame index since start, strictly increasing within a run.
    pub index: u64,
    /// Host timestamp of the tick that produced this frame, in milliseconds.
    pub timestamp_ms: f64,
    /// Continuous seconds since the first tick of the run.
    pub elapsed: f64,
}

/// Throttles host ticks to a logical frame rate.
///
/// The scheduler is a plain state machine; it never stores a callback.
/// [`tick`](Self::tick) returns `Some(Frame)` when the caller should run its
/// per-frame work.
///
/// # Example
///
/// ```rust
/// use oscillator::{FrameScheduler, ManualFrameHost};
///
/// let mut host = ManualFrameHost::new();
/// let mut scheduler = FrameScheduler::new(60);
/// scheduler.start(&mut host).unwrap();
///
/// let first = scheduler.tick(500.0, &mut host).unwrap().unwrap();
/// assert_eq!(first.index, 0);
///
/// // 10ms later is still logical frame 0
/// assert!(scheduler.tick(510.0, &mut host).unwrap().is_none());
/// assert!((scheduler.elapsed() - 0.010).abs() < 1e-12);
///
/// let second = scheduler.tick(517.0, &mut host).unwrap().unwrap();
/// assert_eq!(second.index, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScheduler {
    fps: u32,
    frame_ms: f64,
    running: bool,
    pending: Option<FrameRequest>,
    start_timestamp: Option<f64>,
    last_index: Option<u64>,
    elapsed_ms: f64,
}

impl FrameScheduler {
    /// Creates a stopped scheduler. `fps` is clamped to `1..=120`.
    pub fn new(fps: u32) -> Self {
        let fps = fps.clamp(MIN_FPS, MAX_FPS);
        Self {
            fps,
            frame_ms: self::fps(fps),
            running: false,
            pending: None,
            start_timestamp: None,
            last_index: None,
            elapsed_ms: 0.0,
        }
    }

    /// Target logical frames per second.
    pub fn target_fps(&self) -> u32 {
        self.fps
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The outstanding host request, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Host timestamp of the first tick of the run, once seen.
    pub fn start_timestamp(&self) -> Option<f64> {
        self.start_timestamp
    }

    /// Index of the last frame produced in this run.
    pub fn last_index(&self) -> Option<u64> {
        self.last_index
    }

    /// Continuous seconds since the first tick of the run.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }

    /// Starts a fresh run and requests the first frame.
    ///
    /// Returns `false` without touching the host if already running.
    ///
    /// # Errors
    ///
    /// Propagates the host's error if the request fails; the scheduler stays
    /// stopped.
    pub fn start<H: FrameHost>(&mut self, host: &mut H) -> Result<bool, H::Error> {
        if self.running {
            return Ok(false);
        }
        self.reset_clock();
        self.pending = Some(host.request_frame()?);
        self.running = true;
        debug!(fps = self.fps, "frame scheduler started");
        Ok(true)
    }

    /// Cancels the pending request and clears timing state.
    ///
    /// Returns `false` if the scheduler was not running.
    ///
    /// # Errors
    ///
    /// Propagates the host's error if cancellation fails. The scheduler is
    /// stopped regardless, so any stale tick that still arrives is ignored.
    pub fn stop<H: FrameHost>(&mut self, host: &mut H) -> Result<bool, H::Error> {
        if !self.running {
            return Ok(false);
        }
        self.running = false;
        self.reset_clock();
        let cancelled = match self.pending.take() {
            Some(request) => host.cancel_frame(request),
            None => Ok(()),
        };
        debug!("frame scheduler stopped");
        cancelled.map(|()| true)
    }

    /// Restarts elapsed time at zero without interrupting the run.
    ///
    /// The next tick becomes the new start timestamp and produces frame 0.
    pub fn restart_clock(&mut self) {
        if self.running {
            self.reset_clock();
            trace!("frame scheduler clock restarted");
        }
    }

    /// Handles one host tick at `timestamp_ms`.
    ///
    /// Updates elapsed time, requests the next frame, and returns the logical
    /// frame if this tick begins one. Ticks arriving while stopped are stale
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Propagates the host's error if the follow-up request fails; the
    /// scheduler is then left stopped.
    pub fn tick<H: FrameHost>(
        &mut self,
        timestamp_ms: f64,
        host: &mut H,
    ) -> Result<Option<Frame>, H::Error> {
        if !self.running {
            trace!(timestamp_ms, "ignoring tick while stopped");
            return Ok(None);
        }
        self.pending = None;

        let start = *self.start_timestamp.get_or_insert(timestamp_ms);
        self.elapsed_ms = (timestamp_ms - start).max(0.0);
        let index = frame_index(self.elapsed_ms, self.frame_ms);

        let frame = match self.last_index {
            Some(last) if index <= last => None,
            _ => {
                self.last_index = Some(index);
                Some(Frame {
                    index,
                    timestamp_ms,
                    elapsed: self.elapsed(),
                })
            }
        };

        match host.request_frame() {
            Ok(request) => self.pending = Some(request),
            Err(err) => {
                self.running = false;
                self.reset_clock();
                return Err(err);
            }
        }
        Ok(frame)
    }

    fn reset_clock(&mut self) {
        self.start_timestamp = None;
        self.last_index = None;
        self.elapsed_ms = 0.0;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn frame_index(elapsed_ms: f64, frame_ms: f64) -> u64 {
    (elapsed_ms / frame_ms).floor() as u64
}

/// A [`FrameHost`] driven by hand.
///
/// Requests are queued; [`fire`](Self::fire) consumes the oldest one, after
/// which the caller delivers the tick with a timestamp of its choosing. Used
/// by tests and by headless drivers.
///
/// ```rust
/// use oscillator::{FrameHost, ManualFrameHost};
///
/// let mut host = ManualFrameHost::new();
/// let request = host.request_frame().unwrap();
/// assert_eq!(host.pending(), &[request]);
/// assert_eq!(host.fire(), Some(request));
/// assert!(host.pending().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualFrameHost {
    next_id: i32,
    pending: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
    requested: usize,
}

impl ManualFrameHost {
    /// Creates a host with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled.
    pub fn pending(&self) -> &[FrameRequest] {
        &self.pending
    }

    /// Requests cancelled so far.
    pub fn cancelled(&self) -> &[FrameRequest] {
        &self.cancelled
    }

    /// Total number of requests ever made.
    pub fn requested_count(&self) -> usize {
        self.requested
    }

    /// Consumes the oldest pending request, as the host would at its next frame.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameHost for ManualFrameHost {
    type Error = Infallible;

    fn request_frame(&mut self) -> Result<FrameRequest, Self::Error> {
        self.next_id = self.next_id.wrapping_add(1);
        self.requested += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        Ok(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) -> Result<(), Self::Error> {
        self.pending.retain(|pending| *pending != request);
        self.cancelled.push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(fps: u32) -> (FrameScheduler, ManualFrameHost) {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new(fps);
        assert!(scheduler.start(&mut host).unwrap());
        (scheduler, host)
    }

    #[test]
    fn test_fps_clamped() {
        assert_eq!(FrameScheduler::new(0).target_fps(), 1);
        assert_eq!(FrameScheduler::new(500).target_fps(), 120);
        assert_eq!(FrameScheduler::new(60).target_fps(), 60);
    }

    #[test]
    fn test_start_requests_one_frame() {
        let (scheduler, host) = running(60);
        assert!(scheduler.is_running());
        assert_eq!(host.pending().len(), 1);
        assert_eq!(scheduler.pending(), Some(host.pending()[0]));
        assert_eq!(scheduler.start_timestamp(), None);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (mut scheduler, mut host) = running(60);
        assert!(!scheduler.start(&mut host).unwrap());
        assert_eq!(host.requested_count(), 1);
    }

    #[test]
    fn test_first_tick_is_frame_zero() {
        let (mut scheduler, mut host) = running(60);
        host.fire();
        let frame = scheduler.tick(1234.5, &mut host).unwrap().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.elapsed, 0.0);
        assert_eq!(scheduler.start_timestamp(), Some(1234.5));
        assert_eq!(host.pending().len(), 1);
    }

    #[test]
    fn test_ticks_within_frame_suppressed() {
        let (mut scheduler, mut host) = running(60);
        assert!(scheduler.tick(0.0, &mut host).unwrap().is_some());
        assert!(scheduler.tick(5.0, &mut host).unwrap().is_none());
        assert!(scheduler.tick(16.0, &mut host).unwrap().is_none());
        assert_eq!(scheduler.tick(17.0, &mut host).unwrap().unwrap().index, 1);
        // Elapsed keeps moving even on suppressed ticks
        assert!((scheduler.elapsed() - 0.017).abs() < 1e-12);
    }

    #[test]
    fn test_large_gap_skips_indices() {
        let (mut scheduler, mut host) = running(60);
        scheduler.tick(0.0, &mut host).unwrap();
        let frame = scheduler.tick(110.0, &mut host).unwrap().unwrap();
        assert_eq!(frame.index, 6);
    }

    #[test]
    fn test_stop_cancels_and_clears() {
        let (mut scheduler, mut host) = running(60);
        scheduler.tick(10.0, &mut host).unwrap();
        scheduler.tick(50.0, &mut host).unwrap();
        let pending = scheduler.pending().unwrap();

        assert!(scheduler.stop(&mut host).unwrap());
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.pending(), None);
        assert_eq!(scheduler.start_timestamp(), None);
        assert_eq!(scheduler.last_index(), None);
        assert_eq!(scheduler.elapsed(), 0.0);
        assert_eq!(host.cancelled(), &[pending]);
        assert!(host.pending().is_empty());

        assert!(!scheduler.stop(&mut host).unwrap());
    }

    #[test]
    fn test_stale_tick_after_stop_ignored() {
        let (mut scheduler, mut host) = running(60);
        scheduler.stop(&mut host).unwrap();
        let requested = host.requested_count();
        assert!(scheduler.tick(100.0, &mut host).unwrap().is_none());
        assert_eq!(host.requested_count(), requested);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_restart_after_stop_begins_fresh() {
        let (mut scheduler, mut host) = running(60);
        scheduler.tick(0.0, &mut host).unwrap();
        scheduler.tick(500.0, &mut host).unwrap();
        scheduler.stop(&mut host).unwrap();

        scheduler.start(&mut host).unwrap();
        let frame = scheduler.tick(9000.0, &mut host).unwrap().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(scheduler.elapsed(), 0.0);
    }

    #[test]
    fn test_restart_clock_keeps_running() {
        let (mut scheduler, mut host) = running(60);
        scheduler.tick(0.0, &mut host).unwrap();
        scheduler.tick(400.0, &mut host).unwrap();
        scheduler.restart_clock();
        assert!(scheduler.is_running());
        assert!(scheduler.pending().is_some());

        let frame = scheduler.tick(420.0, &mut host).unwrap().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.elapsed, 0.0);
    }

    #[test]
    fn test_timestamp_before_start_clamps_to_zero() {
        let (mut scheduler, mut host) = running(60);
        scheduler.tick(100.0, &mut host).unwrap();
        assert!(scheduler.tick(90.0, &mut host).unwrap().is_none());
        assert_eq!(scheduler.elapsed(), 0.0);
    }
}
