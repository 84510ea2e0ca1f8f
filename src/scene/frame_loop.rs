//! The per-frame callback registry that drives scenes.
//!
//! A [`FrameLoop`] owns the clock. Each [`FrameLoop::advance`] reads the
//! clock, clamps it so elapsed time never decreases, and hands the same
//! [`FrameTick`] to every subscriber in subscription order.

use std::time::Instant;

/// Handle returned by [`FrameLoop::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// What subscribers see each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Zero-based frame number.
    pub frame: u64,
    /// Seconds since the loop started, never decreasing.
    pub elapsed: f32,
}

/// Where elapsed time comes from.
#[derive(Debug, Clone, Copy)]
pub enum FrameClock {
    /// Wall-clock time since `start`.
    Realtime { start: Instant },
    /// `frame / fps`, independent of how long frames take.
    Fixed { fps: f32 },
}

impl FrameClock {
    pub fn realtime() -> Self {
        Self::Realtime {
            start: Instant::now(),
        }
    }

    pub fn fixed(fps: f32) -> Self {
        Self::Fixed { fps }
    }

    fn elapsed_at(&self, frame: u64) -> f32 {
        match self {
            Self::Realtime { start } => start.elapsed().as_secs_f32(),
            Self::Fixed { fps } if *fps > 0.0 => frame as f32 / fps,
            Self::Fixed { .. } => 0.0,
        }
    }
}

type FrameCallback = Box<dyn FnMut(FrameTick)>;

pub struct FrameLoop {
    clock: FrameClock,
    frame: u64,
    last_elapsed: f32,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, FrameCallback)>,
}

impl FrameLoop {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            frame: 0,
            last_elapsed: 0.0,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(FrameTick) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Frames emitted so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Read the clock and run one frame.
    pub fn advance(&mut self) -> FrameTick {
        let elapsed = self.clock.elapsed_at(self.frame);
        self.advance_to(elapsed)
    }

    /// Run one frame at an externally supplied time.
    ///
    /// Times earlier than the previous frame (or NaN) are clamped to it.
    pub fn advance_to(&mut self, elapsed: f32) -> FrameTick {
        let elapsed = elapsed.max(self.last_elapsed);
        let tick = FrameTick {
            frame: self.frame,
            elapsed,
        };

        for (_, callback) in self.subscribers.iter_mut() {
            callback(tick);
        }

        self.last_elapsed = elapsed;
        self.frame += 1;
        tick
    }

    /// Run `frames` frames back to back.
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.advance();
        }
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("clock", &self.clock)
            .field("frame", &self.frame)
            .field("last_elapsed", &self.last_elapsed)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
