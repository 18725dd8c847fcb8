#![forbid(unsafe_code)]

//! Deterministic, host-driven timer queue.
//!
//! Time only moves when the host calls [`TimerQueue::pop_due`] with a later
//! horizon, so the same sequence of events and clock steps always fires the
//! same timers in the same order. There is no `Instant::now()` anywhere.
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; ties fire in arming order.
//! 2. A cancelled handle never fires.
//! 3. [`TimerSlot`] holds at most one armed handle: arming always cancels the
//!    previous one first.

use core::time::Duration;

/// Opaque identifier of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a fired timer means to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Hide the pages a transition marked for hiding.
    TransitionCleanup,
    /// Clear the user-action debounce flag.
    UserDebounce,
    /// Clear the history-replay debounce flag.
    ReplayDebounce,
    /// Request replacement content for an in-place swap.
    ContentSwap,
    /// Start the staggered menu fade-in.
    MenuFadeIn,
    /// Remove menu items from layout after the fade-out.
    MenuRemoval,
}

#[derive(Debug, Clone)]
struct Pending<K> {
    handle: TimerHandle,
    deadline: Duration,
    kind: K,
}

/// Queue of armed timers against a monotonic clock advanced by the host.
#[derive(Debug, Clone)]
pub struct TimerQueue<K = TimerKind> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Create an empty queue with the clock at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current monotonic time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Arm a timer that fires `delay` after the current time.
    pub fn arm(&mut self, delay: Duration, kind: K) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        tracing::trace!(
            target: "pageflow.timer",
            id = handle.0,
            deadline_ms = deadline.as_millis() as u64,
            "timer armed"
        );
        self.pending.push(Pending {
            handle,
            deadline,
            kind,
        });
        handle
    }

    /// Cancel an armed timer. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        let removed = self.pending.len() != before;
        if removed {
            tracing::trace!(target: "pageflow.timer", id = handle.0, "timer cancelled");
        }
        removed
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Count armed timers of a given kind.
    #[must_use]
    pub fn count_kind(&self, kind: K) -> usize
    where
        K: PartialEq,
    {
        self.pending.iter().filter(|p| p.kind == kind).count()
    }

    /// Remove and return the earliest timer due at or before `horizon`,
    /// moving the clock to its deadline.
    ///
    /// Call repeatedly until `None`, then [`settle`](Self::settle) at the
    /// horizon. Timers armed in between are considered too.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<(TimerHandle, K)> {
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= horizon)
            .min_by_key(|(_, p)| (p.deadline, p.handle.0))
            .map(|(pos, _)| pos)?;
        let fired = self.pending.remove(pos);
        if fired.deadline > self.now {
            self.now = fired.deadline;
        }
        tracing::trace!(
            target: "pageflow.timer",
            id = fired.handle.0,
            at_ms = self.now.as_millis() as u64,
            "timer fired"
        );
        Some((fired.handle, fired.kind))
    }

    /// Move the clock forward to `horizon` once all due timers are drained.
    pub fn settle(&mut self, horizon: Duration) {
        if horizon > self.now {
            self.now = horizon;
        }
    }
}

/// Single-slot timer ownership: one logical operation, at most one timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSlot(Option<TimerHandle>);

impl TimerSlot {
    /// Empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Cancel whatever is armed, then arm a fresh timer.
    pub fn arm<K>(&mut self, queue: &mut TimerQueue<K>, delay: Duration, kind: K) -> TimerHandle {
        self.cancel(queue);
        let handle = queue.arm(delay, kind);
        self.0 = Some(handle);
        handle
    }

    /// Cancel the armed timer, if any. Returns whether one was armed.
    pub fn cancel<K>(&mut self, queue: &mut TimerQueue<K>) -> bool {
        match self.0.take() {
            Some(handle) => queue.cancel(handle),
            None => false,
        }
    }

    /// Claim a fired handle. Returns `true` (and empties the slot) only when
    /// `handle` is the one this slot armed; stale handles are ignored.
    pub fn take_if(&mut self, handle: TimerHandle) -> bool {
        if self.0 == Some(handle) {
            self.0 = None;
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<TimerHandle> {
        self.0
    }
}
