use std::io;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Where display events come from. The production implementation wraps
/// the display connection's file descriptor; tests script a sequence.
pub trait EventSource {
    type Event;

    /// Block up to `timeout` for the next event; `Ok(None)` on timeout.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Self::Event>>;
}

/// What one iteration of the loop hands to the handler.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopEvent<E, T> {
    /// An input event arrived from the source.
    Input(E),
    /// A scheduled one-shot deadline came due.
    Timer(T),
    /// The poll interval elapsed with nothing to do.
    Tick,
}

/// One-shot deadlines carrying an opaque token back to the handler.
/// Deadlines fire in time order; equal deadlines fire in schedule order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    deadlines: BTreeMap<(Instant, u64), T>,
    seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            deadlines: BTreeMap::new(),
            seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Instant, token: T) {
        self.deadlines.insert((at, self.seq), token);
        self.seq += 1;
    }

    pub fn schedule_after(&mut self, delay: Duration, token: T) {
        self.schedule(Instant::now() + delay, token);
    }

    /// Drop every pending deadline carrying this token.
    pub fn cancel(&mut self, token: &T)
    where
        T: PartialEq,
    {
        self.deadlines.retain(|_, t| t != token);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.keys().next().map(|&(at, _)| at)
    }

    /// Remove and return the earliest deadline at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let &(at, seq) = self.deadlines.keys().next()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&(at, seq))
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }
}

/// A centralized event loop that drives the main thread.
///
/// This is the only place that polls the source. Each iteration delivers
/// due timers first, then at most one input event, then a tick when the
/// poll interval elapsed idle. The handler routes events to the
/// dispatcher and the per-window machines.
pub struct EventLoop<S, T> {
    source: S,
    timers: TimerQueue<T>,
    poll_interval: Duration,
}

impl<S: EventSource, T> EventLoop<S, T> {
    pub fn new(source: S, poll_interval: Duration) -> Self {
        Self {
            source,
            timers: TimerQueue::new(),
            poll_interval,
        }
    }

    pub fn source(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn timers(&mut self) -> &mut TimerQueue<T> {
        &mut self.timers
    }

    /// Runs the loop, taking control of the current thread until the
    /// handler returns `ControlFlow::Quit`.
    ///
    /// The poll timeout shrinks to the next timer deadline so a chain
    /// timeout or auto-raise delay fires on time even when the display
    /// stays silent.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut S, &mut TimerQueue<T>, LoopEvent<S::Event, T>) -> io::Result<ControlFlow>,
    {
        loop {
            let now = Instant::now();
            while let Some(token) = self.timers.pop_due(now) {
                if let ControlFlow::Quit =
                    handler(&mut self.source, &mut self.timers, LoopEvent::Timer(token))?
                {
                    return Ok(());
                }
            }

            let timeout = match self.timers.next_deadline() {
                Some(deadline) => deadline
                    .saturating_duration_since(now)
                    .min(self.poll_interval),
                None => self.poll_interval,
            };
            let event = match self.source.poll(timeout)? {
                Some(event) => LoopEvent::Input(event),
                None => LoopEvent::Tick,
            };
            if let ControlFlow::Quit = handler(&mut self.source, &mut self.timers, event)? {
                return Ok(());
            }
        }
    }
}
