#![forbid(unsafe_code)]

//! Subscription system for ongoing message sources.
//!
//! Subscriptions are declared by [`Program::subscriptions`] and polled by the
//! runtime with the host-supplied clock; nothing runs on a background thread.
//!
//! # How it works
//!
//! 1. `Program::subscriptions()` returns the set of active subscriptions
//! 2. After each batch of updates, the runtime compares active vs previous subscriptions
//! 3. New subscriptions are started, removed ones are dropped, unchanged ones keep their state
//! 4. On every step the runtime polls active subscriptions and queues their messages
//!
//! [`Program::subscriptions`]: crate::program::Program::subscriptions

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

/// A unique identifier for a subscription.
///
/// Used by the runtime to track which subscriptions are active and
/// to deduplicate subscriptions across update cycles.
pub type SubId = u64;

/// A subscription produces messages from a host-driven source.
pub trait Subscription<M> {
    /// Unique identifier for deduplication.
    ///
    /// Subscriptions with the same ID are considered identical; the runtime
    /// keeps the running instance and discards the newly declared one.
    fn id(&self) -> SubId;

    /// Called once when the subscription becomes active at time `now`.
    fn start(&mut self, _now: Duration) {}

    /// Messages due at time `now`.
    fn poll(&mut self, now: Duration) -> Vec<M>;
}

/// Tracks the running subscriptions of one program.
pub(crate) struct SubscriptionManager<M> {
    active: Vec<Box<dyn Subscription<M>>>,
}

impl<M> SubscriptionManager<M> {
    pub(crate) fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Update the set of active subscriptions.
    ///
    /// Compares the new set against currently running subscriptions:
    /// - Starts subscriptions that are new (ID not in active set)
    /// - Drops subscriptions that are no longer declared (ID not in new set)
    /// - Leaves unchanged subscriptions running
    pub(crate) fn reconcile(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>, now: Duration) {
        let new_ids: HashSet<SubId> = subscriptions.iter().map(|s| s.id()).collect();
        let active_before = self.active.len();

        self.active.retain(|running| {
            let keep = new_ids.contains(&running.id());
            if !keep {
                debug!(sub_id = running.id(), "stopping subscription");
            }
            keep
        });

        let mut active_ids: HashSet<SubId> = self.active.iter().map(|s| s.id()).collect();
        for mut sub in subscriptions {
            let id = sub.id();
            if !active_ids.insert(id) {
                continue;
            }
            debug!(sub_id = id, "starting subscription");
            sub.start(now);
            self.active.push(sub);
        }

        trace!(
            active_before,
            active_after = self.active.len(),
            "subscription reconcile complete"
        );
    }

    /// Collect messages due at `now` from every active subscription.
    pub(crate) fn poll(&mut self, now: Duration) -> Vec<M> {
        self.active.iter_mut().flat_map(|sub| sub.poll(now)).collect()
    }

    /// Return the number of active subscriptions.
    #[inline]
    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    /// IDs of active subscriptions, in start order.
    pub(crate) fn ids(&self) -> Vec<SubId> {
        self.active.iter().map(|s| s.id()).collect()
    }

    /// Drop all running subscriptions.
    pub(crate) fn stop_all(&mut self) {
        self.active.clear();
    }
}

// --- Built-in subscriptions ---

/// A subscription that fires at a fixed interval.
///
/// Fires at most once per poll. After a pause longer than the interval the
/// next poll yields a single message and the schedule restarts from there.
///
/// # Example
///
/// ```ignore
/// fn subscriptions(&self, _model: &Model) -> Vec<Box<dyn Subscription<Msg>>> {
///     vec![Box::new(Every::new(Duration::from_secs(1), || Msg::Tick))]
/// }
/// ```
pub struct Every<M> {
    id: SubId,
    interval: Duration,
    next_due: Option<Duration>,
    make_msg: Box<dyn Fn() -> M>,
}

impl<M> Every<M> {
    /// Create a tick subscription with the given interval and message factory.
    pub fn new(interval: Duration, make_msg: impl Fn() -> M + 'static) -> Self {
        // Generate a stable ID from the interval to allow deduplication
        let id = interval.as_nanos() as u64 ^ 0x5449_434B; // "TICK" magic
        Self::with_id(id, interval, make_msg)
    }

    /// Create a tick subscription with an explicit ID.
    pub fn with_id(id: SubId, interval: Duration, make_msg: impl Fn() -> M + 'static) -> Self {
        Self {
            id,
            interval,
            next_due: None,
            make_msg: Box::new(make_msg),
        }
    }

    /// The tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<M> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn start(&mut self, now: Duration) {
        self.next_due = Some(now + self.interval);
    }

    fn poll(&mut self, now: Duration) -> Vec<M> {
        let Some(due) = self.next_due else {
            self.start(now);
            return Vec::new();
        };
        if due > now {
            return Vec::new();
        }
        // Missed intervals collapse into one tick; the schedule restarts
        // from `now`.
        self.next_due = Some(now + self.interval);
        trace!(sub_id = self.id, late = ?(now - due), "every fired");
        vec![(self.make_msg)()]
    }
}

impl<M> fmt::Debug for Every<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Every")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("next_due", &self.next_due)
            .finish()
    }
}
