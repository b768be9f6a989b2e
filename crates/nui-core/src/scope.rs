#![forbid(unsafe_code)]

//! Event scopes: the runtime trail of taggers between a subtree and the root.
//!
//! The renderer creates one [`EventScope`] per run of directly nested tagger
//! nodes. Each scope keeps its flattened [`TaggerChain`] and a link to the
//! enclosing scope; the root scope links to a [`DispatchSlot`] instead.
//! Event handlers hold an `Rc` to the scope they were created in and walk the
//! links upwards when an event fires.
//!
//! Chains are immutable once built. The only mutable piece is the root's
//! dispatch slot, which the program adapter fills in once the application
//! runtime hands over its dispatch sink.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::message::{AnyMessage, MessageMismatch, Tagger};

/// Taggers applied to messages leaving one scope.
#[derive(Clone)]
pub enum TaggerChain {
    /// Messages pass through unchanged (root scope).
    Identity,
    /// One tagger node.
    Single(Tagger),
    /// A flattened run of nested tagger nodes, outermost first.
    Flattened(Rc<[Tagger]>),
}

impl TaggerChain {
    /// Build a chain from taggers collected outermost first.
    ///
    /// An empty list yields [`Identity`](Self::Identity) and a single tagger
    /// stays [`Single`](Self::Single).
    pub fn from_taggers(mut taggers: Vec<Tagger>) -> Self {
        match taggers.len() {
            0 => Self::Identity,
            1 => match taggers.pop() {
                Some(tagger) => Self::Single(tagger),
                None => Self::Identity,
            },
            _ => Self::Flattened(taggers.into()),
        }
    }

    /// Apply the chain, innermost tagger first.
    pub fn apply(&self, msg: AnyMessage) -> Result<AnyMessage, MessageMismatch> {
        match self {
            Self::Identity => Ok(msg),
            Self::Single(tagger) => tagger.apply(msg),
            Self::Flattened(taggers) => taggers
                .iter()
                .rev()
                .try_fold(msg, |msg, tagger| tagger.apply(msg)),
        }
    }

    /// Number of taggers in the chain.
    pub fn len(&self) -> usize {
        match self {
            Self::Identity => 0,
            Self::Single(_) => 1,
            Self::Flattened(taggers) => taggers.len(),
        }
    }

    /// Whether the chain leaves messages untouched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TaggerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "Identity"),
            Self::Single(t) => f.debug_tuple("Single").field(t).finish(),
            Self::Flattened(ts) => f.debug_tuple("Flattened").field(ts).finish(),
        }
    }
}

/// Function receiving fully translated messages.
pub type DispatchFn = Rc<dyn Fn(AnyMessage)>;

#[derive(Default)]
struct SlotState {
    sink: Option<DispatchFn>,
    log_decode_failures: bool,
}

/// Shared cell holding the application runtime's dispatch sink.
///
/// Starts empty; messages delivered before a sink is installed are dropped.
#[derive(Clone, Default)]
pub struct DispatchSlot {
    state: Rc<RefCell<SlotState>>,
}

impl DispatchSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log decode failures at `debug!` rather than `trace!` for handlers
    /// dispatching into this slot.
    #[must_use]
    pub fn with_decode_failure_logging(self, enabled: bool) -> Self {
        self.state.borrow_mut().log_decode_failures = enabled;
        self
    }

    /// Install (or replace) the sink.
    pub fn install(&self, sink: DispatchFn) {
        self.state.borrow_mut().sink = Some(sink);
    }

    /// Remove the sink; later deliveries are dropped.
    pub fn clear(&self) {
        self.state.borrow_mut().sink = None;
    }

    /// Whether a sink is installed.
    pub fn is_installed(&self) -> bool {
        self.state.borrow().sink.is_some()
    }

    /// Whether decode failures in handlers dispatching here log at `debug!`.
    pub fn logs_decode_failures(&self) -> bool {
        self.state.borrow().log_decode_failures
    }

    /// Hand `msg` to the sink. Returns `false` when no sink is installed.
    ///
    /// The borrow is released before the sink runs, so a sink may re-enter
    /// the slot (for example to dispatch again synchronously).
    pub fn deliver(&self, msg: AnyMessage) -> bool {
        let sink = self.state.borrow().sink.clone();
        match sink {
            Some(sink) => {
                sink(msg);
                true
            }
            None => {
                trace!("no dispatch sink installed; message dropped");
                false
            }
        }
    }
}

impl fmt::Debug for DispatchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Where a scope's translated messages go next.
#[derive(Clone, Debug)]
pub enum ScopeLink {
    /// Root scope: deliver to the dispatch sink.
    Root(DispatchSlot),
    /// Nested scope: continue with the enclosing scope.
    Parent(Rc<EventScope>),
}

/// One link of the scope chain built while rendering.
#[derive(Debug)]
pub struct EventScope {
    chain: TaggerChain,
    link: ScopeLink,
}

impl EventScope {
    /// A root scope with the identity chain dispatching into `slot`.
    pub fn root(slot: DispatchSlot) -> Rc<Self> {
        Rc::new(Self {
            chain: TaggerChain::Identity,
            link: ScopeLink::Root(slot),
        })
    }

    /// A nested scope applying `chain` before handing over to `parent`.
    pub fn child(parent: &Rc<Self>, chain: TaggerChain) -> Rc<Self> {
        Rc::new(Self {
            chain,
            link: ScopeLink::Parent(Rc::clone(parent)),
        })
    }

    /// This scope's taggers.
    pub fn chain(&self) -> &TaggerChain {
        &self.chain
    }

    /// Link to the next scope or the dispatch slot.
    pub fn link(&self) -> &ScopeLink {
        &self.link
    }

    /// Enclosing scope, `None` for the root.
    pub fn parent(&self) -> Option<&Rc<Self>> {
        match &self.link {
            ScopeLink::Parent(parent) => Some(parent),
            ScopeLink::Root(_) => None,
        }
    }

    /// Whether this is a root scope.
    pub fn is_root(&self) -> bool {
        matches!(self.link, ScopeLink::Root(_))
    }

    /// Number of links above this scope (0 for the root).
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self;
        while let Some(parent) = scope.parent() {
            depth += 1;
            scope = &**parent;
        }
        depth
    }

    /// The dispatch slot at the root of this chain.
    pub fn slot(&self) -> &DispatchSlot {
        let mut scope = self;
        loop {
            match &scope.link {
                ScopeLink::Root(slot) => return slot,
                ScopeLink::Parent(parent) => scope = &**parent,
            }
        }
    }

    /// Translate `msg` through this scope and every enclosing one, then
    /// deliver it to the root's dispatch slot.
    pub fn translate_and_deliver(&self, msg: AnyMessage) -> Result<bool, MessageMismatch> {
        let mut msg = msg;
        let mut scope = self;
        loop {
            msg = scope.chain.apply(msg)?;
            match &scope.link {
                ScopeLink::Parent(parent) => scope = &**parent,
                ScopeLink::Root(slot) => return Ok(slot.deliver(msg)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{downcast, erase};
    use std::cell::RefCell;

    fn collecting_slot() -> (DispatchSlot, Rc<RefCell<Vec<i64>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let slot = DispatchSlot::new();
        let sink_seen = Rc::clone(&seen);
        slot.install(Rc::new(move |msg| {
            if let Ok(n) = downcast::<i64>(msg) {
                sink_seen.borrow_mut().push(n);
            }
        }));
        (slot, seen)
    }

    #[test]
    fn from_taggers_picks_variant() {
        assert!(matches!(
            TaggerChain::from_taggers(vec![]),
            TaggerChain::Identity
        ));
        assert!(matches!(
            TaggerChain::from_taggers(vec![Tagger::new(|n: i64| n)]),
            TaggerChain::Single(_)
        ));
        let chain = TaggerChain::from_taggers(vec![Tagger::new(|n: i64| n); 3]);
        assert!(matches!(chain, TaggerChain::Flattened(_)));
        assert_eq!(chain.len(), 3);
        assert!(!chain.is_empty());
    }

    #[test]
    fn flattened_chain_applies_innermost_first() {
        // outermost: *10, innermost: +1  =>  (m + 1) * 10
        let chain = TaggerChain::from_taggers(vec![
            Tagger::new(|n: i64| n * 10),
            Tagger::new(|n: i64| n + 1),
        ]);
        let out = chain.apply(erase(4_i64)).expect("applies");
        assert_eq!(downcast::<i64>(out).expect("i64"), 50);
    }

    #[test]
    fn delivery_walks_every_scope() {
        let (slot, seen) = collecting_slot();
        let root = EventScope::root(slot);
        let mid = EventScope::child(&root, TaggerChain::from_taggers(vec![Tagger::new(|n: i64| n * 2)]));
        let leaf = EventScope::child(&mid, TaggerChain::from_taggers(vec![Tagger::new(|n: i64| n - 3)]));

        assert_eq!(leaf.depth(), 2);
        assert!(root.is_root());
        assert!(!leaf.is_root());
        assert!(leaf.translate_and_deliver(erase(10_i64)).expect("typed"));
        assert_eq!(*seen.borrow(), [14]);
    }

    #[test]
    fn empty_slot_drops_messages() {
        let root = EventScope::root(DispatchSlot::new());
        assert!(!root.translate_and_deliver(erase(1_i64)).expect("typed"));
    }

    #[test]
    fn mismatch_stops_before_delivery() {
        let (slot, seen) = collecting_slot();
        let root = EventScope::root(slot);
        let leaf = EventScope::child(&root, TaggerChain::Single(Tagger::new(|s: String| s.len() as i64)));
        let err = leaf.translate_and_deliver(erase(5_i64)).unwrap_err();
        assert!(err.expected.contains("String"));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn slot_is_shared_and_clearable() {
        let (slot, seen) = collecting_slot();
        let root = EventScope::root(slot.clone());
        let leaf = EventScope::child(&root, TaggerChain::Identity);
        assert!(leaf.slot().is_installed());
        slot.clear();
        assert!(!leaf.slot().is_installed());
        assert!(!leaf.translate_and_deliver(erase(1_i64)).expect("typed"));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn sink_may_reenter_slot() {
        let slot = DispatchSlot::new();
        let inner = slot.clone();
        let count = Rc::new(RefCell::new(0));
        let sink_count = Rc::clone(&count);
        slot.install(Rc::new(move |msg| {
            *sink_count.borrow_mut() += 1;
            if let Ok(n) = downcast::<i64>(msg) {
                if n > 0 {
                    inner.deliver(erase(n - 1));
                }
            }
        }));
        assert!(slot.deliver(erase(2_i64)));
        assert_eq!(*count.borrow(), 3);
    }
}
