#![forbid(unsafe_code)]

//! Step-based program runner.
//!
//! [`StepRuntime`] drives a [`Program`] without threads or blocking. The host
//! controls the loop:
//!
//! 1. Events fired by the rendered tree (or [`StepRuntime::push_message`])
//!    queue messages.
//! 2. [`StepRuntime::advance_time`] moves the deterministic clock that
//!    time-based subscriptions read.
//! 3. [`StepRuntime::step`] polls subscriptions, runs queued messages through
//!    `update`, executes commands and publishes the new model once.
//!
//! # Example
//!
//! ```ignore
//! let mut component = nui_runtime::program(MyApp).start();
//! component.mount()?;
//!
//! // Host-driven frame loop
//! component.runtime_mut().advance_time(Duration::from_millis(16));
//! let result = component.runtime_mut().step();
//! if component.needs_render() {
//!     let tree = component.render(&host);
//! }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, trace, trace_span, warn};

use crate::program::{Cmd, Dispatch, Program};
use crate::runtime::{RenderCallback, Runtime};
use crate::subscription::{SubId, SubscriptionManager};

/// Default cap on messages processed by one [`StepRuntime::step`].
pub const DEFAULT_MAX_MESSAGES_PER_STEP: usize = 1024;

/// Configuration for a [`StepRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    /// Upper bound on messages run through `update` per step. Messages
    /// beyond the cap stay queued for the next step.
    pub max_messages_per_step: usize,
    /// Clock value at construction.
    pub start_time: Duration,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            max_messages_per_step: DEFAULT_MAX_MESSAGES_PER_STEP,
            start_time: Duration::ZERO,
        }
    }
}

impl StepConfig {
    /// Set the per-step message cap (at least 1).
    #[must_use]
    pub fn with_max_messages_per_step(mut self, max: usize) -> Self {
        self.max_messages_per_step = max.max(1);
        self
    }

    /// Set the initial clock value.
    #[must_use]
    pub fn with_start_time(mut self, start: Duration) -> Self {
        self.start_time = start;
        self
    }
}

/// Result of a single [`StepRuntime::step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Messages run through `update` during this step.
    pub messages_processed: usize,
    /// Whether a new model was published.
    pub rendered: bool,
    /// Messages still queued after the step.
    pub pending: usize,
}

type Queue<M> = Rc<RefCell<VecDeque<M>>>;

struct Running<P: Program> {
    program: Rc<P>,
    callback: RenderCallback<P>,
    dispatch: Dispatch<P::Message>,
    model: Rc<P::Model>,
}

/// Host-driven, non-blocking runtime.
///
/// # Lifecycle
///
/// 1. [`StepRuntime::new`]: create, usually through [`crate::program`].
/// 2. [`Runtime::initialize`]: called by the adapter on mount; runs `init`
///    and publishes the first model.
/// 3. [`StepRuntime::step`]: call repeatedly from the host loop.
/// 4. [`Runtime::shutdown`]: called by the adapter on unmount.
pub struct StepRuntime<P: Program> {
    config: StepConfig,
    queue: Queue<P::Message>,
    running: Option<Running<P>>,
    subscriptions: SubscriptionManager<P::Message>,
    now: Duration,
    logs: Vec<String>,
    steps: u64,
}

impl<P: Program> StepRuntime<P> {
    /// Create a runtime with default configuration.
    pub fn new() -> Self {
        Self::with_config(StepConfig::default())
    }

    /// Create a runtime with `config`.
    pub fn with_config(config: StepConfig) -> Self {
        Self {
            now: config.start_time,
            config,
            queue: Rc::new(RefCell::new(VecDeque::new())),
            running: None,
            subscriptions: SubscriptionManager::new(),
            logs: Vec::new(),
            steps: 0,
        }
    }

    /// Run queued messages and publish the resulting model.
    ///
    /// Subscriptions are polled first with the current clock. At most
    /// [`StepConfig::max_messages_per_step`] messages are processed; the
    /// model is published once at the end if any message ran.
    pub fn step(&mut self) -> StepResult {
        let Some(program) = self.running.as_ref().map(|r| Rc::clone(&r.program)) else {
            return StepResult {
                pending: self.pending(),
                ..StepResult::default()
            };
        };
        self.steps += 1;
        let _span = trace_span!("nui.step", step = self.steps).entered();

        let due = self.subscriptions.poll(self.now);
        self.queue.borrow_mut().extend(due);

        let mut processed = 0;
        while processed < self.config.max_messages_per_step {
            let Some(msg) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let Some(running) = self.running.as_mut() else {
                break;
            };
            let (model, cmd) = program.update(msg, &running.model);
            running.model = Rc::new(model);
            processed += 1;
            trace!(cmd = cmd.type_name(), "update");
            self.execute_cmd(cmd);
        }

        let rendered = processed > 0;
        if rendered {
            self.reconcile_subscriptions();
            self.publish();
        }

        let pending = self.pending();
        if pending > 0 {
            debug!(pending, "message cap reached; remaining messages deferred");
        }
        StepResult {
            messages_processed: processed,
            rendered,
            pending,
        }
    }

    /// Queue a message as if it had been dispatched by the tree.
    pub fn push_message(&self, msg: P::Message) {
        self.queue.borrow_mut().push_back(msg);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current model, if initialized.
    pub fn model(&self) -> Option<&P::Model> {
        self.running.as_ref().map(|r| &*r.model)
    }

    /// Dispatch handle, if initialized.
    pub fn dispatcher(&self) -> Option<Dispatch<P::Message>> {
        self.running.as_ref().map(|r| r.dispatch.clone())
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Lines emitted by [`Cmd::Log`].
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Take the emitted log lines, leaving none behind.
    pub fn take_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.logs)
    }

    /// Whether the runtime has been initialized and not shut down.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// IDs of the active subscriptions.
    pub fn subscription_ids(&self) -> Vec<SubId> {
        self.subscriptions.ids()
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.active_count()
    }

    /// Configuration in use.
    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    // --- Private helpers ---

    fn execute_cmd(&mut self, cmd: Cmd<P::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Msg(m) => self.queue.borrow_mut().push_back(m),
            // Tasks are synchronous, so a batch already runs in order.
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Task(f) => {
                // No threads here: run the task on the UI thread.
                let msg = f();
                self.queue.borrow_mut().push_back(msg);
            }
            Cmd::Log(text) => {
                info!(target: "nui::program", "{text}");
                self.logs.push(text);
            }
        }
    }

    fn reconcile_subscriptions(&mut self) {
        if let Some(running) = &self.running {
            let subs = running.program.subscriptions(&running.model);
            self.subscriptions.reconcile(subs, self.now);
        }
    }

    fn publish(&self) {
        if let Some(running) = &self.running {
            running
                .callback
                .render(&running.dispatch, Rc::clone(&running.model));
        }
    }
}

impl<P: Program> Default for StepRuntime<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Program> Runtime<P> for StepRuntime<P> {
    fn initialize(&mut self, program: Rc<P>, callback: RenderCallback<P>) {
        if self.running.is_some() {
            warn!("step runtime initialized twice; restarting program");
            self.shutdown();
        }

        let queue = Rc::clone(&self.queue);
        let dispatch = Dispatch::new(move |msg| queue.borrow_mut().push_back(msg));
        let (model, cmd) = program.init();
        self.running = Some(Running {
            program,
            callback,
            dispatch,
            model: Rc::new(model),
        });
        trace!(cmd = cmd.type_name(), "init");
        self.execute_cmd(cmd);
        self.reconcile_subscriptions();
        self.publish();
        debug!(pending = self.pending(), "step runtime initialized");
    }

    fn shutdown(&mut self) {
        if self.running.take().is_some() {
            self.subscriptions.stop_all();
            self.queue.borrow_mut().clear();
            debug!(steps = self.steps, "step runtime shut down");
        }
    }

    fn pump(&mut self) -> bool {
        self.step().messages_processed > 0
    }
}

impl<P: Program> fmt::Debug for StepRuntime<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRuntime")
            .field("running", &self.is_running())
            .field("now", &self.now)
            .field("pending", &self.pending())
            .field("subscriptions", &self.subscriptions.active_count())
            .field("steps", &self.steps)
            .finish()
    }
}
