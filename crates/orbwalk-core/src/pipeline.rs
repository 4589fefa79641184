//! Cancellation pipeline: the veto/override chain every order passes
//! through before it is committed.
//!
//! Listeners run synchronously, in subscription order, inside the call
//! that produced the intent. Each receives the current intent by shared
//! reference and answers with a [`Verdict`]: proceed (optionally with a
//! rewritten copy) or veto.
//!
//! A veto is final for the attempt. Later listeners still run and still see
//! the intent, so bookkeeping listeners never miss an attempt, but they
//! cannot revive it. A listener that returns an error or panics is treated
//! as a veto (fail closed) and the chain continues.

use std::panic::{self, AssertUnwindSafe};

use orbwalk_types::{ActionIntent, ListenerId};
use tracing::{debug, warn};

/// A listener's answer for one intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Let the order through, as given. The kind of the intent is fixed;
    /// only its position and target may differ from what was received.
    Proceed(ActionIntent),
    /// Drop the order.
    Veto,
}

/// A listener reported that it could not evaluate an intent.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The listener hit an internal fault.
    #[error("listener fault: {message}")]
    Fault {
        /// Description of the fault.
        message: String,
    },
}

/// A stage of the cancellation pipeline.
pub trait IntentListener {
    /// Inspect a pending intent.
    ///
    /// # Errors
    ///
    /// An error is treated exactly like [`Verdict::Veto`], and is logged.
    fn on_intent(&mut self, intent: &ActionIntent) -> Result<Verdict, ListenerError>;
}

impl<F> IntentListener for F
where
    F: FnMut(&ActionIntent) -> Verdict,
{
    fn on_intent(&mut self, intent: &ActionIntent) -> Result<Verdict, ListenerError> {
        Ok(self(intent))
    }
}

struct Subscription {
    id: ListenerId,
    listener: Box<dyn IntentListener>,
}

/// Ordered chain of [`IntentListener`]s.
#[derive(Default)]
pub struct CancellationPipeline {
    subscriptions: Vec<Subscription>,
}

impl CancellationPipeline {
    /// An empty pipeline; every intent proceeds unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener to the end of the chain.
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: IntentListener + 'static,
    {
        let id = ListenerId::new();
        self.subscriptions.push(Subscription {
            id,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no listener is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Thread `intent` through every listener in order.
    pub fn run(&mut self, intent: ActionIntent) -> Verdict {
        let kind = intent.kind;
        let mut current = intent;
        let mut vetoed = false;

        for sub in &mut self.subscriptions {
            let listener = &mut sub.listener;
            let seen = &current;
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_intent(seen)));
            match result {
                Ok(Ok(Verdict::Proceed(next))) => {
                    if !vetoed {
                        current = ActionIntent { kind, ..next };
                    }
                }
                Ok(Ok(Verdict::Veto)) => {
                    if !vetoed {
                        debug!(listener = %sub.id, %kind, "intent vetoed");
                    }
                    vetoed = true;
                }
                Ok(Err(err)) => {
                    warn!(listener = %sub.id, %kind, error = %err, "listener failed, vetoing intent");
                    vetoed = true;
                }
                Err(_panic) => {
                    warn!(listener = %sub.id, %kind, "listener panicked, vetoing intent");
                    vetoed = true;
                }
            }
        }

        if vetoed {
            Verdict::Veto
        } else {
            Verdict::Proceed(current)
        }
    }
}

impl core::fmt::Debug for CancellationPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ids: Vec<ListenerId> = self.subscriptions.iter().map(|s| s.id).collect();
        f.debug_struct("CancellationPipeline")
            .field("listeners", &ids)
            .finish()
    }
}
