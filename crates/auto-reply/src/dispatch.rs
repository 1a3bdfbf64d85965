//! One dispatch per inbound message: gate, acknowledge, invoke, deliver, retry.

use std::{sync::Arc, time::Duration};

use {
    botchoice_channels::ReplySink,
    botchoice_common::{InboundMessage, Reply},
    botchoice_config::{BotChoiceConfig, UnclassifiedAs},
    botchoice_providers::{BackendInvoker, shared_http_client},
    botchoice_routing::{BackendRegistry, matcher::gate},
    tracing::{debug, error, info, trace, warn},
};

use crate::{
    Error, Result,
    deliver::{self, Deliverer, DeliveryOptions},
};

/// Sent once per dispatch, before the first backend call.
pub const PROCESSING_TEXT: &str = "🎉正在执行，请稍候...";

/// Sent once when every attempt has failed.
pub const TERMINAL_ERROR_TEXT: &str = "我暂时无法执行，请稍后再试";

/// Lifecycle of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Matching,
    Acknowledged,
    Invoking,
    Sending,
    Retrying,
    Done,
    Failed,
}

/// What a dispatch did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No keyword matched; nothing was sent.
    Ignored,
    /// Every matching backend was delivered.
    Handled { attempts: u32 },
    /// All attempts failed; the terminal error reply was sent.
    Failed { attempts: u32 },
}

impl DispatchOutcome {
    /// Whether the host should keep offering the event to other handlers.
    pub fn event_action(self) -> EventAction {
        match self {
            Self::Ignored => EventAction::Continue,
            Self::Handled { .. } | Self::Failed { .. } => EventAction::BreakPass,
        }
    }

    pub fn attempts(self) -> u32 {
        match self {
            Self::Ignored => 0,
            Self::Handled { attempts } | Self::Failed { attempts } => attempts,
        }
    }
}

/// Signal back to the host's event chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Not ours; let other handlers see the event.
    Continue,
    /// Consumed; stop propagation.
    BreakPass,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub delivery: DeliveryOptions,
}

impl From<&BotChoiceConfig> for DispatchSettings {
    fn from(cfg: &BotChoiceConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            retry_delay: Duration::from_millis(cfg.retry_delay_ms),
            delivery: DeliveryOptions {
                media_extraction: cfg.media_extraction,
                unclassified_as: cfg.unclassified_as,
                max_image_bytes: cfg.max_image_bytes,
                download_timeout: Duration::from_secs(cfg.media_timeout_secs),
            },
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&BotChoiceConfig::default())
    }
}

impl DispatchSettings {
    #[must_use]
    pub fn with_unclassified_as(mut self, policy: UnclassifiedAs) -> Self {
        self.delivery.unclassified_as = policy;
        self
    }
}

/// Routes inbound messages to their backends.
///
/// Holds no per-message state, so one instance serves concurrent dispatches.
pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    invoker: Arc<dyn BackendInvoker>,
    deliverer: Deliverer,
    settings: DispatchSettings,
}

/// Per-dispatch bookkeeping.
struct Cycle<'a> {
    text: &'a str,
    state: DispatchState,
    attempt: u32,
    acknowledged: bool,
}

impl Cycle<'_> {
    fn enter(&mut self, next: DispatchState) {
        trace!(from = ?self.state, to = ?next, attempt = self.attempt, "dispatch state");
        self.state = next;
    }
}

impl Dispatcher {
    pub fn new(
        registry: Arc<BackendRegistry>,
        invoker: Arc<dyn BackendInvoker>,
        settings: DispatchSettings,
    ) -> Self {
        let deliverer = Deliverer::new(shared_http_client().clone(), settings.delivery);
        Self {
            registry,
            invoker,
            deliverer,
            settings,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Handle one inbound message end to end.
    ///
    /// Never returns an error: failures are retried up to `max_retries`
    /// times and then reported to the user with a single error reply.
    pub async fn dispatch(&self, msg: &InboundMessage, sink: &dyn ReplySink) -> DispatchOutcome {
        let Some(text) = gate(&self.registry, msg) else {
            return DispatchOutcome::Ignored;
        };

        info!(
            chat_id = msg.chat_id.as_deref().unwrap_or("-"),
            sender = msg.sender.as_deref().unwrap_or("-"),
            "dispatching: {text}"
        );

        let total = self.settings.max_retries.saturating_add(1);
        let mut cycle = Cycle {
            text,
            state: DispatchState::Idle,
            attempt: 1,
            acknowledged: false,
        };

        loop {
            match self.run_attempt(&mut cycle, sink).await {
                Ok(()) => {
                    cycle.enter(DispatchState::Done);
                    debug!(attempts = cycle.attempt, "dispatch done");
                    return DispatchOutcome::Handled {
                        attempts: cycle.attempt,
                    };
                },
                Err(e) if cycle.attempt < total => {
                    warn!(
                        attempt = cycle.attempt,
                        max_attempts = total,
                        keyword = e.keyword().unwrap_or("-"),
                        error = %e,
                        "dispatch attempt failed, retrying"
                    );
                    cycle.enter(DispatchState::Retrying);
                    if !self.settings.retry_delay.is_zero() {
                        tokio::time::sleep(self.settings.retry_delay).await;
                    }
                    cycle.attempt += 1;
                },
                Err(e) => {
                    error!(
                        attempts = cycle.attempt,
                        keyword = e.keyword().unwrap_or("-"),
                        error = %e,
                        "dispatch failed, giving up"
                    );
                    cycle.enter(DispatchState::Failed);
                    if let Err(send_err) =
                        deliver::send(sink, Reply::Error(TERMINAL_ERROR_TEXT.into())).await
                    {
                        error!(error = %send_err, "failed to send terminal error reply");
                    }
                    return DispatchOutcome::Failed {
                        attempts: cycle.attempt,
                    };
                },
            }
        }
    }

    /// One pass over the matching backends.
    async fn run_attempt(&self, cycle: &mut Cycle<'_>, sink: &dyn ReplySink) -> Result<()> {
        cycle.enter(DispatchState::Matching);
        let matched = self.registry.find_matching(cycle.text);

        // First attempt only, whether or not the send succeeds.
        if !cycle.acknowledged {
            cycle.acknowledged = true;
            deliver::send(sink, Reply::Text(PROCESSING_TEXT.into())).await?;
            cycle.enter(DispatchState::Acknowledged);
        }

        let stripped = self.registry.strip_keywords(cycle.text);
        for backend in matched {
            cycle.enter(DispatchState::Invoking);
            debug!(keyword = %backend.keyword, attempt = cycle.attempt, "invoking backend");
            let result = self
                .invoker
                .invoke(backend, &stripped)
                .await
                .map_err(|source| Error::backend(&backend.keyword, source))?;

            cycle.enter(DispatchState::Sending);
            self.deliverer
                .deliver(result, sink)
                .await
                .map_err(|e| e.for_backend(&backend.keyword))?;
        }
        Ok(())
    }
}
