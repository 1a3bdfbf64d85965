use std::sync::Arc;

use {
    botchoice_channels::ReplySink,
    botchoice_common::InboundMessage,
    botchoice_config::BotChoiceConfig,
    botchoice_providers::{BackendInvoker, HttpInvoker, InvokerSettings},
    botchoice_routing::BackendRegistry,
    tracing::info,
};

use crate::{
    Result,
    dispatch::{DispatchOutcome, DispatchSettings, Dispatcher, EventAction},
};

/// Host-facing entry point: construct once from config, then feed every
/// inbound message through [`BotChoicePlugin::on_handle_context`].
pub struct BotChoicePlugin {
    config: BotChoiceConfig,
    dispatcher: Dispatcher,
}

impl BotChoicePlugin {
    pub const NAME: &'static str = "BotChoice";

    /// Build the registry and an HTTP invoker from `config`.
    pub fn new(config: BotChoiceConfig) -> Result<Self> {
        let invoker = Arc::new(HttpInvoker::new(InvokerSettings::from(&config)));
        Self::with_invoker(config, invoker)
    }

    /// Like [`BotChoicePlugin::new`] with a caller-supplied invoker.
    pub fn with_invoker(config: BotChoiceConfig, invoker: Arc<dyn BackendInvoker>) -> Result<Self> {
        let registry = Arc::new(BackendRegistry::from_entries(&config.bot_list)?);
        let dispatcher = Dispatcher::new(registry, invoker, DispatchSettings::from(&config));
        info!(
            plugin = Self::NAME,
            backends = dispatcher.registry().len(),
            keywords = ?dispatcher.registry().keywords().collect::<Vec<_>>(),
            "plugin initialized"
        );
        Ok(Self { config, dispatcher })
    }

    pub fn config(&self) -> &BotChoiceConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Short or long help text from config.
    pub fn help_text(&self, verbose: bool) -> &str {
        if verbose {
            &self.config.long_help_text
        } else {
            &self.config.short_help_text
        }
    }

    /// Run the full dispatch and report the outcome.
    pub async fn handle(&self, msg: &InboundMessage, sink: &dyn ReplySink) -> DispatchOutcome {
        self.dispatcher.dispatch(msg, sink).await
    }

    /// Event hook: [`EventAction::BreakPass`] when the message was ours.
    pub async fn on_handle_context(&self, msg: &InboundMessage, sink: &dyn ReplySink) -> EventAction {
        self.handle(msg, sink).await.event_action()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, botchoice_config::BotEntry};

    #[test]
    fn help_text_follows_verbosity() {
        let plugin = BotChoicePlugin::new(BotChoiceConfig {
            short_help_text: "short".into(),
            long_help_text: "long".into(),
            ..BotChoiceConfig::default()
        })
        .unwrap();
        assert_eq!(plugin.help_text(false), "short");
        assert_eq!(plugin.help_text(true), "long");
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let config = BotChoiceConfig {
            bot_list: vec![BotEntry::new("", "https://x")],
            ..BotChoiceConfig::default()
        };
        assert!(matches!(
            BotChoicePlugin::new(config),
            Err(crate::Error::Registry(_))
        ));
    }

    #[test]
    fn default_config_registers_builtins() {
        let plugin = BotChoicePlugin::new(BotChoiceConfig::default()).unwrap();
        let keywords: Vec<_> = plugin.dispatcher().registry().keywords().collect();
        assert_eq!(keywords, ["/sjxjj", "/sjtp"]);
    }
}
