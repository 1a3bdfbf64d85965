use std::io::Write;

use {
    anyhow::Result,
    async_trait::async_trait,
    botchoice_auto_reply::{BotChoicePlugin, DispatchOutcome},
    botchoice_channels::ReplySink,
    botchoice_common::{InboundMessage, Reply},
    botchoice_config::BotChoiceConfig,
    tracing::info,
};

/// Prints each reply on its own line as `[kind] payload`.
struct StdoutSink;

#[async_trait]
impl ReplySink for StdoutSink {
    async fn send(&self, reply: &Reply) -> botchoice_channels::Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", render_reply(reply))
            .map_err(|e| botchoice_channels::Error::external("write reply to stdout", e))
    }
}

fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::Image(bytes) => format!("[{}] <{} bytes>", reply.kind(), bytes.len()),
        other => format!("[{}] {}", other.kind(), other.as_str().unwrap_or_default()),
    }
}

fn inbound(message: String, chat_id: Option<String>) -> InboundMessage {
    let msg = InboundMessage::text(message);
    match chat_id {
        Some(id) => msg.with_chat_id(id),
        None => msg,
    }
}

pub async fn handle_send(
    config: BotChoiceConfig,
    message: String,
    chat_id: Option<String>,
) -> Result<()> {
    let plugin = BotChoicePlugin::new(config)?;
    let msg = inbound(message, chat_id);

    let outcome = plugin.handle(&msg, &StdoutSink).await;
    info!(attempts = outcome.attempts(), ?outcome, "send finished");

    match outcome {
        DispatchOutcome::Ignored => {
            eprintln!("No keyword matched; nothing was sent.");
            Ok(())
        },
        DispatchOutcome::Handled { .. } => Ok(()),
        DispatchOutcome::Failed { attempts } => {
            anyhow::bail!("dispatch failed after {attempts} attempt(s)")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_carries_chat_id_when_given() {
        let msg = inbound("/sjtp".into(), Some("room-1".into()));
        assert!(msg.is_text());
        assert_eq!(msg.chat_id.as_deref(), Some("room-1"));
        assert!(inbound("/sjtp".into(), None).chat_id.is_none());
    }

    #[test]
    fn renders_kind_and_payload() {
        assert_eq!(
            render_reply(&Reply::VideoUrl("https://v/a.mp4".into())),
            "[video_url] https://v/a.mp4"
        );
        assert_eq!(render_reply(&Reply::Text("hi".into())), "[text] hi");
        assert_eq!(
            render_reply(&Reply::Image(vec![0u8; 3].into())),
            "[image] <3 bytes>"
        );
    }
}
