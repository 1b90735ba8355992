//! Conversation state for the chat screen and its bridge to the transport.

use crate::audio::{AudioPlayer, SoundCue};
use crate::chat_message::ChatMessage;
use crate::config::Config;
use crate::constants::{GREETING, RECEIVE_SCROLL_DELAY, SCROLL_DELAY};
use crate::latest_message::LatestMessage;
use crate::timer::Deadline;
use crate::transport::{InboundEvent, OutboundEvent, Subscription, Transport};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Typing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOptions {
    pub greeting: String,
    /// Forces the typing indicator off when no bot message follows in time.
    pub typing_fallback: Option<Duration>,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            greeting: GREETING.to_string(),
            typing_fallback: Config::default().typing_fallback(),
        }
    }
}

impl From<&Config> for PanelOptions {
    fn from(config: &Config) -> Self {
        Self {
            typing_fallback: config.typing_fallback(),
            ..Self::default()
        }
    }
}

pub struct ChatPanel {
    messages: Vec<ChatMessage>,
    draft: String,
    typing: TypingState,
    scroll: u16,
    latest: LatestMessage,
    transport: Arc<dyn Transport>,
    audio: Box<dyn AudioPlayer>,
    subscription: Option<Subscription>,
    typing_fallback: Option<Duration>,
    scroll_timer: Deadline,
    receive_scroll_timer: Deadline,
    typing_timer: Deadline,
}

impl ChatPanel {
    pub fn new(
        transport: Arc<dyn Transport>,
        audio: Box<dyn AudioPlayer>,
        latest: LatestMessage,
        options: PanelOptions,
    ) -> Self {
        latest.publish(options.greeting.clone());

        Self {
            messages: vec![ChatMessage::bot(options.greeting)],
            draft: String::new(),
            typing: TypingState::Idle,
            scroll: 0,
            latest,
            transport,
            audio,
            subscription: None,
            typing_fallback: options.typing_fallback,
            scroll_timer: Deadline::new(),
            receive_scroll_timer: Deadline::new(),
            typing_timer: Deadline::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn typing(&self) -> TypingState {
        self.typing
    }

    pub fn is_typing(&self) -> bool {
        self.typing == TypingState::Typing
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn latest(&self) -> &LatestMessage {
        &self.latest
    }

    /// Starts listening for transport events.
    pub fn mount(&mut self) {
        if self.subscription.is_none() {
            debug!("Chat panel mounted");
            self.subscription = Some(self.transport.subscribe());
        }
    }

    /// Stops listening. Events dispatched afterwards never reach this panel.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Chat panel unmounted");
        }
        // The fallback is cancelled below; nothing else would clear it.
        self.typing = TypingState::Idle;
        self.typing_timer.cancel();
        self.scroll_timer.cancel();
        self.receive_scroll_timer.cancel();
    }

    pub fn on_change_message(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Appends the draft as a user message and forwards it to the server.
    /// Blank drafts are ignored.
    pub fn send_message(&mut self, now: Instant) {
        if self.draft.trim().is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.draft);
        self.messages.push(ChatMessage::user(text.clone()));
        self.latest.publish(text.clone());
        self.audio.play(SoundCue::Send);

        // The message stays in the list even if the socket rejects it.
        if let Err(e) = self.transport.emit(OutboundEvent::UserMessage(text)) {
            error!("Failed to send message via socket: {}", e);
        }

        self.scroll_timer.arm(now, SCROLL_DELAY);
    }

    pub fn handle_event(&mut self, event: InboundEvent, now: Instant) {
        match event {
            InboundEvent::BotTyping => {
                self.typing = TypingState::Typing;
                if let Some(fallback) = self.typing_fallback {
                    self.typing_timer.arm(now, fallback);
                }
                self.scroll_timer.arm(now, SCROLL_DELAY);
            }
            InboundEvent::BotMessage(text) => {
                self.typing = TypingState::Idle;
                self.typing_timer.cancel();
                self.messages.push(ChatMessage::bot(text.clone()));
                self.latest.publish(text);
                self.audio.play(SoundCue::Receive);
                self.scroll_timer.arm(now, SCROLL_DELAY);
                self.receive_scroll_timer.arm(now, RECEIVE_SCROLL_DELAY);
            }
            InboundEvent::ConnectError(detail) => {
                error!("Socket connection error: {}", detail);
            }
            InboundEvent::Disconnect(reason) => {
                warn!("Socket disconnected: {}", reason);
            }
        }
    }

    /// Waits for the next inbound event. Never resolves while unmounted.
    pub async fn next_event(&mut self) -> Option<InboundEvent> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Handles every event already delivered, without waiting.
    pub fn poll_events(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.handle_event(event, now);
            handled += 1;
        }
        handled
    }

    /// Fires due timers.
    pub fn tick(&mut self, now: Instant) {
        if self.typing_timer.fire(now) && self.typing == TypingState::Typing {
            debug!("No bot message after typing, clearing indicator");
            self.typing = TypingState::Idle;
            self.scroll_timer.arm(now, SCROLL_DELAY);
        }

        let scroll = self.scroll_timer.fire(now);
        let receive_scroll = self.receive_scroll_timer.fire(now);
        if scroll || receive_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    /// Jumps to the end; the renderer clamps the offset to the content.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = u16::MAX;
    }

    pub fn clamp_scroll(&mut self, max_scroll: u16) {
        self.scroll = self.scroll.min(max_scroll);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }
}

impl Drop for ChatPanel {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::chat_message::Sender;
    use crate::transport::memory::MemoryTransport;

    fn panel() -> (ChatPanel, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let panel = ChatPanel::new(
            transport.clone(),
            Box::new(SilentPlayer),
            LatestMessage::default(),
            PanelOptions::default(),
        );
        (panel, transport)
    }

    #[test]
    fn starts_with_greeting() {
        let (panel, _) = panel();
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.messages()[0].sender(), Sender::Bot);
        assert_eq!(panel.messages()[0].text(), GREETING);
        assert_eq!(panel.latest().current(), GREETING);
        assert_eq!(panel.typing(), TypingState::Idle);
    }

    #[test]
    fn draft_is_stored_verbatim() {
        let (mut panel, _) = panel();
        panel.on_change_message("  spaced  ");
        assert_eq!(panel.draft(), "  spaced  ");
    }

    #[test]
    fn tick_scrolls_after_delay() {
        let (mut panel, _) = panel();
        let start = Instant::now();
        panel.on_change_message("hello");
        panel.send_message(start);

        panel.tick(start + Duration::from_millis(49));
        assert_eq!(panel.scroll_offset(), 0);

        panel.tick(start + SCROLL_DELAY);
        assert_eq!(panel.scroll_offset(), u16::MAX);

        panel.clamp_scroll(12);
        assert_eq!(panel.scroll_offset(), 12);
        panel.scroll_up();
        assert_eq!(panel.scroll_offset(), 11);
    }

    #[test]
    fn late_typing_timer_does_not_clear_new_typing() {
        let (mut panel, _) = panel();
        let start = Instant::now();
        panel.handle_event(InboundEvent::BotTyping, start);
        panel.handle_event(InboundEvent::BotTyping, start + Duration::from_secs(3));

        panel.tick(start + Duration::from_secs(5));
        assert!(panel.is_typing());

        panel.tick(start + Duration::from_secs(8));
        assert!(!panel.is_typing());
    }

    #[test]
    fn lifecycle_events_leave_state_alone() {
        let (mut panel, _) = panel();
        let now = Instant::now();
        panel.handle_event(InboundEvent::ConnectError("refused".into()), now);
        panel.handle_event(InboundEvent::Disconnect("transport close".into()), now);

        assert_eq!(panel.messages().len(), 1);
        assert!(!panel.is_typing());
    }

    #[test]
    fn mount_is_idempotent() {
        let (mut panel, transport) = panel();
        panel.mount();
        panel.mount();
        assert_eq!(transport.listener_count(), 1);

        drop(panel);
        assert_eq!(transport.listener_count(), 0);
    }
}
