use chatter::audio::{AudioPlayer, SoundCue};
use chatter::chat_message::Sender;
use chatter::constants::GREETING;
use chatter::latest_message::LatestMessage;
use chatter::transport::memory::MemoryTransport;
use chatter::transport::{InboundEvent, OutboundEvent};
use chatter::{ChatPanel, PanelOptions, TypingState};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct RecordingPlayer {
    played: Arc<Mutex<Vec<SoundCue>>>,
}

impl RecordingPlayer {
    fn played(&self) -> Vec<SoundCue> {
        self.played.lock().unwrap().clone()
    }
}

impl AudioPlayer for RecordingPlayer {
    fn play(&self, cue: SoundCue) {
        self.played.lock().unwrap().push(cue);
    }
}

struct Harness {
    panel: ChatPanel,
    transport: Arc<MemoryTransport>,
    audio: RecordingPlayer,
    latest: LatestMessage,
}

fn harness_with(options: PanelOptions) -> Harness {
    let transport = Arc::new(MemoryTransport::new());
    let audio = RecordingPlayer::default();
    let latest = LatestMessage::default();
    let mut panel = ChatPanel::new(
        transport.clone(),
        Box::new(audio.clone()),
        latest.clone(),
        options,
    );
    panel.mount();

    Harness {
        panel,
        transport,
        audio,
        latest,
    }
}

fn harness() -> Harness {
    harness_with(PanelOptions::default())
}

#[test]
fn initial_state_is_the_greeting() {
    let h = harness();

    assert_eq!(h.panel.messages().len(), 1);
    assert_eq!(h.panel.messages()[0].sender(), Sender::Bot);
    assert_eq!(h.panel.messages()[0].text(), GREETING);
    assert_eq!(h.latest.current(), GREETING);
    assert_eq!(h.panel.draft(), "");
    assert_eq!(h.panel.typing(), TypingState::Idle);
}

#[test]
fn send_appends_publishes_and_clears_draft() {
    let mut h = harness();
    let drafts = ["hello", "  padded  ", "multi\nline", "ünïcødé ✓"];

    for draft in drafts {
        let before = h.panel.messages().len();
        h.panel.on_change_message(draft);
        h.panel.send_message(Instant::now());

        assert_eq!(h.panel.messages().len(), before + 1);
        let last = h.panel.messages().last().unwrap();
        assert_eq!(last.sender(), Sender::User);
        assert_eq!(last.text(), draft);
        assert_eq!(h.panel.draft(), "");
        assert_eq!(h.latest.current(), draft);
    }

    let sent: Vec<OutboundEvent> = drafts
        .iter()
        .map(|d| OutboundEvent::UserMessage(d.to_string()))
        .collect();
    assert_eq!(h.transport.sent(), sent);
    assert_eq!(h.audio.played(), vec![SoundCue::Send; drafts.len()]);
}

#[test]
fn blank_drafts_are_ignored() {
    let mut h = harness();

    for draft in ["", " ", "\t\n  "] {
        h.panel.on_change_message(draft);
        h.panel.send_message(Instant::now());

        assert_eq!(h.panel.messages().len(), 1);
        assert_eq!(h.panel.draft(), draft);
        assert_eq!(h.latest.current(), GREETING);
    }

    assert!(h.transport.sent().is_empty());
    assert!(h.audio.played().is_empty());
}

#[test]
fn failed_emit_keeps_the_message() {
    let mut h = harness();
    h.transport.set_fail_sends(true);

    h.panel.on_change_message("are you there?");
    h.panel.send_message(Instant::now());

    assert_eq!(h.panel.messages().len(), 2);
    assert_eq!(h.panel.messages()[1].text(), "are you there?");
    assert_eq!(h.panel.draft(), "");
    assert!(h.transport.sent().is_empty());
}

#[test]
fn typing_then_message() {
    let mut h = harness();
    let now = Instant::now();

    h.transport.inject(InboundEvent::BotTyping);
    h.panel.poll_events(now);
    assert!(h.panel.is_typing());

    h.transport.inject(InboundEvent::BotMessage("hi there".to_string()));
    h.panel.poll_events(now);

    assert!(!h.panel.is_typing());
    let last = h.panel.messages().last().unwrap();
    assert_eq!(last.sender(), Sender::Bot);
    assert_eq!(last.text(), "hi there");
    assert_eq!(h.audio.played(), vec![SoundCue::Receive]);
}

#[test]
fn typing_fallback_clears_after_five_seconds() {
    let mut h = harness();
    let start = Instant::now();

    h.panel.handle_event(InboundEvent::BotTyping, start);

    h.panel.tick(start + Duration::from_millis(4_999));
    assert!(h.panel.is_typing());

    h.panel.tick(start + Duration::from_secs(5));
    assert!(!h.panel.is_typing());
}

#[test]
fn typing_without_fallback_stays_up() {
    let mut h = harness_with(PanelOptions {
        typing_fallback: None,
        ..PanelOptions::default()
    });
    let start = Instant::now();

    h.panel.handle_event(InboundEvent::BotTyping, start);
    h.panel.tick(start + Duration::from_secs(60));

    assert!(h.panel.is_typing());
}

#[test]
fn message_cancels_fallback() {
    let mut h = harness();
    let start = Instant::now();

    h.panel.handle_event(InboundEvent::BotTyping, start);
    h.panel
        .handle_event(InboundEvent::BotMessage("done".into()), start + Duration::from_secs(1));
    h.panel.handle_event(InboundEvent::BotTyping, start + Duration::from_secs(4));

    // The first typing timer would have fired here.
    h.panel.tick(start + Duration::from_secs(5));
    assert!(h.panel.is_typing());
}

#[test]
fn unmounted_panel_ignores_events() {
    let mut h = harness();
    assert_eq!(h.transport.listener_count(), 1);

    h.panel.unmount();

    assert_eq!(h.transport.listener_count(), 0);
    assert_eq!(h.transport.inject(InboundEvent::BotTyping), 0);
    assert_eq!(
        h.transport.inject(InboundEvent::BotMessage("ghost".into())),
        0
    );
    assert_eq!(h.panel.poll_events(Instant::now()), 0);
    assert_eq!(h.panel.messages().len(), 1);
    assert!(!h.panel.is_typing());
    assert_eq!(h.latest.current(), GREETING);
}

#[test]
fn remount_does_not_duplicate_handling() {
    let mut h = harness();
    h.panel.unmount();
    h.panel.mount();

    h.transport.inject(InboundEvent::BotMessage("once".into()));
    assert_eq!(h.panel.poll_events(Instant::now()), 1);
    assert_eq!(h.panel.messages().len(), 2);
}

#[test]
fn remount_while_typing_does_not_leave_the_indicator_up() {
    let mut h = harness();
    let start = Instant::now();

    h.panel.handle_event(InboundEvent::BotTyping, start);
    h.panel.unmount();
    h.panel.mount();
    h.panel.tick(start + Duration::from_secs(60));

    assert!(!h.panel.is_typing());
    assert_eq!(h.panel.typing(), TypingState::Idle);
}

#[test]
fn hello_then_hi_there() {
    let mut h = harness();
    let now = Instant::now();

    h.panel.on_change_message("hello");
    h.panel.send_message(now);
    h.transport.inject(InboundEvent::BotTyping);
    h.transport.inject(InboundEvent::BotMessage("hi there".into()));
    h.panel.poll_events(now);

    let conversation: Vec<(Sender, &str)> = h
        .panel
        .messages()
        .iter()
        .map(|m| (m.sender(), m.text()))
        .collect();
    assert_eq!(
        conversation,
        vec![
            (Sender::Bot, GREETING),
            (Sender::User, "hello"),
            (Sender::Bot, "hi there"),
        ]
    );
    assert!(!h.panel.is_typing());
    assert_eq!(h.latest.current(), "hi there");
}

#[tokio::test]
async fn next_event_delivers_in_order() {
    let mut h = harness();

    h.transport.inject(InboundEvent::BotTyping);
    h.transport.inject(InboundEvent::BotMessage("first".into()));

    assert_eq!(h.panel.next_event().await, Some(InboundEvent::BotTyping));
    assert_eq!(
        h.panel.next_event().await,
        Some(InboundEvent::BotMessage("first".into()))
    );
}

#[test]
fn bot_message_schedules_both_scrolls() {
    let mut h = harness();
    let start = Instant::now();

    h.panel.clamp_scroll(0);
    h.panel.handle_event(InboundEvent::BotMessage("scroll me".into()), start);

    h.panel.tick(start + Duration::from_millis(50));
    assert_eq!(h.panel.scroll_offset(), u16::MAX);

    // The user scrolls up before the second, later scroll lands.
    h.panel.clamp_scroll(10);
    h.panel.scroll_up();
    h.panel.tick(start + Duration::from_millis(100));
    assert_eq!(h.panel.scroll_offset(), u16::MAX);
}
