use std::time::Duration;

// Conversation
pub const GREETING: &str = "Hi! My name's Botty.";
pub const BOT_NAME: &str = "Botty";

// Transport events
pub const EVENT_BOT_TYPING: &str = "bot-typing";
pub const EVENT_BOT_MESSAGE: &str = "bot-message";
pub const EVENT_USER_MESSAGE: &str = "user-message";

// Timers
pub const SCROLL_DELAY: Duration = Duration::from_millis(50);
pub const RECEIVE_SCROLL_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_TYPING_FALLBACK_MS: u64 = 5_000;
pub const TICK_RATE: Duration = Duration::from_millis(50);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

// Defaults
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4001";
pub const DEFAULT_SEND_AUDIO: &str = "assets/send.mp3";
pub const DEFAULT_RECEIVE_AUDIO: &str = "assets/receive.mp3";
