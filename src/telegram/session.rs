//! Per-chat session state.
//!
//! Every chat owns an independent session: what the bot currently expects
//! from that chat, which phase its batch is in, and a cancellation token for
//! the in-flight batch. Sessions never interfere across chats.

use dashmap::DashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio_util::sync::CancellationToken;

/// Phase of a chat's current batch, driven by the batch task itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No batch running; the bot is waiting for the user.
    AwaitingInput,
    /// Turning links into canonical watch URLs.
    Resolving,
    /// Walking the fallback ladder and sending files.
    Downloading,
    /// Summarizing results back to the chat.
    Reporting,
}

/// What the delivered file should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Full video file (after /grab).
    Video,
    /// Audio extracted as mp3 (after /audio).
    Audio,
}

/// What the next message from this chat is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Links as text, or a `.txt` document of links.
    Links(OutputKind),
    /// A Netscape cookie file upload (after /cookies).
    CookieFile,
}

#[derive(Debug)]
struct Session {
    status: SessionStatus,
    expectation: Option<Expectation>,
    cancel: CancellationToken,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            status: SessionStatus::AwaitingInput,
            expectation: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Concurrent registry of chat sessions. Cheap to clone; all clones share
/// the same map.
#[derive(Clone, Default)]
pub struct SessionMap {
    inner: Arc<DashMap<ChatId, Session>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the chat as waiting for links to download as `kind`.
    pub fn expect_links(&self, chat: ChatId, kind: OutputKind) {
        self.inner.entry(chat).or_default().expectation = Some(Expectation::Links(kind));
    }

    /// Marks the chat as waiting for a cookie file upload (after /cookies).
    pub fn expect_cookie_file(&self, chat: ChatId) {
        self.inner.entry(chat).or_default().expectation = Some(Expectation::CookieFile);
    }

    /// Consumes the chat's pending expectation, if any.
    pub fn take_expectation(&self, chat: ChatId) -> Option<Expectation> {
        self.inner.get_mut(&chat).and_then(|mut s| s.expectation.take())
    }

    pub fn status(&self, chat: ChatId) -> SessionStatus {
        self.inner
            .get(&chat)
            .map(|s| s.status)
            .unwrap_or(SessionStatus::AwaitingInput)
    }

    pub fn set_status(&self, chat: ChatId, status: SessionStatus) {
        self.inner.entry(chat).or_default().status = status;
    }

    /// Starts a batch for the chat: resets the cancellation token and
    /// returns the child token the batch task should poll between links.
    pub fn begin_batch(&self, chat: ChatId) -> CancellationToken {
        let mut session = self.inner.entry(chat).or_default();
        session.status = SessionStatus::Resolving;
        session.cancel = CancellationToken::new();
        session.cancel.child_token()
    }

    /// Whether a batch is currently running for the chat.
    pub fn is_busy(&self, chat: ChatId) -> bool {
        self.status(chat) != SessionStatus::AwaitingInput
    }

    /// Requests cancellation of the chat's running batch. Returns false when
    /// nothing was running.
    pub fn cancel(&self, chat: ChatId) -> bool {
        match self.inner.get(&chat) {
            Some(session) if session.status != SessionStatus::AwaitingInput => {
                session.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Marks the chat's batch as finished and clears its expectation.
    pub fn finish(&self, chat: ChatId) {
        if let Some(mut session) = self.inner.get_mut(&chat) {
            session.status = SessionStatus::AwaitingInput;
            session.expectation = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_A: ChatId = ChatId(1);
    const CHAT_B: ChatId = ChatId(2);

    #[test]
    fn test_expectation_is_consumed_once() {
        let sessions = SessionMap::new();
        sessions.expect_links(CHAT_A, OutputKind::Video);
        assert_eq!(
            sessions.take_expectation(CHAT_A),
            Some(Expectation::Links(OutputKind::Video))
        );
        assert_eq!(sessions.take_expectation(CHAT_A), None);
    }

    #[test]
    fn test_audio_expectation_keeps_its_kind() {
        let sessions = SessionMap::new();
        sessions.expect_links(CHAT_A, OutputKind::Audio);
        assert_eq!(
            sessions.take_expectation(CHAT_A),
            Some(Expectation::Links(OutputKind::Audio))
        );
    }

    #[test]
    fn test_sessions_are_independent_per_chat() {
        let sessions = SessionMap::new();
        sessions.expect_links(CHAT_A, OutputKind::Video);
        sessions.expect_cookie_file(CHAT_B);
        assert_eq!(sessions.take_expectation(CHAT_B), Some(Expectation::CookieFile));
        assert_eq!(
            sessions.take_expectation(CHAT_A),
            Some(Expectation::Links(OutputKind::Video))
        );
    }

    #[test]
    fn test_batch_lifecycle() {
        let sessions = SessionMap::new();
        assert!(!sessions.is_busy(CHAT_A));

        let token = sessions.begin_batch(CHAT_A);
        assert!(sessions.is_busy(CHAT_A));
        assert!(!token.is_cancelled());

        sessions.set_status(CHAT_A, SessionStatus::Downloading);
        assert!(sessions.cancel(CHAT_A));
        assert!(token.is_cancelled());

        sessions.finish(CHAT_A);
        assert!(!sessions.is_busy(CHAT_A));
    }

    #[test]
    fn test_cancel_without_batch_is_noop() {
        let sessions = SessionMap::new();
        assert!(!sessions.cancel(CHAT_A));
        sessions.expect_links(CHAT_A, OutputKind::Video);
        assert!(!sessions.cancel(CHAT_A));
    }

    #[test]
    fn test_new_batch_gets_fresh_token() {
        let sessions = SessionMap::new();
        let first = sessions.begin_batch(CHAT_A);
        sessions.cancel(CHAT_A);
        sessions.finish(CHAT_A);

        let second = sessions.begin_batch(CHAT_A);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }
}
