//! Submission-level banner shown near the submit control

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    /// How long the banner stays up before it removes itself
    pub fn ttl(&self) -> Duration {
        match self {
            MessageKind::Success => Duration::from_secs(10),
            MessageKind::Error => Duration::from_secs(30),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MessageKind::Success => "✓",
            MessageKind::Error => "⚠",
        }
    }

    /// CSS class of the banner element
    pub fn class(&self) -> &'static str {
        match self {
            MessageKind::Success => "form-message form-message-success",
            MessageKind::Error => "form-message form-message-error",
        }
    }
}

/// A dismissible, auto-expiring banner with `role="alert"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
    pub shown_at: Instant,
}

impl FormMessage {
    pub fn new(kind: MessageKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.kind.ttl()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Text as rendered, prefixed with the kind's icon
    pub fn display_text(&self) -> String {
        format!("{} {}", self.kind.icon(), self.text)
    }
}

/// The form's own success element, shown instead of a generated banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessNotice {
    pub shown_at: Instant,
}

impl SuccessNotice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.shown_at + MessageKind::Success.ttl()
    }
}
