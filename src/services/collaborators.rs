//! Seams to the world outside the template: notifications, the current user,
//! document links, and the clipboard.

use std::process::Command;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Neutral information
    Info,
    /// Operation failed
    Error,
}

/// A toast-style message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Main text
    pub message: String,
    /// What the user can do about it
    pub hint: Option<String>,
}

impl Notice {
    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            hint: None,
        }
    }

    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            hint: None,
        }
    }

    /// Error notice with a remediation hint.
    pub fn error(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

/// Receives notices.
pub trait Notifier {
    /// Shows a notice.
    fn notify(&self, notice: Notice);
}

/// Notifier that keeps every notice, shared between clones.
///
/// The TUI drains it into the status bar; tests inspect it.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending notice.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }

    /// Copy of the pending notices.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => warn!(message = %notice.message, "notice"),
            _ => info!(message = %notice.message, "notice"),
        }
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

/// The person using the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Display name
    pub name: String,
    /// Role or office
    pub role: String,
}

/// Supplies the current user.
pub trait IdentityProvider {
    /// The current user.
    fn current_user(&self) -> CurrentUser;
}

/// Fixed identity, typically read from configuration.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub CurrentUser);

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> CurrentUser {
        self.0.clone()
    }
}

/// Failures opening a document link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    /// The platform refused to open a new window
    #[error("The document window was blocked")]
    Blocked,
    /// The record has no link
    #[error("This document has no link")]
    MissingUrl,
    /// The opener failed for another reason
    #[error("Could not open the document: {0}")]
    Failed(String),
}

impl OpenError {
    /// What the user can do about the failure.
    #[must_use]
    pub const fn remediation(&self) -> &'static str {
        match self {
            Self::Blocked => "Check your popup blocker and try again",
            Self::MissingUrl => "Refresh the page or regenerate the link",
            Self::Failed(_) => "Copy the link and open it manually",
        }
    }
}

/// Opens document URLs.
pub trait LinkOpener {
    /// Opens `url` in the user's viewer.
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

/// Opens links with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };

        let status = cmd
            .arg(url)
            .status()
            .map_err(|e| OpenError::Failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            // The handler exists but declined to open a window
            Err(OpenError::Blocked)
        }
    }
}

/// Opens a document link and reports the outcome through `notifier`.
///
/// There is no automatic retry.
pub fn open_document(
    opener: &dyn LinkOpener,
    notifier: &dyn Notifier,
    name: &str,
    url: Option<&str>,
) -> Result<(), OpenError> {
    let result = match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => opener.open(url),
        None => Err(OpenError::MissingUrl),
    };
    match &result {
        Ok(()) => notifier.notify(Notice::info(format!("Opened {name}"))),
        Err(err) => notifier.notify(Notice::error(
            format!("{err}: {name}"),
            err.remediation(),
        )),
    }
    result
}

/// Receives text copied by the user.
pub trait ClipboardSink {
    /// Places `text` on the clipboard.
    fn copy_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// System clipboard via `arboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> anyhow::Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|e| anyhow::anyhow!("Failed to copy to clipboard: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeOpener(Result<(), OpenError>);

    impl LinkOpener for FakeOpener {
        fn open(&self, _url: &str) -> Result<(), OpenError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_missing_url_hint() {
        let log = NoticeLog::new();
        let result = open_document(&FakeOpener(Ok(())), &log, "edital.pdf", None);
        assert_eq!(result, Err(OpenError::MissingUrl));
        let notices = log.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(
            notices[0].hint.as_deref(),
            Some("Refresh the page or regenerate the link")
        );
        assert!(log.drain().is_empty());
    }

    #[test]
    fn test_blocked_hint() {
        let log = NoticeLog::new();
        let result = open_document(
            &FakeOpener(Err(OpenError::Blocked)),
            &log,
            "dfd.pdf",
            Some("https://docs.example/dfd.pdf"),
        );
        assert_eq!(result, Err(OpenError::Blocked));
        assert!(log.snapshot()[0]
            .hint
            .as_deref()
            .is_some_and(|hint| hint.contains("popup blocker")));
    }

    #[test]
    fn test_open_success_is_informational() {
        let log = NoticeLog::new();
        open_document(&FakeOpener(Ok(())), &log, "a", Some("https://x")).unwrap();
        assert_eq!(log.snapshot()[0].level, NoticeLevel::Info);
    }

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity(CurrentUser {
            name: "Ana".to_string(),
            role: "Pregoeira".to_string(),
        });
        assert_eq!(identity.current_user().name, "Ana");
    }
}
