//! Optimistic insert with rollback.
//!
//! Comments, document versions, attachments and signature decisions appear on
//! the stage immediately in a pending state. Each one is then delivered to a
//! [`Transport`]; success confirms the record, failure removes it (or restores
//! the previous signer decision) and reports the error through a [`Notifier`].
//! Pending operations resolve independently of each other.

use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    Attachment, BalloonItem, Comment, DocumentVersion, ModelStage, SignatureDecision, SyncState,
};
use crate::services::collaborators::{CurrentUser, Notice, Notifier};

/// Delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The backend could not be reached
    #[error("Service unavailable")]
    Unavailable,
    /// The backend refused the operation
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Input problems detected before anything is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Comment text or file name is blank
    #[error("Nothing to submit")]
    EmptyInput,
    /// No signer with this id on the stage
    #[error("Signer '{0}' not found")]
    UnknownSigner(String),
}

/// What a pending operation inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingKind {
    /// A comment; the text is handed back to the composer on rollback
    Comment {
        /// Composer text at submission
        text: String,
    },
    /// A document version
    Version,
    /// An attachment upload
    Attachment,
    /// A signer decision
    Signature {
        /// Signer id
        signer_id: String,
        /// Decision before the optimistic change
        previous: SignatureDecision,
    },
}

/// An operation waiting for its transport outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    /// Id of the inserted record (signer id for decisions)
    pub record_id: String,
    /// Stage holding the record
    pub stage_id: String,
    /// What was inserted
    pub kind: PendingKind,
    /// When the outcome is due
    pub ready_at: Instant,
}

/// Backend stand-in.
pub trait Transport {
    /// Delay between submission and outcome.
    fn latency(&self) -> Duration;

    /// Outcome of delivering `op`.
    fn deliver(&self, op: &PendingOp) -> Result<(), TransportError>;
}

/// Transport with a fixed delay and a failure switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatedTransport {
    latency: Duration,
    failing: bool,
}

impl SimulatedTransport {
    /// Succeeding transport with the given delay.
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self {
            latency,
            failing: false,
        }
    }

    /// Makes every delivery fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Whether deliveries currently fail.
    #[must_use]
    pub const fn is_failing(&self) -> bool {
        self.failing
    }
}

impl Transport for SimulatedTransport {
    fn latency(&self) -> Duration {
        self.latency
    }

    fn deliver(&self, _op: &PendingOp) -> Result<(), TransportError> {
        if self.failing {
            Err(TransportError::Unavailable)
        } else {
            Ok(())
        }
    }
}

/// Outcome of a resolved operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The record is now confirmed
    Confirmed {
        /// Record id
        record_id: String,
    },
    /// The record was removed or reverted
    RolledBack {
        /// Record id
        record_id: String,
        /// Comment text to put back into the composer
        restore_input: Option<String>,
    },
}

/// Pending optimistic operations.
#[derive(Debug, Clone, Default)]
pub struct OptimisticQueue {
    pending: Vec<PendingOp>,
}

impl OptimisticQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations still waiting.
    #[must_use]
    pub fn pending(&self) -> &[PendingOp] {
        &self.pending
    }

    /// Whether any operation is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    fn enqueue(
        &mut self,
        stage: &ModelStage,
        record_id: String,
        kind: PendingKind,
        now: Instant,
        transport: &dyn Transport,
    ) -> String {
        debug!(stage_id = %stage.id, record_id = %record_id, ?kind, "optimistic insert");
        self.pending.push(PendingOp {
            record_id: record_id.clone(),
            stage_id: stage.id.clone(),
            kind,
            ready_at: now + transport.latency(),
        });
        record_id
    }

    /// Inserts a pending comment from the composer and clears the composer.
    pub fn submit_comment(
        &mut self,
        stage: &mut ModelStage,
        author: &CurrentUser,
        input: &mut String,
        now: Instant,
        transport: &dyn Transport,
    ) -> Result<String, SubmitError> {
        let text = input.trim().to_string();
        if text.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        let id = BalloonItem::generate_id();
        stage.tool_config.comments_mut().comments.push(Comment {
            id: id.clone(),
            author: author.name.clone(),
            role: author.role.clone(),
            text,
            created_at: Utc::now(),
            state: SyncState::Pending,
        });
        let kind = PendingKind::Comment {
            text: std::mem::take(input),
        };
        Ok(self.enqueue(stage, id, kind, now, transport))
    }

    /// Inserts a pending document version with the next number.
    pub fn create_version(
        &mut self,
        stage: &mut ModelStage,
        author: &CurrentUser,
        note: &str,
        now: Instant,
        transport: &dyn Transport,
    ) -> String {
        let id = BalloonItem::generate_id();
        let management = stage.tool_config.management_mut();
        let number = management.next_version_number();
        management.versions.push(DocumentVersion {
            id: id.clone(),
            number,
            author: author.name.clone(),
            created_at: Utc::now(),
            note: note.trim().to_string(),
            state: SyncState::Pending,
        });
        self.enqueue(stage, id, PendingKind::Version, now, transport)
    }

    /// Inserts a pending attachment.
    pub fn upload_attachment(
        &mut self,
        stage: &mut ModelStage,
        author: &CurrentUser,
        name: &str,
        url: Option<String>,
        now: Instant,
        transport: &dyn Transport,
    ) -> Result<String, SubmitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        let id = BalloonItem::generate_id();
        stage.tool_config.management_mut().attachments.push(Attachment {
            id: id.clone(),
            name: name.to_string(),
            url,
            uploaded_by: author.name.clone(),
            uploaded_at: Utc::now(),
            state: SyncState::Pending,
        });
        Ok(self.enqueue(stage, id, PendingKind::Attachment, now, transport))
    }

    /// Applies a signer decision immediately, remembering the previous one.
    pub fn decide_signature(
        &mut self,
        stage: &mut ModelStage,
        signer_id: &str,
        decision: SignatureDecision,
        now: Instant,
        transport: &dyn Transport,
    ) -> Result<String, SubmitError> {
        let signer = stage
            .tool_config
            .signatures_mut()
            .signers
            .iter_mut()
            .find(|s| s.id == signer_id)
            .ok_or_else(|| SubmitError::UnknownSigner(signer_id.to_string()))?;
        let previous = signer.decision;
        signer.decision = decision;
        let kind = PendingKind::Signature {
            signer_id: signer_id.to_string(),
            previous,
        };
        Ok(self.enqueue(stage, signer_id.to_string(), kind, now, transport))
    }

    /// Resolves every operation on `stage` that is due at `now`.
    pub fn poll(
        &mut self,
        stage: &mut ModelStage,
        now: Instant,
        transport: &dyn Transport,
        notifier: &dyn Notifier,
    ) -> Vec<Resolution> {
        let (due, waiting): (Vec<PendingOp>, Vec<PendingOp>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|op| op.stage_id == stage.id && op.ready_at <= now);
        self.pending = waiting;

        due.into_iter()
            .map(|op| match transport.deliver(&op) {
                Ok(()) => confirm(stage, &op),
                Err(err) => roll_back(stage, op, &err, notifier),
            })
            .collect()
    }
}

fn confirm(stage: &mut ModelStage, op: &PendingOp) -> Resolution {
    let config = &mut stage.tool_config;
    match &op.kind {
        PendingKind::Comment { .. } => {
            if let Some(comment) = config
                .comments_mut()
                .comments
                .iter_mut()
                .find(|c| c.id == op.record_id)
            {
                comment.state = SyncState::Confirmed;
            }
        }
        PendingKind::Version => {
            if let Some(version) = config
                .management_mut()
                .versions
                .iter_mut()
                .find(|v| v.id == op.record_id)
            {
                version.state = SyncState::Confirmed;
            }
        }
        PendingKind::Attachment => {
            if let Some(attachment) = config
                .management_mut()
                .attachments
                .iter_mut()
                .find(|a| a.id == op.record_id)
            {
                attachment.state = SyncState::Confirmed;
            }
        }
        PendingKind::Signature { .. } => {}
    }
    debug!(stage_id = %op.stage_id, record_id = %op.record_id, "optimistic confirmed");
    Resolution::Confirmed {
        record_id: op.record_id.clone(),
    }
}

fn roll_back(
    stage: &mut ModelStage,
    op: PendingOp,
    err: &TransportError,
    notifier: &dyn Notifier,
) -> Resolution {
    let config = &mut stage.tool_config;
    let (what, restore_input) = match op.kind {
        PendingKind::Comment { text } => {
            config
                .comments_mut()
                .comments
                .retain(|c| c.id != op.record_id);
            ("comment", Some(text))
        }
        PendingKind::Version => {
            config
                .management_mut()
                .versions
                .retain(|v| v.id != op.record_id);
            ("version", None)
        }
        PendingKind::Attachment => {
            config
                .management_mut()
                .attachments
                .retain(|a| a.id != op.record_id);
            ("upload", None)
        }
        PendingKind::Signature {
            signer_id,
            previous,
        } => {
            if let Some(signer) = config
                .signatures_mut()
                .signers
                .iter_mut()
                .find(|s| s.id == signer_id)
            {
                signer.decision = previous;
            }
            ("signature", None)
        }
    };

    warn!(stage_id = %op.stage_id, record_id = %op.record_id, error = %err, "optimistic rollback");
    notifier.notify(Notice::error(
        format!("Could not save {what}: {err}"),
        "Check your connection and try again",
    ));
    Resolution::RolledBack {
        record_id: op.record_id,
        restore_input,
    }
}
