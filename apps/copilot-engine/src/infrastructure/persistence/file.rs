//! File-backed stores.
//!
//! Layout under the data directory:
//!
//! ```text
//! plans/<plan_id>/events.jsonl     one DraftEvent per line, append-only
//! plans/<plan_id>/decision         the approve/reject event, linked in exclusively
//! plans/<plan_id>/execution.claim  exclusive execution claim
//! plans/<plan_id>/execution.json   the stored ExecutionResult
//! ```
//!
//! Exclusivity comes from `create_new` and `hard_link`, which the filesystem
//! resolves for every process sharing the directory. Appends are flushed with
//! `sync_all` before returning.
//!
//! A decision is committed when its `decision` file appears. The file is
//! staged and synced under a unique name first, so it is never visible half
//! written. Copying it into `events.jsonl` follows, and readers fill in the
//! decision from the marker when that copy is missing.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::domain::draft_lifecycle::{AuditError, AuditLogStore, DraftEvent, check_append};
use crate::domain::plan_execution::{Claim, ExecutionLedger, ExecutionResult, LedgerError};
use crate::domain::shared::PlanId;

const EVENTS_FILE: &str = "events.jsonl";
const DECISION_MARKER: &str = "decision";
const MARKER_RECOVERY_LOCK: &str = "decision.recovering";
const CLAIM_FILE: &str = "execution.claim";
const RESULT_FILE: &str = "execution.json";

#[derive(Debug, Clone)]
struct PlanDirs {
    root: PathBuf,
}

impl PlanDirs {
    fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into().join("plans"),
        }
    }

    /// Directory for a plan, or `None` when the id cannot name a directory.
    fn plan(&self, plan_id: &PlanId) -> Option<PathBuf> {
        plan_id
            .is_storage_safe()
            .then(|| self.root.join(plan_id.as_str()))
    }
}

async fn create_exclusive(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

async fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Audit log
// ============================================================================

/// Durable audit log: one JSON-lines file per plan.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    dirs: PlanDirs,
}

impl FileAuditLog {
    /// Create a log rooted at `data_dir`. Directories are created on first write.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: PlanDirs::new(data_dir),
        }
    }

    async fn append_line(path: &Path, keep: u64, line: &[u8]) -> Result<(), AuditError> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(AuditError::write)?;
        // Drops any interrupted trailing record before writing after it.
        file.set_len(keep).await.map_err(AuditError::write)?;
        file.seek(SeekFrom::Start(keep))
            .await
            .map_err(AuditError::write)?;
        file.write_all(line).await.map_err(AuditError::write)?;
        file.sync_all().await.map_err(AuditError::write)
    }

    async fn append_proposal(dir: &Path, event: &DraftEvent) -> Result<(), AuditError> {
        fs::create_dir_all(dir).await.map_err(AuditError::write)?;

        let mut line = serde_json::to_vec(event).map_err(AuditError::write)?;
        line.push(b'\n');

        match create_exclusive(&dir.join(EVENTS_FILE), &line).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(AuditError::Conflict {
                plan_id: event.plan_id.to_string(),
                reason: "plan already has a proposal".to_string(),
            }),
            Err(e) => Err(AuditError::write(e)),
        }
    }

    async fn append_decision(dir: &Path, event: &DraftEvent) -> Result<(), AuditError> {
        let path = dir.join(EVENTS_FILE);
        let contents = read_optional(&path)
            .await
            .map_err(AuditError::read)?
            .unwrap_or_default();
        let history = with_marker(dir, parse_events(&contents)?).await?;
        check_append(&history, event)?;
        let keep = contents.rfind('\n').map_or(0, |i| i + 1) as u64;

        let mut line = serde_json::to_vec(event).map_err(AuditError::write)?;
        line.push(b'\n');
        Self::commit_marker(dir, event, &line).await?;

        if let Err(err) = Self::append_line(&path, keep, &line).await {
            tracing::warn!(
                plan_id = %event.plan_id,
                error = %err,
                "Decision committed but not copied to the event log; serving it from the marker"
            );
        }
        Ok(())
    }

    /// Publish the decision marker, failing with a conflict when another
    /// decision already holds it.
    async fn commit_marker(dir: &Path, event: &DraftEvent, line: &[u8]) -> Result<(), AuditError> {
        let marker = dir.join(DECISION_MARKER);
        let staged = dir.join(format!("{DECISION_MARKER}.{}.tmp", uuid::Uuid::new_v4()));
        create_exclusive(&staged, line)
            .await
            .map_err(AuditError::write)?;

        let mut linked = fs::hard_link(&staged, &marker).await;
        if matches!(&linked, Err(e) if e.kind() == ErrorKind::AlreadyExists)
            && matches!(read_marker(dir).await, Ok(Marker::Unreadable))
        {
            linked = Self::replace_unreadable_marker(dir, &staged, &marker).await;
        }

        if let Err(e) = fs::remove_file(&staged).await {
            tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged decision");
        }

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(AuditError::Conflict {
                plan_id: event.plan_id.to_string(),
                reason: "plan has already been decided".to_string(),
            }),
            Err(e) => Err(AuditError::write(e)),
        }
    }

    /// Swap out a marker that holds no decision. Only the holder of the
    /// recovery lock may remove it; everyone else sees `AlreadyExists`.
    async fn replace_unreadable_marker(
        dir: &Path,
        staged: &Path,
        marker: &Path,
    ) -> std::io::Result<()> {
        let lock = dir.join(MARKER_RECOVERY_LOCK);
        create_exclusive(&lock, b"").await?;
        tracing::warn!(path = %marker.display(), "Replacing unreadable decision marker");

        let replaced = async {
            if matches!(read_marker(dir).await, Ok(Marker::Unreadable)) {
                match fs::remove_file(marker).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
            fs::hard_link(staged, marker).await
        }
        .await;

        if let Err(e) = fs::remove_file(&lock).await {
            tracing::error!(path = %lock.display(), error = %e, "Failed to release marker recovery lock");
        }
        replaced
    }
}

enum Marker {
    Absent,
    Decided(DraftEvent),
    Unreadable,
}

async fn read_marker(dir: &Path) -> Result<Marker, AuditError> {
    let Some(contents) = read_optional(&dir.join(DECISION_MARKER))
        .await
        .map_err(AuditError::read)?
    else {
        return Ok(Marker::Absent);
    };
    match serde_json::from_str::<DraftEvent>(contents.trim_end()) {
        Ok(event) if event.is_decision() => Ok(Marker::Decided(event)),
        _ => Ok(Marker::Unreadable),
    }
}

/// Append the marker's decision to a log that is missing it.
async fn with_marker(dir: &Path, mut events: Vec<DraftEvent>) -> Result<Vec<DraftEvent>, AuditError> {
    if events.iter().any(DraftEvent::is_decision) {
        return Ok(events);
    }
    match read_marker(dir).await? {
        Marker::Decided(event) => events.push(event),
        Marker::Unreadable => {
            tracing::warn!(path = %dir.display(), "Ignoring unreadable decision marker");
        }
        Marker::Absent => {}
    }
    Ok(events)
}

/// Parse a JSON-lines history. A final line without its newline is an
/// interrupted append and is ignored.
fn parse_events(contents: &str) -> Result<Vec<DraftEvent>, AuditError> {
    let complete = contents.ends_with('\n');
    let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
    let last = lines.len().saturating_sub(1);

    let mut events = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        match serde_json::from_str::<DraftEvent>(line) {
            Ok(event) => events.push(event),
            Err(e) if i == last && !complete => {
                tracing::warn!(error = %e, "Ignoring truncated trailing audit record");
            }
            Err(e) => return Err(AuditError::read(e)),
        }
    }
    Ok(events)
}

#[async_trait]
impl AuditLogStore for FileAuditLog {
    async fn append(&self, event: &DraftEvent) -> Result<(), AuditError> {
        let Some(dir) = self.dirs.plan(&event.plan_id) else {
            return Err(AuditError::write(format!(
                "plan id {} cannot be stored",
                event.plan_id
            )));
        };

        if event.is_decision() {
            Self::append_decision(&dir, event).await
        } else {
            Self::append_proposal(&dir, event).await
        }
    }

    async fn events_for(&self, plan_id: &PlanId) -> Result<Vec<DraftEvent>, AuditError> {
        let Some(dir) = self.dirs.plan(plan_id) else {
            return Ok(Vec::new());
        };
        match read_optional(&dir.join(EVENTS_FILE))
            .await
            .map_err(AuditError::read)?
        {
            Some(contents) => with_marker(&dir, parse_events(&contents)?).await,
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Execution ledger
// ============================================================================

/// Durable execution ledger: a claim file and an atomically written result per plan.
#[derive(Debug, Clone)]
pub struct FileExecutionLedger {
    dirs: PlanDirs,
}

impl FileExecutionLedger {
    /// Create a ledger rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: PlanDirs::new(data_dir),
        }
    }

    fn plan_dir(&self, plan_id: &PlanId) -> Result<PathBuf, LedgerError> {
        self.dirs
            .plan(plan_id)
            .ok_or_else(|| LedgerError::write(format!("plan id {plan_id} cannot be stored")))
    }

    async fn read_result(dir: &Path) -> Result<Option<ExecutionResult>, LedgerError> {
        match read_optional(&dir.join(RESULT_FILE))
            .await
            .map_err(LedgerError::read)?
        {
            Some(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(LedgerError::read),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ExecutionLedger for FileExecutionLedger {
    async fn try_claim(&self, plan_id: &PlanId) -> Result<Claim, LedgerError> {
        let dir = self.plan_dir(plan_id)?;
        if let Some(result) = Self::read_result(&dir).await? {
            return Ok(Claim::Completed(Box::new(result)));
        }

        fs::create_dir_all(&dir).await.map_err(LedgerError::write)?;
        let claimed_at = crate::domain::shared::Timestamp::now().to_rfc3339();
        match create_exclusive(&dir.join(CLAIM_FILE), claimed_at.as_bytes()).await {
            Ok(()) => Ok(Claim::Acquired),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                // The holder may have recorded between our two reads.
                Ok(match Self::read_result(&dir).await? {
                    Some(result) => Claim::Completed(Box::new(result)),
                    None => Claim::InProgress,
                })
            }
            Err(e) => Err(LedgerError::write(e)),
        }
    }

    async fn record(&self, result: &ExecutionResult) -> Result<(), LedgerError> {
        let dir = self.plan_dir(result.plan_id())?;
        let target = dir.join(RESULT_FILE);
        if read_optional(&target)
            .await
            .map_err(LedgerError::read)?
            .is_some()
        {
            return Err(LedgerError::write(format!(
                "result for plan {} already recorded",
                result.plan_id()
            )));
        }

        let body = serde_json::to_vec_pretty(result).map_err(LedgerError::write)?;
        let tmp = dir.join(format!("{RESULT_FILE}.tmp"));
        let mut file = fs::File::create(&tmp).await.map_err(LedgerError::write)?;
        file.write_all(&body).await.map_err(LedgerError::write)?;
        file.sync_all().await.map_err(LedgerError::write)?;
        drop(file);

        fs::rename(&tmp, &target).await.map_err(LedgerError::write)
    }

    async fn find(&self, plan_id: &PlanId) -> Result<Option<ExecutionResult>, LedgerError> {
        match self.dirs.plan(plan_id) {
            Some(dir) => Self::read_result(&dir).await,
            None => Ok(None),
        }
    }
}
