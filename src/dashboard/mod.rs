//! Role dashboards.
//!
//! [`Dashboard`] is the shared controller: it owns one role's collections,
//! loads them in a single all-or-nothing batch and resynchronizes after every
//! write. [`FacultyDashboard`] and [`StudentDashboard`] add the role's actions.
//!
//! Batch semantics:
//! - every read of the batch runs concurrently; the first failure fails the
//!   whole batch and sibling results are dropped
//! - on success each collection is replaced wholesale, never merged
//! - on failure the previous snapshot stays and one error message is set
//!
//! Every request races the controller's [`CancellationToken`]. Once the
//! controller is closed, in-flight requests resolve to
//! [`ClientError::Cancelled`] and leave state untouched.

pub mod faculty;
pub mod student;
pub mod view;

pub use faculty::{FacultyDashboard, FacultySnapshot, FacultySource};
pub use student::{StudentDashboard, StudentSnapshot, StudentSource};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{decode, ApiClient, ClientError, Result, Verb};

pub const FETCH_FAILED: &str = "Failed to fetch dashboard data";

/// A role's fixed batch of reads.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    type Snapshot: Default + Send;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Issue every read of the batch; fail if any one fails.
    async fn load(&self, api: &dyn ApiClient) -> Result<Self::Snapshot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// The single user-visible message an action leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            text: text.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

pub struct Dashboard<S: DashboardSource> {
    api: Arc<dyn ApiClient>,
    source: S,
    snapshot: S::Snapshot,
    loaded: bool,
    loading: bool,
    error: Option<String>,
    notice: Option<Notice>,
    cancel: CancellationToken,
}

impl<S: DashboardSource> Dashboard<S> {
    pub fn new(api: Arc<dyn ApiClient>, source: S) -> Self {
        Self {
            api,
            source,
            snapshot: S::Snapshot::default(),
            loaded: false,
            loading: false,
            error: None,
            notice: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn snapshot(&self) -> &S::Snapshot {
        &self.snapshot
    }

    /// True once at least one batch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error of the last batch, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Handle for tearing the controller down from another task.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run the batch and replace every collection on success.
    pub async fn fetch_all(&mut self) -> Result<()> {
        if self.is_closed() {
            return Err(ClientError::Cancelled);
        }

        self.loading = true;
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            res = self.source.load(&*self.api) => res,
        };
        self.loading = false;

        match outcome {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.loaded = true;
                self.error = None;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("{} dashboard batch failed: {}", self.source.name(), e);
                self.error = Some(FETCH_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Send one request, racing the cancellation token.
    pub async fn send(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value> {
        if self.is_closed() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            res = self.api.request(verb, path, body) => res,
        }
    }

    /// A read outside the batch, e.g. a profile lookup.
    pub async fn read<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.send(Verb::Get, path, None).await?;
        decode(path, value)
    }

    /// Issue a write and, if it succeeds, resynchronize with a full batch.
    ///
    /// The result reflects the write. A failed resync is recorded in
    /// [`Dashboard::error`] and does not turn a successful write into an error.
    pub async fn write_then_resync(
        &mut self,
        verb: Verb,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let value = self.send(verb, path, body).await?;
        info!("{} {} succeeded, resyncing {} dashboard", verb, path, self.source.name());
        if let Err(e) = self.fetch_all().await {
            warn!("Resync after {} {} failed: {}", verb, path, e);
        }
        Ok(value)
    }

    /// Leave a notice for `result`: `success` on Ok, `failure: <message>` on Err.
    pub fn report<T>(&mut self, result: Result<T>, success: &str, failure: &str) -> Result<T> {
        match &result {
            Ok(_) => self.notice = Some(Notice::success(success)),
            Err(ClientError::Cancelled) => {}
            Err(e) => {
                warn!("{}: {}", failure, e);
                self.notice = Some(Notice::failure(format!("{}: {}", failure, e.user_message())));
            }
        }
        result
    }
}
