//! Async façade over [`ApprovalEngine`] with approval notifications.
//!
//! The engine itself is synchronous and never schedules anything. This
//! module is for tokio callers: it forwards each call to the engine and then
//! tells an [`ApprovalCallback`] about the transition (e.g. send a chat
//! message asking for approval). It also offers an explicit expiry sweeper
//! task that the caller may spawn.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::approval::{ApprovalEngine, ApprovalPredicate};
use crate::error::Result;
use crate::models::{
    ActionId, ActionRequest, ApprovalPrompt, Decision, Outcome, PendingApproval, ResumeToken,
};

/// Callback trait for approval notifications.
///
/// Callback failures are logged and never roll back the state transition
/// that triggered them.
#[async_trait]
pub trait ApprovalCallback: Send + Sync {
    /// Called when an action has been suspended.
    ///
    /// The implementation should show `approval.hint` and `approval.payload`
    /// to a human and route their decision back to `resolve`.
    async fn request_approval(&self, approval: &PendingApproval) -> anyhow::Result<()>;

    /// Called when a pending approval is approved or rejected.
    async fn on_resolved(&self, outcome: &Outcome) -> anyhow::Result<()> {
        let _ = outcome;
        Ok(())
    }

    /// Called after a sweep expired one or more approvals.
    async fn on_expired(&self, expired: &[ActionId]) -> anyhow::Result<()> {
        let _ = expired;
        Ok(())
    }
}

/// Approval engine plus an optional notification callback.
pub struct ApprovalService {
    engine: Arc<ApprovalEngine>,
    callback: Option<Arc<dyn ApprovalCallback>>,
}

impl ApprovalService {
    pub fn new(engine: Arc<ApprovalEngine>) -> Self {
        Self {
            engine,
            callback: None,
        }
    }

    /// Set the callback for approval notifications.
    pub fn with_callback(mut self, callback: Arc<dyn ApprovalCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Set the callback for approval notifications (mutable).
    pub fn set_callback(&mut self, callback: Arc<dyn ApprovalCallback>) {
        self.callback = Some(callback);
    }

    pub fn engine(&self) -> &Arc<ApprovalEngine> {
        &self.engine
    }

    pub async fn submit<P>(&self, request: ActionRequest, predicate: &P) -> Result<Outcome>
    where
        P: ApprovalPredicate + Sync + ?Sized,
    {
        let outcome = self.engine.submit(request, predicate)?;
        self.notify_pending(&outcome).await?;
        Ok(outcome)
    }

    pub async fn submit_with_prompt<P>(
        &self,
        request: ActionRequest,
        predicate: &P,
        prompt: ApprovalPrompt,
    ) -> Result<Outcome>
    where
        P: ApprovalPredicate + Sync + ?Sized,
    {
        let outcome = self.engine.submit_with_prompt(request, predicate, prompt)?;
        self.notify_pending(&outcome).await?;
        Ok(outcome)
    }

    pub async fn resolve(
        &self,
        token: &ResumeToken,
        decision: impl Into<Decision>,
    ) -> Result<Outcome> {
        let outcome = self.engine.resolve(token, decision)?;
        if let Some(callback) = &self.callback
            && let Err(err) = callback.on_resolved(&outcome).await
        {
            warn!(action_id = %outcome.action_id(), error = %err, "Resolution callback failed");
        }
        Ok(outcome)
    }

    pub async fn expire_stale(
        &self,
        now: chrono::DateTime<Utc>,
        timeout: TimeDelta,
    ) -> Result<Vec<ActionId>> {
        let expired = self.engine.expire_stale(now, timeout)?;
        if !expired.is_empty()
            && let Some(callback) = &self.callback
            && let Err(err) = callback.on_expired(&expired).await
        {
            warn!(count = expired.len(), error = %err, "Expiry callback failed");
        }
        Ok(expired)
    }

    /// Spawn a task that expires approvals older than `timeout` every
    /// `every`. The task runs until the returned handle is aborted.
    pub fn spawn_expiry_sweeper(
        self: &Arc<Self>,
        timeout: TimeDelta,
        every: Duration,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let every = every.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match service.expire_stale(Utc::now(), timeout).await {
                    Ok(expired) if !expired.is_empty() => {
                        debug!(count = expired.len(), "Approval sweep expired entries");
                    }
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "Approval sweep failed"),
                }
            }
        })
    }

    async fn notify_pending(&self, outcome: &Outcome) -> Result<()> {
        let (Some(callback), Some(token)) = (&self.callback, outcome.resume_token()) else {
            return Ok(());
        };
        // The approval may already be gone if another caller resolved it.
        let Some(approval) = self.engine.pending(token)? else {
            debug!(action_id = %outcome.action_id(), "Approval resolved before notification");
            return Ok(());
        };
        if let Err(err) = callback.request_approval(&approval).await {
            warn!(
                action_id = %approval.action_id(),
                error = %err,
                "Approval request callback failed"
            );
        }
        Ok(())
    }
}
