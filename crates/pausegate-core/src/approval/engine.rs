use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use super::predicate::ApprovalPredicate;
use super::token::{TokenGenerator, UuidTokenGenerator};
use crate::error::{Error, Result};
use crate::models::{
    ActionId, ActionRequest, ApprovalKind, ApprovalPrompt, Decision, Outcome, PendingApproval,
    ResumeToken,
};
use crate::store::{InMemoryPendingStore, PendingStore};

/// Pause/resume state machine for approval-gated actions.
///
/// The engine is a pure state holder: it never blocks, spawns, or schedules.
/// The pending map lives in the injected [`PendingStore`], and all methods
/// take `&self`, so one engine can be shared across threads behind an `Arc`.
pub struct ApprovalEngine {
    store: Arc<dyn PendingStore>,
    tokens: Arc<dyn TokenGenerator>,
}

impl ApprovalEngine {
    /// Create an engine over the given store, issuing UUID tokens.
    pub fn new(store: Arc<dyn PendingStore>) -> Self {
        Self {
            store,
            tokens: Arc::new(UuidTokenGenerator),
        }
    }

    /// Create an engine with a process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPendingStore::new()))
    }

    /// Replace the token generator.
    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn store(&self) -> &Arc<dyn PendingStore> {
        &self.store
    }

    /// Evaluate `predicate` once and either approve immediately or suspend.
    ///
    /// A suspended action gets the default [`ApprovalPrompt`]. Submitting an
    /// action that is still awaiting approval fails with
    /// `Error::DuplicateAction` without evaluating the predicate.
    pub fn submit<P>(&self, request: ActionRequest, predicate: &P) -> Result<Outcome>
    where
        P: ApprovalPredicate + ?Sized,
    {
        self.ensure_not_pending(&request)?;
        if self.auto_approves(&request, predicate)? {
            return Ok(Self::auto_approved(request));
        }
        let prompt = ApprovalPrompt::for_request(&request);
        self.suspend(request, prompt)
    }

    /// Like [`submit`](Self::submit), with a caller-supplied prompt for the
    /// approver.
    pub fn submit_with_prompt<P>(
        &self,
        request: ActionRequest,
        predicate: &P,
        prompt: ApprovalPrompt,
    ) -> Result<Outcome>
    where
        P: ApprovalPredicate + ?Sized,
    {
        self.ensure_not_pending(&request)?;
        if self.auto_approves(&request, predicate)? {
            return Ok(Self::auto_approved(request));
        }
        self.suspend(request, prompt)
    }

    /// Apply a decision to the approval issued under `token`.
    ///
    /// The entry is removed from the store before the decision is applied,
    /// so a token resolves at most once; every later call (or a call after
    /// the entry was swept) fails with `Error::UnknownToken`.
    pub fn resolve(&self, token: &ResumeToken, decision: impl Into<Decision>) -> Result<Outcome> {
        let Some(mut approval) = self.store.take(token)? else {
            return Err(Error::UnknownToken(token.clone()));
        };

        let outcome = match decision.into() {
            Decision::Approve => {
                approval.approve();
                Outcome::Approved {
                    request: approval.request.clone(),
                    approval: ApprovalKind::Human,
                }
            }
            Decision::Reject { reason } => {
                approval.reject(reason.clone());
                Outcome::Rejected {
                    request: approval.request.clone(),
                    reason,
                }
            }
        };

        info!(
            action_id = %approval.action_id(),
            status = %approval.status,
            "Resolved pending approval"
        );
        self.archive(&approval);
        Ok(outcome)
    }

    /// Expire every pending approval older than `timeout` as of `now`.
    ///
    /// Returns the action ids that expired. Their tokens are unknown from
    /// here on.
    pub fn expire_stale(&self, now: DateTime<Utc>, timeout: TimeDelta) -> Result<Vec<ActionId>> {
        let cutoff = now
            .checked_sub_signed(timeout)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let stale = self.store.take_stale(cutoff)?;

        let mut expired = Vec::with_capacity(stale.len());
        for mut approval in stale {
            approval.expire(now);
            info!(
                action_id = %approval.action_id(),
                created_at = %approval.created_at,
                "Expired pending approval"
            );
            self.archive(&approval);
            expired.push(approval.action_id().clone());
        }
        Ok(expired)
    }

    /// Look up a pending approval without resolving it.
    pub fn pending(&self, token: &ResumeToken) -> Result<Option<PendingApproval>> {
        self.store.get(token)
    }

    /// All outstanding approvals, oldest first.
    pub fn list_pending(&self) -> Result<Vec<PendingApproval>> {
        self.store.list()
    }

    pub fn pending_count(&self) -> Result<usize> {
        self.store.len()
    }

    /// Resolved and expired approvals kept by the store, oldest first.
    pub fn list_archived(&self) -> Result<Vec<PendingApproval>> {
        self.store.list_archived()
    }

    /// The store's insert repeats this check atomically, so a racing submit
    /// that passes here still cannot suspend the action twice.
    fn ensure_not_pending(&self, request: &ActionRequest) -> Result<()> {
        match self.store.find_by_action(request.action_id())? {
            Some(existing) => {
                debug!(
                    action_id = %request.action_id(),
                    resume_token = %existing.resume_token,
                    "Action already awaiting approval"
                );
                Err(Error::DuplicateAction(request.action_id().clone()))
            }
            None => Ok(()),
        }
    }

    fn auto_approves<P>(&self, request: &ActionRequest, predicate: &P) -> Result<bool>
    where
        P: ApprovalPredicate + ?Sized,
    {
        predicate.evaluate(request).map_err(|err| {
            debug!(action_id = %request.action_id(), error = %err, "Approval predicate failed");
            Error::PredicateEvaluation(err)
        })
    }

    fn auto_approved(request: ActionRequest) -> Outcome {
        debug!(action_id = %request.action_id(), "Action auto-approved");
        Outcome::Approved {
            request,
            approval: ApprovalKind::Auto,
        }
    }

    fn suspend(&self, request: ActionRequest, prompt: ApprovalPrompt) -> Result<Outcome> {
        let token = self.tokens.generate().map_err(|err| match err {
            Error::TokenGeneration(_) => err,
            other => Error::TokenGeneration(other.to_string()),
        })?;

        let approval = PendingApproval::new(token, request, prompt, Utc::now());
        let outcome = Outcome::Pending {
            action_id: approval.action_id().clone(),
            resume_token: approval.resume_token.clone(),
            hint: approval.hint.clone(),
            payload: approval.payload.clone(),
        };

        match self.store.insert(approval) {
            Ok(()) => {}
            Err(Error::DuplicateToken(token)) => {
                return Err(Error::TokenGeneration(format!(
                    "generated token {token} collides with an outstanding approval"
                )));
            }
            Err(err) => return Err(err),
        }

        info!(action_id = %outcome.action_id(), "Action suspended pending approval");
        Ok(outcome)
    }

    fn archive(&self, approval: &PendingApproval) {
        if let Err(err) = self.store.archive(approval) {
            warn!(
                action_id = %approval.action_id(),
                error = %err,
                "Failed to archive resolved approval"
            );
        }
    }
}

impl Default for ApprovalEngine {
    fn default() -> Self {
        Self::in_memory()
    }
}
