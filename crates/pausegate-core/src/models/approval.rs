//! Approval workflow records: action requests, pending approvals, decisions
//! and outcomes.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PredicateError, Result};

/// Parameters of an action, as an arbitrary JSON object.
pub type Parameters = Map<String, Value>;

/// Caller-assigned identifier of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque, unguessable key correlating a suspended action with its decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeToken(String);

impl ResumeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResumeToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ResumeToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// One invocation of an approval-gated action.
///
/// There are no setters: once built, a request is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    action_id: ActionId,
    parameters: Parameters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    threshold_fields: Vec<String>,
}

impl ActionRequest {
    /// Create a request from a parameter map.
    pub fn new(action_id: impl Into<ActionId>, parameters: Parameters) -> Self {
        Self {
            action_id: action_id.into(),
            parameters,
            threshold_fields: Vec::new(),
        }
    }

    /// Create a request from a JSON value, which must be an object.
    pub fn from_json(action_id: impl Into<ActionId>, parameters: Value) -> Result<Self> {
        let parameters: Parameters = serde_json::from_value(parameters)?;
        Ok(Self::new(action_id, parameters))
    }

    /// Name the parameters that auto-approval decisions look at.
    pub fn with_threshold_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.threshold_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn threshold_fields(&self) -> &[String] {
        &self.threshold_fields
    }

    /// Raw parameter value.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Parameter value as a number, for threshold comparisons.
    pub fn numeric(&self, key: &str) -> std::result::Result<f64, PredicateError> {
        let value = self
            .parameters
            .get(key)
            .ok_or_else(|| PredicateError::MissingField(key.to_string()))?;
        value.as_f64().ok_or_else(|| PredicateError::NotNumeric {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    /// The subset of parameters named by `threshold_fields`.
    ///
    /// Fields that are named but absent are skipped.
    pub fn threshold_values(&self) -> Parameters {
        self.threshold_fields
            .iter()
            .filter_map(|field| {
                self.parameters
                    .get(field)
                    .map(|value| (field.clone(), value.clone()))
            })
            .collect()
    }
}

/// Prompt presented to the human approver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPrompt {
    pub hint: String,
    pub payload: Value,
}

impl ApprovalPrompt {
    pub fn new(hint: impl Into<String>, payload: Value) -> Self {
        Self {
            hint: hint.into(),
            payload,
        }
    }

    /// Default prompt: a hint naming the action, and the threshold parameters
    /// (or every parameter when no threshold fields are named) as payload.
    pub fn for_request(request: &ActionRequest) -> Self {
        let payload = if request.threshold_fields().is_empty() {
            request.parameters().clone()
        } else {
            request.threshold_values()
        };
        Self {
            hint: format!("Action `{}` requires approval", request.action_id()),
            payload: Value::Object(payload),
        }
    }
}

/// Status of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a decision
    #[default]
    Pending,
    /// Approved automatically or by a human
    Approved,
    /// Rejected by a human
    Rejected,
    /// Swept after its timeout without a decision
    Expired,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// A suspended action awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Sole key for resuming this approval
    pub resume_token: ResumeToken,

    /// The suspended action
    pub request: ActionRequest,

    /// Human-readable prompt text
    pub hint: String,

    /// Data shown to the approver
    pub payload: Value,

    /// When the action was suspended
    pub created_at: DateTime<Utc>,

    /// Current status
    pub status: ApprovalStatus,

    /// Optional reason for rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    /// When the approval left the pending state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PendingApproval {
    pub fn new(
        resume_token: ResumeToken,
        request: ActionRequest,
        prompt: ApprovalPrompt,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            resume_token,
            request,
            hint: prompt.hint,
            payload: prompt.payload,
            created_at,
            status: ApprovalStatus::Pending,
            rejection_reason: None,
            resolved_at: None,
        }
    }

    pub fn action_id(&self) -> &ActionId {
        self.request.action_id()
    }

    /// Whether `timeout` has elapsed since creation, as seen at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        now.signed_duration_since(self.created_at) >= timeout
    }

    /// Approve the request.
    pub fn approve(&mut self) {
        self.status = ApprovalStatus::Approved;
        self.resolved_at = Some(Utc::now());
    }

    /// Reject the request with an optional reason.
    pub fn reject(&mut self, reason: Option<String>) {
        self.status = ApprovalStatus::Rejected;
        self.rejection_reason = reason;
        self.resolved_at = Some(Utc::now());
    }

    /// Mark the request as expired.
    pub fn expire(&mut self, at: DateTime<Utc>) {
        self.status = ApprovalStatus::Expired;
        self.resolved_at = Some(at);
    }
}

/// A human decision submitted against a resume token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl Decision {
    pub fn reject_with(reason: impl Into<String>) -> Self {
        Decision::Reject {
            reason: Some(reason.into()),
        }
    }
}

impl From<bool> for Decision {
    fn from(approved: bool) -> Self {
        if approved {
            Decision::Approve
        } else {
            Decision::Reject { reason: None }
        }
    }
}

/// Who approved an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// The auto-approval predicate accepted it at submit time
    Auto,
    /// A human approved it through its resume token
    Human,
}

/// Result of `submit` or `resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Approved {
        request: ActionRequest,
        approval: ApprovalKind,
    },
    Pending {
        action_id: ActionId,
        resume_token: ResumeToken,
        hint: String,
        payload: Value,
    },
    Rejected {
        request: ActionRequest,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl Outcome {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Outcome::Approved { .. } => ApprovalStatus::Approved,
            Outcome::Pending { .. } => ApprovalStatus::Pending,
            Outcome::Rejected { .. } => ApprovalStatus::Rejected,
        }
    }

    pub fn action_id(&self) -> &ActionId {
        match self {
            Outcome::Approved { request, .. } | Outcome::Rejected { request, .. } => {
                request.action_id()
            }
            Outcome::Pending { action_id, .. } => action_id,
        }
    }

    /// The token to resume with; only present on pending outcomes.
    pub fn resume_token(&self) -> Option<&ResumeToken> {
        match self {
            Outcome::Pending { resume_token, .. } => Some(resume_token),
            _ => None,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Outcome::Approved { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(containers: i64) -> ActionRequest {
        ActionRequest::from_json(
            "ship-1",
            json!({ "containers": containers, "destination": "Rotterdam" }),
        )
        .unwrap()
        .with_threshold_fields(["containers"])
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(ActionRequest::from_json("a", json!([1, 2])).is_err());
    }

    #[test]
    fn test_numeric_reports_missing_and_non_numeric() {
        let request = ActionRequest::from_json("a", json!({ "destination": "Oslo" })).unwrap();
        assert_eq!(
            request.numeric("containers"),
            Err(PredicateError::MissingField("containers".to_string()))
        );
        assert!(matches!(
            request.numeric("destination"),
            Err(PredicateError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_default_prompt_uses_threshold_values() {
        let prompt = ApprovalPrompt::for_request(&order(10));
        assert_eq!(prompt.payload, json!({ "containers": 10 }));
        assert!(prompt.hint.contains("ship-1"));

        let untracked = ActionRequest::from_json("b", json!({ "x": 1 })).unwrap();
        assert_eq!(
            ApprovalPrompt::for_request(&untracked).payload,
            json!({ "x": 1 })
        );
    }

    #[test]
    fn test_stale_at_exact_timeout() {
        let created = Utc::now();
        let approval = PendingApproval::new(
            ResumeToken::new("rt_1"),
            order(10),
            ApprovalPrompt::for_request(&order(10)),
            created,
        );
        assert!(approval.is_stale(created, TimeDelta::zero()));
        assert!(!approval.is_stale(created, TimeDelta::seconds(1)));
        assert!(approval.is_stale(created + TimeDelta::seconds(1), TimeDelta::seconds(1)));
    }

    #[test]
    fn test_decision_from_bool() {
        assert_eq!(Decision::from(true), Decision::Approve);
        assert_eq!(Decision::from(false), Decision::Reject { reason: None });
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = Outcome::Pending {
            action_id: ActionId::new("ship-1"),
            resume_token: ResumeToken::new("rt_1"),
            hint: "Approve?".to_string(),
            payload: json!({ "containers": 10 }),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["resume_token"], "rt_1");
        assert_eq!(outcome.status(), ApprovalStatus::Pending);
    }
}
