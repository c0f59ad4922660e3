//! Auto-approval predicates.

use serde::{Deserialize, Serialize};

use crate::error::PredicateError;
use crate::models::ActionRequest;

/// Pure decision over an action request: `true` means the action may bypass
/// human review.
pub trait ApprovalPredicate {
    fn evaluate(&self, request: &ActionRequest) -> Result<bool, PredicateError>;
}

/// Predicate backed by a closure. Build one with [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnPredicate<F>(F);

impl<F> ApprovalPredicate for FnPredicate<F>
where
    F: Fn(&ActionRequest) -> Result<bool, PredicateError>,
{
    fn evaluate(&self, request: &ActionRequest) -> Result<bool, PredicateError> {
        (self.0)(request)
    }
}

/// Wrap a closure as an [`ApprovalPredicate`].
///
/// ```
/// use pausegate_core::approval::{ApprovalPredicate, from_fn};
/// use pausegate_core::models::ActionRequest;
/// use serde_json::json;
///
/// let small_order = from_fn(|request| Ok(request.numeric("containers")? <= 5.0));
/// let request = ActionRequest::from_json("order-1", json!({ "containers": 3 })).unwrap();
/// assert!(small_order.evaluate(&request).unwrap());
/// ```
pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&ActionRequest) -> Result<bool, PredicateError>,
{
    FnPredicate(f)
}

/// Auto-approve when a numeric parameter is at or below a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub field: String,
    pub max: f64,
}

impl ThresholdRule {
    pub fn new(field: impl Into<String>, max: f64) -> Self {
        Self {
            field: field.into(),
            max,
        }
    }
}

impl Default for ThresholdRule {
    fn default() -> Self {
        Self::new("containers", 5.0)
    }
}

impl ApprovalPredicate for ThresholdRule {
    fn evaluate(&self, request: &ActionRequest) -> Result<bool, PredicateError> {
        Ok(request.numeric(&self.field)? <= self.max)
    }
}

/// Never auto-approve: every action waits for a human.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireApproval;

impl ApprovalPredicate for RequireApproval {
    fn evaluate(&self, _request: &ActionRequest) -> Result<bool, PredicateError> {
        Ok(false)
    }
}
