//! Approval workflow engine.
//!
//! # State machine
//!
//! ```text
//!                submit
//!   NOT_STARTED ───────► AUTO_APPROVED                  (predicate = true)
//!        │
//!        │ submit (predicate = false)
//!        ▼
//!     PENDING ──resolve(token, true)──► APPROVED
//!        │    ──resolve(token, false)─► REJECTED
//!        │
//!        └──expire_stale(now, timeout)─► EXPIRED
//! ```
//!
//! A suspended action is keyed only by the resume token issued at suspend
//! time. Resolution takes the entry out of the store in one atomic step, so
//! each token resolves at most once and a late or repeated decision fails
//! with `Error::UnknownToken` instead of re-evaluating the action.
//!
//! When `expire_stale` and `resolve` race on the same token, whichever
//! removes the entry from the store first wins; the other sees nothing.
//!
//! # Example
//!
//! ```
//! use pausegate_core::approval::{ApprovalEngine, ThresholdRule};
//! use pausegate_core::models::{ActionRequest, ApprovalStatus};
//! use serde_json::json;
//!
//! let engine = ApprovalEngine::in_memory();
//! let rule = ThresholdRule::new("containers", 5.0);
//!
//! let request = ActionRequest::from_json("order-7", json!({ "containers": 10 })).unwrap();
//! let outcome = engine.submit(request, &rule).unwrap();
//! assert_eq!(outcome.status(), ApprovalStatus::Pending);
//!
//! let token = outcome.resume_token().unwrap().clone();
//! let resolved = engine.resolve(&token, true).unwrap();
//! assert_eq!(resolved.status(), ApprovalStatus::Approved);
//! ```

mod engine;
mod predicate;
mod token;

pub use engine::ApprovalEngine;
pub use predicate::{ApprovalPredicate, FnPredicate, RequireApproval, ThresholdRule, from_fn};
pub use token::{TokenGenerator, UuidTokenGenerator};
