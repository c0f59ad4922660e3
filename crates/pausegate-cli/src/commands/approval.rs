use anyhow::Result;
use chrono::{TimeDelta, Utc};
use colored::Colorize;
use pausegate_core::{
    ActionRequest, ApprovalKind, ApprovalPredicate, ApprovalPrompt, ApprovalService, Decision,
    Outcome, PausegateConfig, RequireApproval, ResumeToken,
};
use serde_json::json;

use crate::cli::SubmitArgs;
use crate::commands::utils::parse_params;
use crate::output::OutputFormat;
use crate::output::table::{history_table, pending_table, print_table};

pub async fn submit(
    service: &ApprovalService,
    config: &PausegateConfig,
    args: SubmitArgs,
    format: OutputFormat,
) -> Result<()> {
    let params = parse_params(&args.params)?;
    let request =
        ActionRequest::new(args.action_id, params).with_threshold_fields(args.threshold_fields);

    let predicate: &(dyn ApprovalPredicate + Sync) = if args.require_approval {
        &RequireApproval
    } else {
        &config.approval.rule
    };

    let outcome = match args.hint {
        Some(hint) => {
            let default = ApprovalPrompt::for_request(&request);
            let prompt = ApprovalPrompt::new(hint, default.payload);
            service
                .submit_with_prompt(request, predicate, prompt)
                .await?
        }
        None => service.submit(request, predicate).await?,
    };

    print_outcome(&outcome, format)
}

pub async fn list_pending(service: &ApprovalService, format: OutputFormat) -> Result<()> {
    let pending = service.engine().list_pending()?;
    format.emit(pending.as_slice(), |pending| {
        print_table(pending_table(pending), "No pending approvals.")
    })
}

pub async fn resolve(
    service: &ApprovalService,
    token: String,
    decision: Decision,
    format: OutputFormat,
) -> Result<()> {
    let outcome = service.resolve(&ResumeToken::new(token), decision).await?;
    print_outcome(&outcome, format)
}

pub async fn sweep(
    service: &ApprovalService,
    config: &PausegateConfig,
    timeout_secs: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let timeout = match timeout_secs {
        Some(secs) => i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX),
        None => config.approval.timeout(),
    };
    let expired = service.expire_stale(Utc::now(), timeout).await?;

    format.emit(&json!({ "expired": expired }), |_| {
        if expired.is_empty() {
            println!("No stale approvals.");
            return Ok(());
        }
        println!("Expired {} approval(s):", expired.len());
        for action_id in &expired {
            println!("  {action_id}");
        }
        Ok(())
    })
}

pub async fn history(service: &ApprovalService, format: OutputFormat) -> Result<()> {
    let archived = service.engine().list_archived()?;
    format.emit(archived.as_slice(), |archived| {
        print_table(history_table(archived), "No resolved approvals.")
    })
}

fn print_outcome(outcome: &Outcome, format: OutputFormat) -> Result<()> {
    format.emit(outcome, print_outcome_text)
}

fn print_outcome_text(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Approved { request, approval } => {
            let how = match approval {
                ApprovalKind::Auto => "auto-approved",
                ApprovalKind::Human => "approved",
            };
            println!("{} {} {how}", "✓".green(), request.action_id());
        }
        Outcome::Pending {
            action_id,
            resume_token,
            hint,
            payload,
        } => {
            println!("{} {action_id} is waiting for approval", "⏸".yellow());
            println!("  Hint:    {hint}");
            println!("  Token:   {resume_token}");
            println!("  Payload: {payload}");
            println!("\n  {} pausegate approve {resume_token}", "$".dimmed());
        }
        Outcome::Rejected { request, reason } => {
            println!("{} {} rejected", "✗".red(), request.action_id());
            if let Some(reason) = reason {
                println!("  Reason: {reason}");
            }
        }
    }
    Ok(())
}
