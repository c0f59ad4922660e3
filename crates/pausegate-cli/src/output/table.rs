use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use pausegate_core::PendingApproval;

use crate::commands::utils::format_timestamp;

const PENDING_HEADER: [&str; 4] = ["Token", "Action", "Hint", "Created"];
const HISTORY_HEADER: [&str; 6] = ["Token", "Action", "Status", "Created", "Resolved", "Reason"];

/// Outstanding approvals, one row each. `None` when there are none.
pub fn pending_table(approvals: &[PendingApproval]) -> Option<Table> {
    build(&PENDING_HEADER, approvals, |approval| {
        vec![
            Cell::new(&approval.resume_token),
            Cell::new(approval.action_id()),
            Cell::new(&approval.hint),
            Cell::new(format_timestamp(Some(approval.created_at))),
        ]
    })
}

/// Resolved and expired approvals, one row each. `None` when there are none.
pub fn history_table(approvals: &[PendingApproval]) -> Option<Table> {
    build(&HISTORY_HEADER, approvals, |approval| {
        vec![
            Cell::new(&approval.resume_token),
            Cell::new(approval.action_id()),
            Cell::new(approval.status),
            Cell::new(format_timestamp(Some(approval.created_at))),
            Cell::new(format_timestamp(approval.resolved_at)),
            Cell::new(approval.rejection_reason.as_deref().unwrap_or("-")),
        ]
    })
}

/// Print `table`, or `empty` when there was nothing to tabulate.
pub fn print_table(table: Option<Table>, empty: &str) -> Result<()> {
    match table {
        Some(table) => println!("{table}"),
        None => println!("{empty}"),
    }
    Ok(())
}

fn build<T>(header: &[&str], items: &[T], row: impl Fn(&T) -> Vec<Cell>) -> Option<Table> {
    if items.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    for item in items {
        table.add_row(row(item));
    }
    Some(table)
}
