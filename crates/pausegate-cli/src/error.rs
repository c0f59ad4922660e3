use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = err.to_string().to_lowercase();

    if msg.contains("unknown resume token") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The approval was already resolved or has expired. List outstanding ones:");
        eprintln!("  {} pausegate pending", "$".dimmed());
    }

    if msg.contains("already awaiting approval") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Approve or reject the outstanding request first. Find its token with:");
        eprintln!("  {} pausegate pending", "$".dimmed());
    }

    if msg.contains("invalid compaction config") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Set overlap_size below compaction_interval in the [compaction] section.");
    }

    if msg.contains("database already open") || msg.contains("cannot acquire lock") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Another pausegate process is using the database; retry when it exits.");
    }

    std::process::exit(1);
}
