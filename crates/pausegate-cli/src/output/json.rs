use std::io::Write;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print `value` followed by a newline, so outputs can be
/// concatenated line-wise by scripts.
pub fn write_json<W, T>(mut out: W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    write_json(std::io::stdout().lock(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pausegate_core::{ActionId, Outcome, ResumeToken};
    use serde_json::{Value, json};

    #[test]
    fn test_pending_outcome_is_machine_readable() {
        let outcome = Outcome::Pending {
            action_id: ActionId::new("order-7"),
            resume_token: ResumeToken::new("rt_7"),
            hint: "Approve 10 containers?".to_string(),
            payload: json!({ "containers": 10 }),
        };
        let mut out = Vec::new();
        write_json(&mut out, &outcome).unwrap();

        assert!(out.ends_with(b"}\n"));
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["status"], "pending");
        assert_eq!(parsed["resume_token"], "rt_7");
        assert_eq!(parsed["payload"]["containers"], 10);
    }
}
