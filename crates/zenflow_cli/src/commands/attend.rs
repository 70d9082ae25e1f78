use anyhow::Result;
use clap::Subcommand;
use zenflow_core::{KeyValueStore, StudioStore};

#[derive(Debug, Subcommand)]
pub enum AttendCommand {
    /// Check a member in; consumes one credit when available.
    Mark { class_id: String, member_id: String },
    /// Undo a check-in; always refunds one credit.
    Remove { class_id: String, member_id: String },
}

pub fn run<S: KeyValueStore>(store: &mut StudioStore<S>, command: AttendCommand) -> Result<()> {
    match command {
        AttendCommand::Mark {
            class_id,
            member_id,
        } => {
            let outcome = store.mark_attendance(&class_id, &member_id)?;
            if outcome.credit_charged {
                println!("Checked in, {} classes left.", outcome.remaining_classes);
            } else {
                println!("Checked in without credit (balance is 0).");
            }
        }
        AttendCommand::Remove {
            class_id,
            member_id,
        } => {
            let outcome = store.remove_attendance(&class_id, &member_id)?;
            println!(
                "Check-in removed ({} records), {} classes left.",
                outcome.records_removed, outcome.remaining_classes
            );
        }
    }
    Ok(())
}
