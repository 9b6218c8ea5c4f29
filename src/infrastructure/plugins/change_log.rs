use crate::infrastructure::{ChangeAction, ChangeContext, ChangeHook};
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Plugin that appends one line per appointment change to an audit file in
/// the data directory.
pub struct ChangeLogHook {
    log_path: PathBuf,
}

impl ChangeLogHook {
    pub fn new(data_dir: &PathBuf) -> Self {
        Self {
            log_path: data_dir.join("change_log.txt"),
        }
    }
}

impl ChangeHook for ChangeLogHook {
    fn on_change(&self, context: &ChangeContext) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        let verb = match context.action {
            ChangeAction::Created => "Created",
            ChangeAction::Updated => "Updated",
            ChangeAction::Deleted => "Deleted",
        };

        writeln!(
            file,
            "[{}] {} appointment {} - {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            verb,
            context.appointment_id,
            context.title
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Change Log"
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
