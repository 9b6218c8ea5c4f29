use crate::infrastructure::{ChangeAction, ChangeContext, ChangeHook};
use anyhow::Result;

/// Surfaces a confirmation line after each successful change, in the wording
/// the practice staff see.
pub struct ConsoleNotifier;

impl ChangeHook for ConsoleNotifier {
    fn on_change(&self, context: &ChangeContext) -> Result<()> {
        let message = match context.action {
            ChangeAction::Created => "Termin wurde erstellt!",
            ChangeAction::Updated => "Termin wurde geändert!",
            ChangeAction::Deleted => "Termin wurde gelöscht!",
        };
        println!("{message}");
        Ok(())
    }

    fn name(&self) -> &str {
        "Console Notifier"
    }
}
