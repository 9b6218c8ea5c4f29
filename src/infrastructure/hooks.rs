use anyhow::Result;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Context provided to change hooks
#[derive(Debug, Clone)]
pub struct ChangeContext {
    pub action: ChangeAction,
    pub appointment_id: String,
    pub title: String,
}

/// Trait for plugins that respond to successful appointment changes
pub trait ChangeHook: Send + Sync {
    /// Called after an appointment has been created, updated, or deleted
    fn on_change(&self, context: &ChangeContext) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;

    /// Whether this hook should be enabled by default
    fn enabled_by_default(&self) -> bool {
        true
    }
}

/// Registry for managing change hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn ChangeHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new change hook
    pub fn register<H>(&mut self, hook: H)
    where
        H: ChangeHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Execute all registered hooks for a change. A failing hook is reported
    /// and the remaining hooks still run; the change itself has already
    /// succeeded and must not be failed retroactively.
    pub fn execute(&self, context: &ChangeContext) -> Result<()> {
        for hook in &self.hooks {
            if let Err(e) = hook.on_change(context) {
                warn!("hook '{}' failed: {}", hook.name(), e);
            }
        }
        Ok(())
    }

    /// List all registered hooks
    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHook {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ChangeHook for CountingHook {
        fn on_change(&self, _context: &ChangeContext) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("deliberate failure")
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "Counting"
        }
    }

    #[test]
    fn a_failing_hook_does_not_stop_the_rest() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut registry = HookRegistry::new();
        registry.register(CountingHook {
            calls: first.clone(),
            fail: true,
        });
        registry.register(CountingHook {
            calls: second.clone(),
            fail: false,
        });

        let context = ChangeContext {
            action: ChangeAction::Created,
            appointment_id: "a1".to_string(),
            title: "Erstgespräch".to_string(),
        };
        registry.execute(&context).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
