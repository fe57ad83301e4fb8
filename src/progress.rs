//! Terminal progress and confirmation for apply and destroy.

use crate::ui;
use anyhow::Result;
use colored::Colorize;
use declarative::{Action, Address, ApplyResult, ConfirmCallback, ProgressCallback};
use dialoguer::Confirm;

/// Prints one line per resource as changes are applied
pub struct ConsoleProgress {
    quiet: bool,
    done: usize,
    total: usize,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            done: 0,
            total: 0,
        }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.total = count;
        self.done = 0;
        if !self.quiet {
            println!();
        }
    }

    fn on_resource_start(&mut self, address: &Address, action: Action) {
        log::info!("{address}: {action}");
    }

    fn on_resource_complete(&mut self, address: &Address, result: &ApplyResult) {
        self.done += 1;
        let step = format!("[{}/{}]", self.done, self.total).blue().bold();
        match result {
            ApplyResult::Failed { error } => {
                ui::error(&format!("{step} {address}: {error}"));
            }
            _ if self.quiet => {}
            ApplyResult::Created => println!("{step} {} {address} created", "✓".green()),
            ApplyResult::Modified => println!("{step} {} {address} updated", "✓".green()),
            ApplyResult::Replaced => println!("{step} {} {address} replaced", "✓".green()),
            ApplyResult::Removed => println!("{step} {} {address} deleted", "✓".green()),
            ApplyResult::NoChange => println!("{step} {address} unchanged"),
            ApplyResult::Skipped { reason } => {
                println!("{step} {} {address} skipped: {reason}", "⚠".yellow());
            }
        }
    }

    fn on_batch_complete(&mut self) {}
}

/// Asks on the terminal unless `--yes` was given
pub struct PromptConfirm {
    assume_yes: bool,
}

impl PromptConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_skips_prompt() {
        let mut confirm = PromptConfirm::new(true);
        assert!(confirm.confirm("Apply changes?").unwrap());
    }

    #[test]
    fn test_progress_counts() {
        let mut progress = ConsoleProgress::new(true);
        let addr = Address::new("persondb_person", "a");

        progress.on_batch_start(2);
        progress.on_resource_complete(&addr, &ApplyResult::Created);
        progress.on_resource_complete(&addr, &ApplyResult::Removed);
        assert_eq!(progress.done, 2);
    }
}
