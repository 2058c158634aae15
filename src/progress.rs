//! Terminal progress and confirmation for the declarative executor.

use anyhow::Result;
use declarative::{ApplyResult, ConfirmCallback, ProgressCallback};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

const PHASE_NAMES: [&str; 3] = ["option definitions", "subnets", "reservations"];

/// Name of an execution phase for display
pub fn phase_name(phase: u32) -> &'static str {
    PHASE_NAMES
        .get(phase as usize)
        .copied()
        .unwrap_or("resources")
}

/// Progress bar per phase
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
    failures: Vec<(String, String)>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record results without drawing anything
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    /// Failed resources with their errors, in completion order
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, phase: u32) {
        if self.hidden {
            return;
        }
        let pb = ProgressBar::new(count as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(format!("Applying {}", phase_name(phase)));
        self.bar = Some(pb);
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(id.to_string());
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if let ApplyResult::Failed { error } = result {
            self.failures.push((id.to_string(), error.clone()));
        }
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{} {}", ui::result_symbol(result), id));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

/// Interactive yes/no prompt
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
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
    fn test_phase_names() {
        assert_eq!(phase_name(0), "option definitions");
        assert_eq!(phase_name(2), "reservations");
        assert_eq!(phase_name(9), "resources");
    }

    #[test]
    fn test_failures_are_collected() {
        let mut progress = BarProgress::hidden();
        progress.on_batch_start(2, 1);
        progress.on_resource_complete("10.0.0.0/8@kea1", &ApplyResult::Created);
        progress.on_resource_complete(
            "10.1.0.0/16@kea1",
            &ApplyResult::Failed {
                error: "result 4".into(),
            },
        );
        progress.on_batch_complete();
        assert_eq!(
            progress.failures(),
            &[("10.1.0.0/16@kea1".to_string(), "result 4".to_string())]
        );
    }
}
