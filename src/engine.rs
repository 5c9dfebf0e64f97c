//! The budgeted critic → fixer loop
//!
//! Classes are visited in the order they are given. Each one is reviewed by the critic and then
//! rewritten by the fixer, and the size of the rewrite (see [`diff`]) is charged against the
//! change budget. Once the budget is spent the remaining classes are passed through untouched.
//! A stabilization pass then asks the reviewer for what is still broken and re-fixes the classes
//! it names while budget remains.

use std::{collections::BTreeMap, sync::Arc};

use anyhow::{anyhow, Context as _};

use crate::{
    agents::{Critic, Fixer, Reviewer},
    diff::diff,
    domain::{Class, Description, Job, Suggestion},
};

/// Reviewer rounds in the stabilization pass
pub const STABILIZATION_ROUNDS: usize = 3;

const REVIEW_CLASS: &str = "review the class";
const FIX_CLASS: &str = "fix the class";

/// Result of one engine run
#[derive(Debug)]
pub struct Outcome {
    /// Every class, in input order, with its final content
    pub classes: Vec<Arc<dyn Class>>,
    /// Paths of the classes rewritten by the fixer
    pub fixed: Vec<String>,
    /// Paths of the classes skipped because the budget was spent
    pub skipped: Vec<String>,
    /// Total changed lines
    pub changed: usize,
}

pub struct Engine<C, F, R> {
    critic: C,
    fixer: F,
    reviewer: R,
    rounds: usize,
}

impl<C: Critic, F: Fixer, R: Reviewer> Engine<C, F, R> {
    pub fn new(critic: C, fixer: F, reviewer: R) -> Self {
        Self {
            critic,
            fixer,
            reviewer,
            rounds: STABILIZATION_ROUNDS,
        }
    }

    /// Limit the stabilization pass; zero disables it
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Refactor `classes` of `project`, spending at most roughly `max_size` changed lines
    ///
    /// Content changes are applied to the given classes through [`Class::set_content`]. A critic
    /// or fixer failure aborts the run.
    pub async fn run(
        &self,
        project: &str,
        classes: Vec<Arc<dyn Class>>,
        max_size: usize,
    ) -> anyhow::Result<Outcome> {
        let mut outcome = Outcome {
            classes,
            fixed: Vec::new(),
            skipped: Vec::new(),
            changed: 0,
        };
        tracing::info!(%project, classes = outcome.classes.len(), max_size, "starting refactoring");

        for class in &outcome.classes {
            if outcome.changed >= max_size {
                tracing::warn!(
                    class = class.name(),
                    changed = outcome.changed,
                    max_size,
                    "change budget spent, skipping class"
                );
                outcome.skipped.push(class.path().to_string());
                continue;
            }

            let review = Job::new(Description::new(REVIEW_CLASS)).with_class(class.as_ref());
            let critique = self.critic.review(review).await.with_context(|| {
                format!("failed to review class {} in project {project}", class.name())
            })?;

            let delta = self
                .fix(class.as_ref(), critique.suggestions)
                .await
                .with_context(|| {
                    format!("failed to fix class {} in project {project}", class.name())
                })?;
            outcome.changed += delta;
            outcome.fixed.push(class.path().to_string());
        }

        self.stabilize(project, &mut outcome, max_size).await?;

        tracing::info!(
            %project,
            fixed = outcome.fixed.len(),
            skipped = outcome.skipped.len(),
            changed = outcome.changed,
            "refactoring finished"
        );
        Ok(outcome)
    }

    /// Ask the fixer to apply `suggestions` to `class`, store the result and return its diff
    async fn fix(&self, class: &dyn Class, suggestions: Vec<Suggestion>) -> anyhow::Result<usize> {
        let job = Job::new(Description::new(FIX_CLASS))
            .with_class(class)
            .with_suggestions(suggestions);
        let artifacts = self.fixer.fix(job).await?;
        let modified = artifacts
            .classes
            .first()
            .ok_or_else(|| anyhow!("fixer returned no class"))?;

        let before = class.content();
        let after = modified.content();
        let delta = diff(&before, &after);
        class.set_content(&after)?;
        tracing::info!(class = class.name(), path = class.path(), diff = delta, "fixed class");
        Ok(delta)
    }

    async fn stabilize(
        &self,
        project: &str,
        outcome: &mut Outcome,
        max_size: usize,
    ) -> anyhow::Result<()> {
        for round in 1..=self.rounds {
            let review = self
                .reviewer
                .review()
                .await
                .with_context(|| format!("failed to review project {project}"))?;
            if review.suggestions.is_empty() {
                tracing::debug!(round, "reviewer has no suggestions");
                return Ok(());
            }
            tracing::info!(round, suggestions = review.suggestions.len(), "stabilizing");

            for (target, suggestions) in group_by_class(review.suggestions) {
                if outcome.changed >= max_size {
                    tracing::warn!(changed = outcome.changed, max_size, "change budget spent, stopping stabilization");
                    return Ok(());
                }
                let Some(class) = outcome
                    .classes
                    .iter()
                    .find(|class| class.path() == target || class.name() == target)
                else {
                    tracing::warn!(%target, "reviewer suggestion names an unknown class");
                    continue;
                };
                let delta = self
                    .fix(class.as_ref(), suggestions)
                    .await
                    .with_context(|| {
                        format!("failed to fix class {} in project {project}", class.name())
                    })?;
                outcome.changed += delta;
                if !outcome.fixed.iter().any(|path| path == class.path()) {
                    outcome.fixed.push(class.path().to_string());
                }
            }
        }
        Ok(())
    }
}

fn group_by_class(suggestions: Vec<Suggestion>) -> BTreeMap<String, Vec<Suggestion>> {
    let mut grouped: BTreeMap<String, Vec<Suggestion>> = BTreeMap::new();
    for suggestion in suggestions {
        grouped
            .entry(suggestion.class_path.clone())
            .or_default()
            .push(suggestion);
    }
    grouped
}
