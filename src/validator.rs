use anyhow::{Context, Result};

use crate::checks::{self, Matchers};
use crate::config::Rules;
use crate::model::issue::{Issue, IssueState};
use crate::tracker::IssueTracker;

pub const INVALID_LABEL: &str = "invalid";
pub const BUG_LABEL: &str = "bug";

const CLOSE_PREAMBLE: &str = "This issue has been closed due to incorrect formatting. \
Please address the following mistakes and reopen the issue:\n\n";
const REOPEN_COMMENT: &str =
    "Thanks for addressing your formatting mistakes. The issue has been reopened now.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingLog,
    TitleTooShort(usize),
    TitleTooLong(usize),
    BadCommitId,
}

impl Violation {
    pub fn message(&self) -> String {
        match self {
            Violation::MissingLog => {
                "Include **THE FULL LOG FROM THE START OF THE WEBUI** in the issue description."
                    .to_string()
            }
            Violation::TitleTooShort(min) => {
                format!("Make sure the issue title has at least {min} words.")
            }
            Violation::TitleTooLong(max) => format!(
                "The issue title should be concise and contain no more than {max} words."
            ),
            Violation::BadCommitId => "Provide a valid commit ID in the format \
'commit id - [commit_hash]' **both** for the WebUI and the Extension."
                .to_string(),
        }
    }
}

/// The single action taken for an issue on this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a bug report; left alone.
    Skip,
    /// Well formed and already open.
    NoOp,
    Close { comment: String },
    Reopen { comment: String },
}

pub struct Validator {
    rules: Rules,
    matchers: Matchers,
}

impl Validator {
    pub fn new(rules: Rules) -> Result<Self> {
        let matchers = Matchers::new(&rules)?;
        Ok(Self { rules, matchers })
    }

    /// Run every check; all of them always run so the reporter sees every
    /// problem at once.
    pub fn collect_violations(&self, issue: &Issue) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !self.matchers.contains_all_keywords(&issue.body) {
            violations.push(Violation::MissingLog);
        }
        if !checks::title_has_min_words(&issue.title, self.rules.min_title_words) {
            violations.push(Violation::TitleTooShort(self.rules.min_title_words));
        }
        if !checks::title_within_max_words(&issue.title, self.rules.max_title_words) {
            violations.push(Violation::TitleTooLong(self.rules.max_title_words));
        }
        if !self.matchers.commit_ids_valid(&issue.body) {
            violations.push(Violation::BadCommitId);
        }

        violations
    }

    pub fn decide(&self, issue: &Issue) -> Outcome {
        if !self.matchers.is_bug_report(&issue.title) {
            return Outcome::Skip;
        }

        let violations = self.collect_violations(issue);
        if !violations.is_empty() {
            return Outcome::Close {
                comment: close_comment(&violations),
            };
        }

        if issue.is_closed() {
            Outcome::Reopen {
                comment: REOPEN_COMMENT.to_string(),
            }
        } else {
            Outcome::NoOp
        }
    }
}

pub fn close_comment(violations: &[Violation]) -> String {
    let bullets: Vec<String> = violations
        .iter()
        .map(|v| format!("- {}", v.message()))
        .collect();
    format!("{CLOSE_PREAMBLE}{}", bullets.join("\n"))
}

/// Perform the tracker calls for an outcome. Calls are made in order and an
/// error stops the sequence; earlier calls are not undone.
pub async fn apply(tracker: &dyn IssueTracker, issue: &Issue, outcome: &Outcome) -> Result<()> {
    let number = issue.number;
    match outcome {
        Outcome::Skip | Outcome::NoOp => {}
        Outcome::Close { comment } => {
            tracing::warn!(issue = number, "closing badly formatted bug report");
            tracker.ensure_label(INVALID_LABEL).await?;
            tracker
                .add_labels(number, &[INVALID_LABEL])
                .await
                .with_context(|| format!("Failed to label #{number} as {INVALID_LABEL}"))?;
            tracker
                .set_state(number, IssueState::Closed)
                .await
                .with_context(|| format!("Failed to close #{number}"))?;
            tracker
                .add_comment(number, comment)
                .await
                .with_context(|| format!("Failed to comment on #{number}"))?;
        }
        Outcome::Reopen { comment } => {
            tracing::info!(issue = number, "reopening corrected bug report");
            tracker
                .set_state(number, IssueState::Open)
                .await
                .with_context(|| format!("Failed to reopen #{number}"))?;
            tracker
                .remove_all_labels(number)
                .await
                .with_context(|| format!("Failed to clear labels on #{number}"))?;
            tracker.ensure_label(BUG_LABEL).await?;
            tracker
                .add_labels(number, &[BUG_LABEL])
                .await
                .with_context(|| format!("Failed to label #{number} as {BUG_LABEL}"))?;
            tracker
                .add_comment(number, comment)
                .await
                .with_context(|| format!("Failed to comment on #{number}"))?;
        }
    }
    Ok(())
}

/// Fetch one issue, decide what to do with it and, unless `dry_run`, do it.
pub async fn run(
    tracker: &dyn IssueTracker,
    validator: &Validator,
    number: u64,
    dry_run: bool,
) -> Result<Outcome> {
    let issue = tracker
        .fetch_issue(number)
        .await
        .with_context(|| format!("Failed to fetch issue #{number}"))?;

    let outcome = validator.decide(&issue);
    tracing::info!(
        issue = number,
        state = %issue.state,
        labels = ?issue.labels,
        ?outcome,
        "checked issue"
    );

    if dry_run {
        tracing::info!(issue = number, "dry run, not modifying issue");
    } else {
        apply(tracker, &issue, &outcome).await?;
    }
    Ok(outcome)
}
