use log::{debug, info, warn};

use super::draft::IssueDraft;
use crate::error::Result;
use crate::github::{Issue, IssueState, IssueTracker};

/// The label attached to every issue the notifier files
pub const LABEL_NAME: &str = "nvchecker";

/// How an existing issue compares with the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    NoMatch,
    OpenSame,
    OpenDiffering,
    Closed,
}

impl Match {
    pub fn classify(existing: Option<&Issue>, draft: &IssueDraft) -> Match {
        match existing {
            None => Match::NoMatch,
            // title search matches words, so `foo` can find `foo-bin`'s issue
            Some(issue) if !issue.title.starts_with(&draft.title_prefix()) => Match::NoMatch,
            Some(issue) if issue.state == IssueState::Closed => Match::Closed,
            Some(issue) if issue.title == draft.title && issue.body == draft.body => {
                Match::OpenSame
            }
            Some(_) => Match::OpenDiffering,
        }
    }
}

/// What a reconciliation run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged { url: String },
    Updated { url: String },
    Created { url: String },
}

/// The issue search query locating earlier issues for the draft's package
pub fn search_query(repo_full_name: &str, draft: &IssueDraft) -> String {
    format!(
        "repo:{repo_full_name} is:issue in:title {}",
        draft.title_prefix()
    )
}

/// Bring the tracking issue for `draft` in `repo_full_name` up to date.
///
/// Open issues are updated in place, closed ones are left alone and a new
/// issue is filed instead.
pub async fn reconcile<T>(tracker: &T, repo_full_name: &str, draft: &IssueDraft) -> Result<Outcome>
where
    T: IssueTracker + Sync + ?Sized,
{
    let label_id = tracker.label_id(repo_full_name, LABEL_NAME).await?;
    if label_id.is_none() {
        warn!("Label {LABEL_NAME} not found in {repo_full_name}, issue will be unlabelled");
    }

    let query = search_query(repo_full_name, draft);
    debug!("Searching issues: {query}");
    let existing = tracker.find_issue(&query).await?;

    match (Match::classify(existing.as_ref(), draft), existing) {
        (Match::OpenSame, Some(issue)) => {
            info!("Issue {} is up to date, nothing to do", issue.url);
            Ok(Outcome::Unchanged { url: issue.url })
        }
        (Match::OpenDiffering, Some(issue)) => {
            info!("Updating issue #{} for {}", issue.number, draft.package);
            let url = tracker
                .update_issue(&issue.id, &draft.title, &draft.body, label_id.as_deref())
                .await?;
            Ok(Outcome::Updated { url })
        }
        (found, _) => {
            info!("Creating issue for {} ({:?})", draft.package, found);
            let repository_id = tracker.repository_id(repo_full_name).await?;
            let url = tracker
                .create_issue(&repository_id, &draft.title, &draft.body, label_id.as_deref())
                .await?;
            Ok(Outcome::Created { url })
        }
    }
}
