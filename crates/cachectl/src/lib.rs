//! Operator commands for inspecting and discarding cached draft reviews.
//!
//! Drafts are kept on disk by [`FileReviewCache`] until they are submitted.
//! When a client crashes for good or a job is reassigned, a stale draft can
//! linger; these commands make it visible and removable without starting a
//! review session.

use jobreview_core::JobId;
use jobreview_store::{CacheError, FileReviewCache, ReviewCache};

pub const USAGE: &str = "usage: jobreview-cachectl <list | show JOB | discard JOB>";

#[derive(Debug, thiserror::Error)]
pub enum CtlError {
    #[error("{0}\n{USAGE}")]
    Usage(String),

    #[error("No cached draft for job {0}")]
    NoDraft(JobId),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Failed to render snapshot: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Show(JobId),
    Discard(JobId),
}

impl Command {
    /// Parse the arguments following the program name.
    pub fn parse<I>(args: I) -> Result<Self, CtlError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut args = args.into_iter();
        let name = args
            .next()
            .ok_or_else(|| CtlError::Usage("missing command".into()))?;

        let command = match name.as_ref() {
            "list" => Self::List,
            "show" => Self::Show(parse_job(args.next())?),
            "discard" => Self::Discard(parse_job(args.next())?),
            other => return Err(CtlError::Usage(format!("unknown command '{other}'"))),
        };

        if let Some(extra) = args.next() {
            return Err(CtlError::Usage(format!(
                "unexpected argument '{}'",
                extra.as_ref()
            )));
        }
        Ok(command)
    }
}

fn parse_job(arg: Option<impl AsRef<str>>) -> Result<JobId, CtlError> {
    let arg = arg.ok_or_else(|| CtlError::Usage("missing JOB".into()))?;
    arg.as_ref()
        .parse()
        .map_err(|_| CtlError::Usage(format!("JOB must be an integer, got '{}'", arg.as_ref())))
}

/// Run `command` against `cache` and return the text to print.
pub async fn execute(cache: &FileReviewCache, command: Command) -> Result<String, CtlError> {
    match command {
        Command::List => list(cache).await,
        Command::Show(job) => {
            let snapshot = cache.snapshot(job).await?.ok_or(CtlError::NoDraft(job))?;
            Ok(serde_json::to_string_pretty(&snapshot)?)
        }
        Command::Discard(job) => {
            if !cache.jobs().await?.contains(&job) {
                return Err(CtlError::NoDraft(job));
            }
            cache.remove(job).await?;
            tracing::info!(job, "Discarded cached draft");
            Ok(format!("Discarded cached draft for job {job}"))
        }
    }
}

async fn list(cache: &FileReviewCache) -> Result<String, CtlError> {
    let mut lines = vec![format!("{:<10} {:>6}  {}", "JOB", "ISSUES", "SAVED AT")];
    for job in cache.jobs().await? {
        match cache.snapshot(job).await {
            Ok(Some(snapshot)) => lines.push(format!(
                "{:<10} {:>6}  {}",
                job,
                snapshot.review.issues().len(),
                snapshot.saved_at.to_rfc3339()
            )),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(job, error = %e, "Skipping unreadable cached draft");
            }
        }
    }
    Ok(lines.join("\n"))
}
