//! Git-backed index checkouts.

use std::path::Path;

use git2::{Repository, ResetType};
use tracing::{debug, info};

use crate::index::IndexError;

fn sync_error(url: &str, err: git2::Error) -> IndexError {
    IndexError::Sync {
        url: url.to_string(),
        message: err.message().to_string(),
    }
}

/// Check whether a directory already holds a checkout.
pub fn is_checkout(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Clone an index repository into an empty (or missing) directory.
pub fn clone_index(url: &str, dest: &Path) -> Result<(), IndexError> {
    info!("cloning index {} into {}", url, dest.display());

    Repository::clone(url, dest).map_err(|e| sync_error(url, e))?;
    Ok(())
}

/// Fetch the remote and hard-reset the checked-out branch to it.
///
/// Index files are never edited locally, so a hard reset is always safe.
pub fn update_index(url: &str, path: &Path) -> Result<(), IndexError> {
    info!("updating index {}", url);

    let repo = Repository::open(path).map_err(|e| sync_error(url, e))?;

    // The configured index url wins over whatever the checkout was cloned from
    let mut remote = match repo.find_remote("origin") {
        Ok(existing) => {
            if existing.url() != Some(url) {
                debug!("re-pointing origin from {:?} to {}", existing.url(), url);
                repo.remote_set_url("origin", url)
                    .map_err(|e| sync_error(url, e))?;
            }
            repo.find_remote("origin")
        }
        Err(_) => repo.remote("origin", url),
    }
    .map_err(|e| sync_error(url, e))?;
    remote
        .fetch(&["+refs/heads/*:refs/remotes/origin/*"], None, None)
        .map_err(|e| sync_error(url, e))?;

    let head = repo.head().map_err(|e| sync_error(url, e))?;
    let branch = head.shorthand().unwrap_or("main").to_string();
    let tracking = format!("refs/remotes/origin/{}", branch);
    debug!("resetting {} to {}", branch, tracking);

    let target = repo
        .find_reference(&tracking)
        .and_then(|r| r.peel_to_commit())
        .map_err(|e| sync_error(url, e))?;
    repo.reset(target.as_object(), ResetType::Hard, None)
        .map_err(|e| sync_error(url, e))?;

    Ok(())
}
