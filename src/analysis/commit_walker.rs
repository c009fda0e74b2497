//! Walks a branch's history from its head commit through every parent.
//!
//! Merge commits have several parents, so an ancestor reachable along more
//! than one path is fetched and printed once per path. On heavily merged
//! histories that grows exponentially; `WalkOptions::dedupe` bounds it by
//! visiting each SHA once.

use std::collections::HashSet;
use std::io::Write;
use tokio::time::{sleep, Duration};

use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::models::{Branch, Commit, FileChange, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStyle {
    /// Metadata, stats and files for every commit.
    Detailed,
    /// One line per commit with its depth and path label.
    Short,
}

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub style: WalkStyle,
    /// Pause between commit fetches.
    pub delay: Duration,
    pub dedupe: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            style: WalkStyle::Detailed,
            delay: Duration::from_secs(1),
            dedupe: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub merges: usize,
    pub max_depth: usize,
}

struct Pending {
    sha: String,
    depth: usize,
    path: usize,
}

/// The named branch, or the first branch the API lists.
pub async fn find_branch<A>(api: &A, repo: &Repository, name: Option<&str>) -> Result<Branch>
where
    A: GitHubApi + ?Sized,
{
    match name {
        Some(name) => api.get_branch(repo, name).await,
        None => api
            .get_branches(repo)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::BranchNotFound(format!("{} has no branches", repo.full_name))),
    }
}

pub struct CommitWalker<'a, A: GitHubApi + ?Sized, W: Write> {
    api: &'a A,
    repo: &'a Repository,
    out: W,
    options: WalkOptions,
}

impl<'a, A: GitHubApi + ?Sized, W: Write> CommitWalker<'a, A, W> {
    pub fn new(api: &'a A, repo: &'a Repository, out: W, options: WalkOptions) -> Self {
        Self {
            api,
            repo,
            out,
            options,
        }
    }

    /// Depth-first, pre-order, first parent first.
    pub async fn walk(&mut self, head_sha: &str) -> Result<WalkStats> {
        let mut stats = WalkStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stack = vec![Pending {
            sha: head_sha.to_string(),
            depth: 1,
            path: 0,
        }];

        while let Some(node) = stack.pop() {
            if self.options.dedupe && !seen.insert(node.sha.clone()) {
                continue;
            }

            let commit = self.api.get_commit(self.repo, &node.sha).await?;
            match self.options.style {
                WalkStyle::Detailed => self.write_detailed(&commit)?,
                WalkStyle::Short => self.write_short(&commit, node.depth, node.path)?,
            }

            stats.visited += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            if commit.parents.len() > 1 {
                stats.merges += 1;
            }

            for (index, parent) in commit.parents.iter().enumerate().rev() {
                stack.push(Pending {
                    sha: parent.sha.clone(),
                    depth: node.depth + 1,
                    path: node.path + index,
                });
            }

            if !stack.is_empty() && !self.options.delay.is_zero() {
                sleep(self.options.delay).await;
            }
        }

        tracing::info!(
            "Walked {} commits ({} merges, depth {})",
            stats.visited,
            stats.merges,
            stats.max_depth
        );
        Ok(stats)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_detailed(&mut self, commit: &Commit) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "COMMIT")?;
        writeln!(out, "{}", commit.sha)?;
        writeln!(out, "{}", commit.html_url.as_deref().unwrap_or_default())?;
        match &commit.author {
            Some(author) => writeln!(out, "{}", author.login)?,
            None => writeln!(out, "NO AUTHOR")?,
        }
        if let Some(date) = commit.date() {
            writeln!(out, "{}", date.format("%Y-%m-%d %H:%M:%S"))?;
        }
        writeln!(out, "{}", commit.short_message())?;
        let stats = commit.stats.clone().unwrap_or_default();
        writeln!(out, "{} | +{} | -{}", stats.total, stats.additions, stats.deletions)?;
        writeln!(out)?;

        if commit.files.is_empty() {
            writeln!(out, "No files on commit")?;
            writeln!(out)?;
        }
        for file in &commit.files {
            write_file(out, file)?;
        }
        Ok(())
    }

    fn write_short(&mut self, commit: &Commit, depth: usize, path: usize) -> Result<()> {
        writeln!(
            self.out,
            "{} | depth {:3} | path {} | {}",
            commit.sha,
            depth,
            path_label(path),
            commit.short_message()
        )?;
        Ok(())
    }
}

fn write_file<W: Write>(out: &mut W, file: &FileChange) -> Result<()> {
    writeln!(out, "FILE")?;
    writeln!(out, "{}", file.filename)?;
    if let Some(blob_url) = &file.blob_url {
        writeln!(out, "{}", blob_url)?;
    }
    writeln!(out, "{}", file.status)?;
    writeln!(out, "{} | +{} | -{}", file.changes, file.additions, file.deletions)?;
    writeln!(out)?;
    Ok(())
}

/// `A`..`Z`, then `AA`, `AB`, ...
pub fn path_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
