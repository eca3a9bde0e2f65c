//! The git capability: an async command surface over the `git` executable.
//!
//! The pipeline only ever needs the handful of operations in [`GitBackend`].
//! Keeping them behind a trait lets the orchestrator run against a recording
//! fake in tests; [`GitCli`] is the production implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors from running the git executable.
#[derive(Debug, Error)]
pub enum GitError {
    /// The process could not be spawned at all.
    #[error("failed to spawn git {args:?}: {source}")]
    Spawn {
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited non-zero.
    #[error("git {args:?} exited with status {status}: {stderr}")]
    Failed {
        args: Vec<String>,
        status: i32,
        stderr: String,
    },
}

/// Command surface of the version-control executable used by the pipeline.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// `git clone --mirror <url> <dir>`: full-history, ref-complete bare copy.
    async fn clone_mirror(&self, url: &str, dir: &Path) -> Result<(), GitError>;

    /// Configured remotes as `(name, fetch URL)` pairs.
    async fn remotes(&self, dir: &Path) -> Result<Vec<(String, String)>, GitError>;

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitError>;

    async fn set_remote_url(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitError>;

    /// Raw `git ls-remote --heads <remote>` output; empty when the remote
    /// advertises no branches.
    async fn list_remote_heads(&self, dir: &Path, remote: &str) -> Result<String, GitError>;

    async fn fetch(&self, dir: &Path, remote: &str) -> Result<(), GitError>;

    /// `git fetch <remote> '+refs/*:refs/*'`: take over the remote's full
    /// ref set verbatim, regardless of the remote's configured refspec.
    async fn fetch_mirror(&self, dir: &Path, remote: &str) -> Result<(), GitError>;

    /// `git push --mirror <remote>`: replace every ref on the remote.
    async fn push_mirror(&self, dir: &Path, remote: &str) -> Result<(), GitError>;

    /// `git push --force <remote> <refspec>`.
    async fn force_push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<(), GitError>;

    /// Unified diff text for `range` (e.g. `aaa..bbb`).
    async fn diff(&self, dir: &Path, range: &str) -> Result<String, GitError>;
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// [`GitBackend`] that shells out to the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable instead of a `$PATH` lookup.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with `args`, in `dir` when given, capturing stdout.
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);

        let owned: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let output = cmd.output().await.map_err(|source| GitError::Spawn {
            args: owned.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                args: owned,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn clone_mirror(&self, url: &str, dir: &Path) -> Result<(), GitError> {
        let dir = dir.to_string_lossy();
        self.run(None, &["clone", "--mirror", url, &dir]).await?;
        Ok(())
    }

    async fn remotes(&self, dir: &Path) -> Result<Vec<(String, String)>, GitError> {
        let stdout = self.run(Some(dir), &["remote", "-v"]).await?;
        Ok(parse_remotes(&stdout))
    }

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["remote", "add", name, url]).await?;
        Ok(())
    }

    async fn set_remote_url(&self, dir: &Path, name: &str, url: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["remote", "set-url", name, url])
            .await?;
        Ok(())
    }

    async fn list_remote_heads(&self, dir: &Path, remote: &str) -> Result<String, GitError> {
        self.run(Some(dir), &["ls-remote", "--heads", remote]).await
    }

    async fn fetch(&self, dir: &Path, remote: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["fetch", remote]).await?;
        Ok(())
    }

    async fn fetch_mirror(&self, dir: &Path, remote: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["fetch", remote, "+refs/*:refs/*"])
            .await?;
        Ok(())
    }

    async fn push_mirror(&self, dir: &Path, remote: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["push", "--mirror", remote]).await?;
        Ok(())
    }

    async fn force_push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["push", "--force", remote, refspec])
            .await?;
        Ok(())
    }

    async fn diff(&self, dir: &Path, range: &str) -> Result<String, GitError> {
        self.run(Some(dir), &["diff", range]).await
    }
}

/// Parse `git remote -v` output into `(name, fetch URL)` pairs.
fn parse_remotes(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            match parts.next() {
                Some("(fetch)") => Some((name.to_string(), url.to_string())),
                _ => None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recording fake for pipeline tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_remotes_only() {
        let stdout = concat!(
            "origin\thttps://forge.local/acme/demo.git (fetch)\n",
            "origin\thttps://forge.local/acme/demo.git (push)\n",
            "client\thttps://github.com/acme/demo.git (fetch)\n",
            "client\thttps://github.com/acme/demo.git (push)\n",
        );
        assert_eq!(
            parse_remotes(stdout),
            vec![
                (
                    "origin".to_string(),
                    "https://forge.local/acme/demo.git".to_string()
                ),
                (
                    "client".to_string(),
                    "https://github.com/acme/demo.git".to_string()
                ),
            ]
        );
    }

    #[test]
    fn parse_remotes_ignores_garbage_lines() {
        assert!(parse_remotes("").is_empty());
        assert!(parse_remotes("origin\n").is_empty());
    }

    #[tokio::test]
    async fn run_reports_failure_with_stderr() {
        let git = GitCli::new();
        let err = git
            .run(None, &["rev-parse", "--verify", "definitely-not-a-ref"])
            .await
            .expect_err("must fail outside a repository");
        match err {
            GitError::Failed { status, .. } => assert_ne!(status, 0),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_captures_stdout() {
        let git = GitCli::new();
        let out = git.run(None, &["version"]).await.expect("git version");
        assert!(out.starts_with("git version"), "got: {out}");
    }
}
