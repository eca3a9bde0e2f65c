//! End-to-end pipeline tests against the real `git` binary.
//!
//! Source forge and client host are plain local bare repositories; the
//! pipeline talks to them through filesystem paths exactly as it would
//! through network URLs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;

use relay_core::{Config, PushEvent, Repository};
use relay_policy::PolicyClassifier;
use relay_sync::{sync_repository, GitCli, SyncOutcome};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git command");
    assert!(
        output.status.success(),
        "git {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

struct Fixture {
    root: TempDir,
    source: PathBuf,
    work: PathBuf,
    config: Config,
}

/// A bare source repo, a bare client repo at `<prefix>/demo.git`, and a work
/// clone wired to push to the source.
fn fixture() -> Fixture {
    let root = TempDir::new().expect("tempdir");
    let source = root.path().join("forge").join("demo.git");
    let client_root = root.path().join("client");
    let client = client_root.join("demo.git");
    let work = root.path().join("work");

    fs::create_dir_all(&source).expect("mkdir source");
    fs::create_dir_all(&client).expect("mkdir client");
    fs::create_dir_all(&work).expect("mkdir work");

    git(&source, &["init", "--bare"]);
    git(&client, &["init", "--bare"]);

    git(&work, &["init", "-b", "main"]);
    git(&work, &["config", "user.email", "dev@example.com"]);
    git(&work, &["config", "user.name", "Dev"]);
    git(&work, &["remote", "add", "origin", source.to_str().unwrap()]);

    let config = Config {
        repos_root: root.path().join("mirrors"),
        client_remote_prefix: Some(format!("{}/", client_root.display())),
        openai_api_key: None,
    };

    Fixture {
        root,
        source,
        work,
        config,
    }
}

fn commit_file(work: &Path, name: &str, content: &str, message: &str) -> String {
    fs::write(work.join(name), content).expect("write file");
    git(work, &["add", name]);
    git(work, &["commit", "-m", message]);
    git(work, &["rev-parse", "HEAD"])
}

fn push_event(fixture: &Fixture, before: Option<&str>, after: Option<&str>) -> PushEvent {
    PushEvent {
        ref_name: "refs/heads/main".to_string(),
        before: before.map(str::to_owned),
        after: after.map(str::to_owned),
        repository: Some(Repository {
            name: Some("demo".to_string()),
            clone_url: Some(fixture.source.display().to_string()),
        }),
    }
}

fn client_head(fixture: &Fixture) -> String {
    let client = fixture
        .config
        .client_remote_url("demo")
        .expect("client url");
    git(Path::new(&client), &["rev-parse", "refs/heads/main"])
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clean_push_reaches_the_client() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let fx = fixture();
    let first = commit_file(&fx.work, "lib.rs", "fn a() {}\n", "first");
    let second = commit_file(&fx.work, "lib.rs", "fn a() {}\n// fine comment\n", "second");
    git(&fx.work, &["push", "origin", "main"]);

    let outcome = sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, Some(&first), Some(&second)),
    )
    .await
    .expect("pipeline");

    assert_eq!(outcome, SyncOutcome::Accepted { pushed: true });
    assert_eq!(client_head(&fx), second, "client must hold the pushed head");
}

#[tokio::test]
async fn indonesian_comment_rewinds_the_source_branch() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let fx = fixture();
    let clean = commit_file(&fx.work, "lib.rs", "fn a() {}\n", "clean");
    git(&fx.work, &["push", "origin", "main"]);

    // Propagate the clean state to the client first.
    sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, None, Some(&clean)),
    )
    .await
    .expect("seed pipeline");

    let offending = commit_file(
        &fx.work,
        "lib.rs",
        "fn a() {}\n// untuk testing saja\n",
        "offending",
    );
    git(&fx.work, &["push", "origin", "main"]);

    let outcome = sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, Some(&clean), Some(&offending)),
    )
    .await
    .expect("pipeline");

    assert_eq!(
        outcome,
        SyncOutcome::Rejected {
            branch: Some("main".to_string()),
            reset: true,
        }
    );
    assert_eq!(
        git(&fx.source, &["rev-parse", "refs/heads/main"]),
        clean,
        "source branch must be rewound past the offending commit"
    );
    assert_eq!(
        client_head(&fx),
        clean,
        "the offending commit must never reach the client"
    );
}

#[tokio::test]
async fn empty_source_is_seeded_from_the_client() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let fx = fixture();

    // Give the client history while the source forge stays empty.
    let client = fx.config.client_remote_url("demo").expect("client url");
    let seed_work = fx.root.path().join("seed-work");
    fs::create_dir_all(&seed_work).expect("mkdir seed work");
    git(&seed_work, &["init", "-b", "main"]);
    git(&seed_work, &["config", "user.email", "dev@example.com"]);
    git(&seed_work, &["config", "user.name", "Dev"]);
    let existing = commit_file(&seed_work, "old.rs", "fn old() {}\n", "existing");
    git(&seed_work, &["push", &client, "main"]);

    let outcome = sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, None, None),
    )
    .await
    .expect("pipeline");

    assert_eq!(outcome, SyncOutcome::Accepted { pushed: true });
    assert_eq!(
        git(&fx.source, &["rev-parse", "refs/heads/main"]),
        existing,
        "the empty source must be bootstrapped from the client"
    );
}

#[tokio::test]
async fn mirror_is_reused_across_events() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let fx = fixture();
    let first = commit_file(&fx.work, "lib.rs", "fn a() {}\n", "first");
    git(&fx.work, &["push", "origin", "main"]);

    sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, None, Some(&first)),
    )
    .await
    .expect("first event");

    let mirror = fx.config.repos_root.join("demo");
    assert!(mirror.exists(), "mirror must exist after the first event");
    let marker = mirror.join("relay-marker");
    fs::write(&marker, "x").expect("write marker");

    let second = commit_file(&fx.work, "lib.rs", "fn a() {}\nfn b() {}\n", "second");
    git(&fx.work, &["push", "origin", "main"]);

    sync_repository(
        &fx.config,
        &GitCli::new(),
        &PolicyClassifier::new(None),
        &push_event(&fx, Some(&first), Some(&second)),
    )
    .await
    .expect("second event");

    assert!(
        marker.exists(),
        "a re-clone would have removed the marker file"
    );
    assert_eq!(client_head(&fx), second);
}
