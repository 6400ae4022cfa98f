//! Version-control access for build id derivation.
//!
//! The generator never looks up "the current repository" on its own; it is
//! handed a [`Vcs`] implementation. [`GitRepo`] is the real one and shells
//! out to the `git` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Read-only view of the repository a build is made from.
pub trait Vcs {
    /// Full hex hash of the checked-out commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vcs`] if the repository has no commits or cannot be
    /// queried.
    fn head_commit(&self) -> Result<String>;

    /// Name of the checked-out branch, or `None` on a detached head.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vcs`] if the repository cannot be queried.
    fn current_branch(&self) -> Result<Option<String>>;

    /// A tag pointing exactly at the checked-out commit, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vcs`] if the repository cannot be queried.
    fn tag_at_head(&self) -> Result<Option<String>>;

    /// Whether tracked files have uncommitted changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vcs`] if the repository cannot be queried.
    fn is_dirty(&self) -> Result<bool>;
}

/// A git working tree rooted at `root`.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository whose working tree contains `start`.
    ///
    /// Walks from `start` towards the filesystem root and stops at the first
    /// directory holding a `.git` entry (a directory, or a file for worktrees
    /// and submodules).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAVcsRepo`] if no ancestor is a repository root.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start;
        loop {
            if current.join(".git").exists() {
                return Ok(Self {
                    root: current.to_path_buf(),
                });
            }
            let Some(parent) = current.parent() else {
                return Err(Error::NotAVcsRepo {
                    path: start.to_path_buf(),
                });
            };
            current = parent;
        }
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `git -C <root> <args>`.
    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::trace!("git {}", args.join(" "));
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| Error::vcs(&args.join(" "), e))
    }

    /// Run git and return trimmed stdout; a non-zero exit is an error.
    fn stdout(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::vcs(&args.join(" "), stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitRepo {
    fn head_commit(&self) -> Result<String> {
        self.stdout(&["rev-parse", "HEAD"])
    }

    fn current_branch(&self) -> Result<Option<String>> {
        // Exits non-zero when HEAD is detached.
        let output = self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((output.status.success() && !branch.is_empty()).then_some(branch))
    }

    fn tag_at_head(&self) -> Result<Option<String>> {
        let tags = self.stdout(&["tag", "--points-at", "HEAD"])?;
        Ok(tags.lines().next().map(str::to_string))
    }

    fn is_dirty(&self) -> Result<bool> {
        let status = self.stdout(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!status.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Repository stand-in with fixed answers.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeRepo {
        pub(crate) commit: String,
        pub(crate) branch: Option<String>,
        pub(crate) tag: Option<String>,
        pub(crate) dirty: bool,
    }

    impl Vcs for FakeRepo {
        fn head_commit(&self) -> Result<String> {
            Ok(self.commit.clone())
        }

        fn current_branch(&self) -> Result<Option<String>> {
            Ok(self.branch.clone())
        }

        fn tag_at_head(&self) -> Result<Option<String>> {
            Ok(self.tag.clone())
        }

        fn is_dirty(&self) -> Result<bool> {
            Ok(self.dirty)
        }
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn run_git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args([
                "-c",
                "user.name=fw-meta",
                "-c",
                "user.email=fw-meta@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn discover_walks_up_to_root() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = GitRepo::discover(&nested).unwrap();
        assert_eq!(repo.root(), tmp.path());
    }

    #[test]
    fn discover_fails_outside_repo() {
        let tmp = tempdir().unwrap();
        // tempdir may itself live under a checkout; only assert when it doesn't.
        if tmp.path().ancestors().any(|p| p.join(".git").exists()) {
            return;
        }
        let err = GitRepo::discover(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::NotAVcsRepo { .. }));
    }

    #[test]
    fn git_repo_queries() {
        if !git_available() {
            return;
        }
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        run_git(dir, &["init", "--quiet"]);
        run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        std::fs::write(dir.join("README"), "hello\n").unwrap();
        run_git(dir, &["add", "README"]);
        run_git(dir, &["commit", "--quiet", "-m", "initial"]);

        let repo = GitRepo::discover(dir).unwrap();
        let commit = repo.head_commit().unwrap();
        assert_eq!(commit.len(), 40);
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("main"));
        assert_eq!(repo.tag_at_head().unwrap(), None);
        assert!(!repo.is_dirty().unwrap());

        // Untracked files do not count as dirty.
        std::fs::write(dir.join("scratch"), "x").unwrap();
        assert!(!repo.is_dirty().unwrap());

        std::fs::write(dir.join("README"), "changed\n").unwrap();
        assert!(repo.is_dirty().unwrap());

        run_git(dir, &["tag", "v1.0"]);
        run_git(dir, &["checkout", "--quiet", "--detach"]);
        assert_eq!(repo.current_branch().unwrap(), None);
        assert_eq!(repo.tag_at_head().unwrap().as_deref(), Some("v1.0"));
    }
}
