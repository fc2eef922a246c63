//! Versioned record operations with Git-based history.
//!
//! carebook stores booking records as files on disk and versions each record
//! directory using a local Git repository (`git2`/libgit2). Every write goes
//! through this module so that:
//!
//! - multiple files land and are committed together, with rollback when a
//!   freshly allocated record directory cannot be completed;
//! - commit messages use a controlled vocabulary (record domain + action)
//!   and carry structured trailers instead of free prose;
//! - nothing is ever deleted from history; a cancelled appointment is an
//!   update on top of its creation, and the full trail stays auditable.
//!
//! ## Branch policy
//!
//! All record repositories use the default `HEAD` reference created by
//! `git init`; commits are created against `HEAD` directly.
//!
//! ## Commit message format
//!
//! ```text
//! appointment update: Appointment cancelled
//!
//! Clinic: Westway Surgery
//! Submitted-By: u1
//! ```
//!
//! Do not include patient identifiers or clinical detail in the subject
//! line; trailers carry the structured metadata.

use crate::error::{BookingError, BookingResult};
use carebook_types::NonEmptyText;
use std::fmt;
use std::fs;
use std::path::Path;

/// Commit author identity for portal-initiated record writes.
const COMMITTER_NAME: &str = "carebook";
const COMMITTER_EMAIL: &str = "records@carebook.invalid";

/// The record families kept under version control.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum RecordDomain {
    Appointment,
    Patient,
}

impl RecordDomain {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Appointment => "appointment",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for RecordDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controlled vocabulary for record commit actions.
///
/// `Create` marks the first commit of a record directory; `Update` marks
/// every later state change (confirmation, cancellation, demographic
/// correction). Records are never rewritten or deleted, so no further
/// actions exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum CommitAction {
    Create,
    Update,
}

impl CommitAction {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured commit message: subject line plus trailers.
#[derive(Clone, Debug)]
pub(crate) struct RecordCommitMessage {
    domain: RecordDomain,
    action: CommitAction,
    subject: String,
    trailers: Vec<(String, String)>,
}

impl RecordCommitMessage {
    /// Creates a commit message, recording the clinic label as a trailer.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if `subject` is empty or spans
    /// multiple lines.
    pub(crate) fn new(
        domain: RecordDomain,
        action: CommitAction,
        subject: &str,
        clinic: &NonEmptyText,
    ) -> BookingResult<Self> {
        let subject = subject.trim();
        if subject.is_empty() || subject.contains(['\n', '\r']) {
            return Err(BookingError::InvalidInput(
                "commit subject must be a non-empty single line".into(),
            ));
        }

        Ok(Self {
            domain,
            action,
            subject: subject.to_owned(),
            trailers: vec![("Clinic".to_owned(), clinic.as_str().to_owned())],
        })
    }

    /// Appends a trailer line.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if the key contains `:` or
    /// either part is empty or multi-line.
    pub(crate) fn with_trailer(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> BookingResult<Self> {
        let key = key.into().trim().to_string();
        let value = value.into().trim().to_string();

        if key.is_empty()
            || key.contains(['\n', '\r'])
            || key.contains(':')
            || value.is_empty()
            || value.contains(['\n', '\r'])
        {
            return Err(BookingError::InvalidInput(
                "commit trailer key/value must be non-empty and single-line (key cannot contain ':')".into(),
            ));
        }

        self.trailers.push((key, value));
        Ok(self)
    }

    /// Renders the full commit message.
    pub(crate) fn render(&self) -> String {
        let mut message = format!("{} {}: {}\n", self.domain, self.action, self.subject);
        message.push('\n');
        for (key, value) in &self.trailers {
            message.push_str(key);
            message.push_str(": ");
            message.push_str(value);
            message.push('\n');
        }
        message
    }
}

/// A single file to be written as part of an atomic commit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FileToWrite<'a> {
    /// Path relative to the record directory.
    pub relative_path: &'a Path,
    /// Full new content of the file.
    pub content: &'a str,
}

/// High-level versioned write operations on one record directory.
pub(crate) struct VersionedRecordService;

impl VersionedRecordService {
    /// Creates a record directory, writes `files`, initialises a Git
    /// repository and creates the initial commit.
    ///
    /// If anything fails after the directory was created, the partially
    /// created directory is removed again so no unversioned debris is left
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns the underlying `BookingError`; if the cleanup of a partial
    /// directory also fails, `CleanupAfterCreateFailed` carries both errors.
    pub(crate) fn init_and_commit(
        record_dir: &Path,
        message: &RecordCommitMessage,
        files: &[FileToWrite<'_>],
    ) -> BookingResult<()> {
        fs::create_dir_all(record_dir).map_err(BookingError::RecordDirCreation)?;

        match Self::init_and_commit_inner(record_dir, message, files) {
            Ok(()) => Ok(()),
            Err(create_error) => match fs::remove_dir_all(record_dir) {
                Ok(()) => Err(create_error),
                Err(cleanup_error) => Err(BookingError::CleanupAfterCreateFailed {
                    path: record_dir.to_path_buf(),
                    create_error: Box::new(create_error),
                    cleanup_error,
                }),
            },
        }
    }

    fn init_and_commit_inner(
        record_dir: &Path,
        message: &RecordCommitMessage,
        files: &[FileToWrite<'_>],
    ) -> BookingResult<()> {
        Self::write_files(record_dir, files)?;

        let repo = git2::Repository::init(record_dir).map_err(BookingError::GitInit)?;
        let tree_id = Self::stage(&repo, files)?;
        let tree = repo.find_tree(tree_id).map_err(BookingError::GitFindTree)?;
        let sig = Self::signature()?;

        repo.commit(Some("HEAD"), &sig, &sig, &message.render(), &tree, &[])
            .map_err(BookingError::GitCommit)?;

        Ok(())
    }

    /// Writes `files` into an existing record directory and commits them on
    /// top of the current history.
    ///
    /// # Errors
    ///
    /// Returns the underlying `BookingError` if writing, staging or
    /// committing fails.
    pub(crate) fn commit_update(
        record_dir: &Path,
        message: &RecordCommitMessage,
        files: &[FileToWrite<'_>],
    ) -> BookingResult<()> {
        Self::write_files(record_dir, files)?;

        let repo = git2::Repository::open(record_dir).map_err(BookingError::GitOpen)?;
        let tree_id = Self::stage(&repo, files)?;
        let tree = repo.find_tree(tree_id).map_err(BookingError::GitFindTree)?;
        let sig = Self::signature()?;

        let parent = repo
            .head()
            .map_err(BookingError::GitHead)?
            .peel_to_commit()
            .map_err(BookingError::GitHead)?;

        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &message.render(),
            &tree,
            &[&parent],
        )
        .map_err(BookingError::GitCommit)?;

        Ok(())
    }

    fn write_files(record_dir: &Path, files: &[FileToWrite<'_>]) -> BookingResult<()> {
        for file in files {
            let target = record_dir.join(file.relative_path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(BookingError::RecordDirCreation)?;
            }
            fs::write(&target, file.content).map_err(BookingError::FileWrite)?;
        }
        Ok(())
    }

    fn stage(repo: &git2::Repository, files: &[FileToWrite<'_>]) -> BookingResult<git2::Oid> {
        let mut index = repo.index().map_err(BookingError::GitIndex)?;
        for file in files {
            index
                .add_path(file.relative_path)
                .map_err(BookingError::GitAdd)?;
        }
        index.write().map_err(BookingError::GitIndex)?;
        index.write_tree().map_err(BookingError::GitWriteTree)
    }

    fn signature() -> BookingResult<git2::Signature<'static>> {
        git2::Signature::now(COMMITTER_NAME, COMMITTER_EMAIL).map_err(BookingError::GitSignature)
    }
}
