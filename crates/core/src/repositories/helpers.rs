//! Repository-related utilities.

use crate::{BookingError, BookingResult};
use carebook_uuid::RecordId;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Allocates a fresh record id and creates its sharded directory.
///
/// Guards against pathological id collisions (or pre-existing directories
/// from external interference) by retrying up to 5 times with different ids.
///
/// # Errors
///
/// Returns `BookingError::RecordDirCreation` if directory creation fails or
/// no unique directory could be allocated.
pub(crate) fn create_unique_record_dir(base_dir: &Path) -> BookingResult<(RecordId, PathBuf)> {
    for _attempt in 0..5 {
        let id = RecordId::new();
        let candidate = id.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(BookingError::RecordDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((id, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BookingError::RecordDirCreation(e)),
        }
    }

    Err(BookingError::RecordDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique record directory after 5 attempts",
    )))
}

/// Visits every record leaf directory under a sharded base directory.
///
/// The walk tolerates missing or unreadable intermediate directories (a
/// fresh install has no shards yet) and simply skips them.
pub(crate) fn for_each_record_dir(base_dir: &Path, mut visit: impl FnMut(&Path)) {
    let s1_iter = match fs::read_dir(base_dir) {
        Ok(it) => it,
        Err(_) => return,
    };
    for s1 in s1_iter.flatten() {
        let s1_path = s1.path();
        if !s1_path.is_dir() {
            continue;
        }

        let s2_iter = match fs::read_dir(&s1_path) {
            Ok(it) => it,
            Err(_) => continue,
        };
        for s2 in s2_iter.flatten() {
            let s2_path = s2.path();
            if !s2_path.is_dir() {
                continue;
            }

            let id_iter = match fs::read_dir(&s2_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for id_ent in id_iter.flatten() {
                let id_path = id_ent.path();
                if id_path.is_dir() {
                    visit(&id_path);
                }
            }
        }
    }
}
