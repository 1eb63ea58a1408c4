//! Repository-related utilities.

use crate::{ClientError, ClientResult, ShardableUuid};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a unique sharded directory within `base_dir`.
///
/// UUIDs come from `uuid_source`; a candidate whose directory already exists is skipped. Gives
/// up after 5 attempts.
///
/// # Errors
///
/// Returns `ClientError::ClientDirCreation` if directory creation fails or no unique directory
/// could be allocated.
pub(crate) fn create_unique_shared_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> ShardableUuid,
) -> ClientResult<(ShardableUuid, PathBuf)> {
    for _attempt in 0..5 {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(ClientError::ClientDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ClientError::ClientDirCreation(e)),
        }
    }

    Err(ClientError::ClientDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique client directory after 5 attempts",
    )))
}

/// Walks `<base_dir>/<s1>/<s2>/<uuid>/` and returns every leaf directory.
///
/// Unreadable directories and stray files are skipped.
pub(crate) fn sharded_leaf_dirs(base_dir: &Path) -> Vec<PathBuf> {
    let mut leaves = Vec::new();

    let s1_iter = match fs::read_dir(base_dir) {
        Ok(it) => it,
        Err(_) => return leaves,
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
                    leaves.push(id_path);
                }
            }
        }
    }

    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_unique_shared_dir_skips_existing_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let taken = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let fresh = ShardableUuid::parse("00112233445566778899aabbccddeeff").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp_dir.path())).unwrap();

        let mut candidates = vec![fresh.clone(), taken.clone()];
        let (uuid, dir) = create_unique_shared_dir(temp_dir.path(), || {
            candidates.pop().expect("ran out of candidates")
        })
        .expect("allocation should succeed");

        assert_eq!(uuid, fresh);
        assert!(dir.is_dir());
    }

    #[test]
    fn create_unique_shared_dir_gives_up_after_five_collisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let taken = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp_dir.path())).unwrap();

        let err = create_unique_shared_dir(temp_dir.path(), || taken.clone()).unwrap_err();
        assert!(matches!(err, ClientError::ClientDirCreation(_)));
    }

    #[test]
    fn sharded_leaf_dirs_ignores_stray_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let uuid = ShardableUuid::new();
        fs::create_dir_all(uuid.sharded_dir(temp_dir.path())).unwrap();
        fs::write(temp_dir.path().join("README"), "x").unwrap();

        let leaves = sharded_leaf_dirs(temp_dir.path());
        assert_eq!(leaves, vec![uuid.sharded_dir(temp_dir.path())]);
    }

    #[test]
    fn sharded_leaf_dirs_missing_base_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(sharded_leaf_dirs(&temp_dir.path().join("missing")).is_empty());
    }
}
