//! Client record storage.
//!
//! The directory service's system of record. Each client is stored as a single YAML file in a
//! sharded directory derived from the client's UUID:
//!
//! ```text
//! clients/
//!   <s1>/
//!     <s2>/
//!       <uuid>/
//!         client.yaml
//! ```
//!
//! Numeric ids are what the dashboard uses to address clients. They are assigned sequentially
//! on create and recovered on [`ClientService::open`] by scanning the layout and reading the
//! `next_id` high-water mark, which keeps deleted ids retired. The service
//! keeps an in-memory `id -> uuid` index guarded by a mutex. All mutations go through that
//! lock, which makes id assignment race-free within one process.

use crate::config::CoreConfig;
use crate::constants::{CLIENT_FILENAME, NEXT_ID_FILENAME};
use crate::error::{ClientError, ClientResult};
use crate::repositories::helpers::{create_unique_shared_dir, sharded_leaf_dirs};
use crate::validation::{validate_payload, ValidatedClient};
use crate::{ClientPayload, ClientRecord, ShardableUuid};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ClientIndex {
    by_id: BTreeMap<u64, ShardableUuid>,
    next_id: u64,
}

/// Service for creating, reading, updating and deleting client records.
#[derive(Clone, Debug)]
pub struct ClientService {
    cfg: Arc<CoreConfig>,
    index: Arc<Mutex<ClientIndex>>,
}

impl ClientService {
    /// Opens the store, creating the clients directory if needed and indexing existing records.
    ///
    /// Files that cannot be parsed, or whose id duplicates one already indexed, are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::StorageDirCreation` if the clients directory cannot be created.
    pub fn open(cfg: Arc<CoreConfig>) -> ClientResult<Self> {
        let clients_dir = cfg.clients_dir();
        fs::create_dir_all(&clients_dir).map_err(ClientError::StorageDirCreation)?;

        let mut index = Self::scan(&clients_dir);
        if let Some(stored) = read_next_id(&clients_dir) {
            index.next_id = index.next_id.max(stored);
        }
        tracing::info!(
            "indexed {} client records under {}",
            index.by_id.len(),
            clients_dir.display()
        );

        Ok(Self {
            cfg,
            index: Arc::new(Mutex::new(index)),
        })
    }

    fn scan(clients_dir: &Path) -> ClientIndex {
        let mut index = ClientIndex {
            by_id: BTreeMap::new(),
            next_id: 1,
        };

        for dir in sharded_leaf_dirs(clients_dir) {
            let path = dir.join(CLIENT_FILENAME);
            if !path.is_file() {
                continue;
            }

            let record = match read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("failed to parse client file: {} - {}", path.display(), e);
                    continue;
                }
            };

            let uuid = match ShardableUuid::parse(&record.uuid) {
                Ok(uuid) if uuid.sharded_dir(clients_dir) == dir => uuid,
                _ => {
                    tracing::warn!(
                        "client uuid does not match its directory: {}",
                        path.display()
                    );
                    continue;
                }
            };

            if index.by_id.contains_key(&record.id) {
                tracing::warn!(
                    "duplicate client id {} in {}, skipping",
                    record.id,
                    path.display()
                );
                continue;
            }

            index.next_id = index.next_id.max(record.id.saturating_add(1));
            index.by_id.insert(record.id, uuid);
        }

        index
    }

    fn lock(&self) -> ClientResult<MutexGuard<'_, ClientIndex>> {
        self.index.lock().map_err(|_| ClientError::LockPoisoned)
    }

    fn record_path(&self, uuid: &ShardableUuid) -> PathBuf {
        uuid.sharded_dir(&self.cfg.clients_dir())
            .join(CLIENT_FILENAME)
    }

    /// Creates a new client record.
    ///
    /// The service assigns the id, UUID and both timestamps.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` if the payload fails validation, or a storage error
    /// if the record cannot be written. A partially created directory is removed; if that
    /// cleanup fails too, `ClientError::CleanupAfterCreateFailed` carries both errors.
    pub fn create(&self, payload: &ClientPayload) -> ClientResult<ClientRecord> {
        let fields = validate_payload(payload)?;

        let mut index = self.lock()?;
        let clients_dir = self.cfg.clients_dir();
        write_next_id(&clients_dir, index.next_id.saturating_add(1))?;
        let (uuid, client_dir) = create_unique_shared_dir(&clients_dir, ShardableUuid::new)?;

        let now = Utc::now();
        let record = build_record(index.next_id, &uuid, fields, now, now);

        if let Err(create_error) = write_record(&client_dir.join(CLIENT_FILENAME), &record) {
            return Err(match fs::remove_dir_all(&client_dir) {
                Ok(()) => create_error,
                Err(cleanup_error) => ClientError::CleanupAfterCreateFailed {
                    path: client_dir,
                    create_error: Box::new(create_error),
                    cleanup_error,
                },
            });
        }

        index.by_id.insert(record.id, uuid);
        index.next_id = record.id.saturating_add(1);

        tracing::info!("created client {} ({})", record.id, record.uuid);
        Ok(record)
    }

    /// Reads a client record by numeric id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no record has this id.
    pub fn get(&self, id: u64) -> ClientResult<ClientRecord> {
        let index = self.lock()?;
        let uuid = index.by_id.get(&id).ok_or(ClientError::NotFound)?;
        read_record(&self.record_path(uuid))
    }

    /// Reads a client record by its canonical UUID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Uuid` if `uuid` is not canonical, or `ClientError::NotFound` if no
    /// indexed record has it.
    pub fn get_by_uuid(&self, uuid: &str) -> ClientResult<ClientRecord> {
        let uuid = ShardableUuid::parse(uuid)?;
        let index = self.lock()?;
        if !index.by_id.values().any(|known| *known == uuid) {
            return Err(ClientError::NotFound);
        }
        read_record(&self.record_path(&uuid))
    }

    /// Lists client records ordered by id, skipping `skip` and returning at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if an indexed record can no longer be read.
    pub fn list(&self, skip: usize, limit: usize) -> ClientResult<Vec<ClientRecord>> {
        let index = self.lock()?;
        index
            .by_id
            .values()
            .skip(skip)
            .take(limit)
            .map(|uuid| read_record(&self.record_path(uuid)))
            .collect()
    }

    /// Replaces the editable fields of an existing record.
    ///
    /// `id`, `uuid` and `created_at` are preserved; `updated_at` always moves forward.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, `ClientError::InvalidInput` if the
    /// payload fails validation, or a storage error.
    pub fn update(&self, id: u64, payload: &ClientPayload) -> ClientResult<ClientRecord> {
        let index = self.lock()?;
        let uuid = index.by_id.get(&id).ok_or(ClientError::NotFound)?;
        let fields = validate_payload(payload)?;

        let path = self.record_path(uuid);
        let existing = read_record(&path)?;

        let now = Utc::now();
        let updated_at = if now <= existing.updated_at {
            existing.updated_at + Duration::microseconds(1)
        } else {
            now
        };

        let record = build_record(id, uuid, fields, existing.created_at, updated_at);
        write_record(&path, &record)?;

        tracing::info!("updated client {}", id);
        Ok(record)
    }

    /// Deletes a client record and its directory.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or `ClientError::FileDelete`.
    pub fn delete(&self, id: u64) -> ClientResult<()> {
        let mut index = self.lock()?;
        let uuid = index.by_id.get(&id).ok_or(ClientError::NotFound)?;

        let dir = uuid.sharded_dir(&self.cfg.clients_dir());
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ClientError::FileDelete(e)),
        }
        index.by_id.remove(&id);

        tracing::info!("deleted client {}", id);
        Ok(())
    }

    /// Number of indexed client records.
    pub fn count(&self) -> ClientResult<usize> {
        Ok(self.lock()?.by_id.len())
    }
}

fn build_record(
    id: u64,
    uuid: &ShardableUuid,
    fields: ValidatedClient,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> ClientRecord {
    ClientRecord {
        id,
        uuid: uuid.to_string(),
        full_name: fields.full_name.into_string(),
        age: fields.age,
        gender: fields.gender,
        custom_gender: fields.custom_gender,
        background: fields.background,
        created_at,
        updated_at,
    }
}

fn read_record(path: &Path) -> ClientResult<ClientRecord> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ClientError::NotFound,
        _ => ClientError::FileRead(e),
    })?;
    serde_yaml::from_str(&contents).map_err(ClientError::YamlDeserialization)
}

fn write_record(path: &Path, record: &ClientRecord) -> ClientResult<()> {
    let yaml = serde_yaml::to_string(record).map_err(ClientError::YamlSerialization)?;
    fs::write(path, yaml).map_err(ClientError::FileWrite)
}

/// Reads the stored high-water mark. A missing or unreadable file yields `None`, leaving the
/// scanned records as the only source of numbering.
fn read_next_id(clients_dir: &Path) -> Option<u64> {
    let path = clients_dir.join(NEXT_ID_FILENAME);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match contents.trim().parse() {
        Ok(next_id) => Some(next_id),
        Err(e) => {
            tracing::warn!("ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

fn write_next_id(clients_dir: &Path, next_id: u64) -> ClientResult<()> {
    fs::write(clients_dir.join(NEXT_ID_FILENAME), format!("{next_id}\n"))
        .map_err(ClientError::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CLIENTS_DIR_NAME;
    use crate::Gender;
    use tempfile::TempDir;

    fn test_cfg(client_data_dir: &Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(client_data_dir.to_path_buf()).expect("CoreConfig::new should succeed"),
        )
    }

    fn payload(full_name: &str, age: i64, gender: Gender) -> ClientPayload {
        ClientPayload {
            full_name: full_name.into(),
            age,
            gender,
            custom_gender: None,
            background: None,
        }
    }

    #[test]
    fn test_create_writes_sharded_yaml_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).expect("open should succeed");

        let record = service
            .create(&payload("  Jordan Smith ", 34, Gender::Male))
            .expect("create should succeed");

        assert_eq!(record.id, 1);
        assert_eq!(record.full_name, "Jordan Smith");
        assert_eq!(record.created_at, record.updated_at);

        let uuid = ShardableUuid::parse(&record.uuid).expect("uuid should be canonical");
        let path = uuid
            .sharded_dir(&temp_dir.path().join(CLIENTS_DIR_NAME))
            .join(CLIENT_FILENAME);
        assert!(path.is_file(), "client.yaml should exist");

        let stored = read_record(&path).expect("stored record should parse");
        assert_eq!(stored, record);
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();

        let first = service.create(&payload("Alice", 30, Gender::Female)).unwrap();
        let second = service.create(&payload("Bob", 41, Gender::Male)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_ne!(first.uuid, second.uuid);
        assert_eq!(service.count().unwrap(), 2);
    }

    #[test]
    fn test_create_rejects_invalid_payload_and_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();

        let err = service
            .create(&payload("A", 30, Gender::Female))
            .expect_err("short name should be rejected");
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = service
            .create(&payload("Alice", 150, Gender::Female))
            .expect_err("age out of range should be rejected");
        assert!(matches!(err, ClientError::InvalidInput(_)));

        assert!(sharded_leaf_dirs(&temp_dir.path().join(CLIENTS_DIR_NAME)).is_empty());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_reopen_recovers_index_and_numbering() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let service = ClientService::open(cfg.clone()).unwrap();
        service.create(&payload("Alice", 30, Gender::Female)).unwrap();
        let bob = service.create(&payload("Bob", 41, Gender::Male)).unwrap();

        let reopened = ClientService::open(cfg).unwrap();
        assert_eq!(reopened.count().unwrap(), 2);
        assert_eq!(reopened.get(bob.id).unwrap(), bob);

        let carol = reopened.create(&payload("Carol", 52, Gender::Female)).unwrap();
        assert_eq!(carol.id, 3);
    }

    #[test]
    fn test_reopen_skips_invalid_yaml() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let service = ClientService::open(cfg.clone()).unwrap();
        service.create(&payload("Valid", 30, Gender::Female)).unwrap();

        let stray = ShardableUuid::new().sharded_dir(&cfg.clients_dir());
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join(CLIENT_FILENAME), "invalid: yaml: content: [[[").unwrap();

        let reopened = ClientService::open(cfg).unwrap();
        let clients = reopened.list(0, 100).unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].full_name, "Valid");
    }

    #[test]
    fn test_deleted_ids_are_not_reused_after_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let service = ClientService::open(cfg.clone()).unwrap();
        service.create(&payload("Alice", 30, Gender::Female)).unwrap();
        let bob = service.create(&payload("Bob", 41, Gender::Male)).unwrap();
        service.delete(bob.id).unwrap();
        drop(service);

        let reopened = ClientService::open(cfg).unwrap();
        let carol = reopened.create(&payload("Carol", 52, Gender::Female)).unwrap();
        assert_eq!(carol.id, 3);
        assert!(matches!(reopened.get(bob.id), Err(ClientError::NotFound)));
    }

    #[test]
    fn test_reopen_ignores_malformed_next_id_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let service = ClientService::open(cfg.clone()).unwrap();
        service.create(&payload("Alice", 30, Gender::Female)).unwrap();
        fs::write(cfg.clients_dir().join(NEXT_ID_FILENAME), "not a number").unwrap();

        let reopened = ClientService::open(cfg).unwrap();
        let bob = reopened.create(&payload("Bob", 41, Gender::Male)).unwrap();
        assert_eq!(bob.id, 2);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();

        assert!(matches!(service.get(42), Err(ClientError::NotFound)));
    }

    #[test]
    fn test_get_by_uuid() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();
        let record = service.create(&payload("Alice", 30, Gender::Female)).unwrap();

        assert_eq!(service.get_by_uuid(&record.uuid).unwrap(), record);
        assert!(matches!(
            service.get_by_uuid(&ShardableUuid::new().to_string()),
            Err(ClientError::NotFound)
        ));
        assert!(matches!(
            service.get_by_uuid("not-a-uuid"),
            Err(ClientError::Uuid(_))
        ));
    }

    #[test]
    fn test_list_orders_by_id_and_paginates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();
        for name in ["Alice", "Bob", "Carol", "Dan"] {
            service.create(&payload(name, 30, Gender::PreferNotToSay)).unwrap();
        }

        let names: Vec<String> = service
            .list(1, 2)
            .unwrap()
            .into_iter()
            .map(|c| c.full_name)
            .collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
        assert!(service.list(10, 100).unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_fields_and_advances_updated_at() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();

        let mut create = payload("Sam", 29, Gender::Other);
        create.custom_gender = Some("Agender".into());
        create.background = Some("Self-referred.".into());
        let created = service.create(&create).unwrap();

        let updated = service
            .update(created.id, &payload("Sam Lee", 30, Gender::Male))
            .expect("update should succeed");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.full_name, "Sam Lee");
        assert_eq!(updated.custom_gender, None);
        assert_eq!(updated.background, None);

        assert_eq!(service.get(created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_unknown_or_invalid() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();
        let created = service.create(&payload("Alice", 30, Gender::Female)).unwrap();

        assert!(matches!(
            service.update(99, &payload("Alice", 30, Gender::Female)),
            Err(ClientError::NotFound)
        ));
        assert!(matches!(
            service.update(created.id, &payload("", 30, Gender::Female)),
            Err(ClientError::InvalidInput(_))
        ));
        assert_eq!(service.get(created.id).unwrap(), created);
    }

    #[test]
    fn test_delete_removes_record_and_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ClientService::open(test_cfg(temp_dir.path())).unwrap();
        let record = service.create(&payload("Alice", 30, Gender::Female)).unwrap();
        let dir = ShardableUuid::parse(&record.uuid)
            .unwrap()
            .sharded_dir(&temp_dir.path().join(CLIENTS_DIR_NAME));

        service.delete(record.id).expect("delete should succeed");

        assert!(!dir.exists());
        assert!(matches!(service.get(record.id), Err(ClientError::NotFound)));
        assert!(matches!(service.delete(record.id), Err(ClientError::NotFound)));
        assert_eq!(service.count().unwrap(), 0);
    }
}
