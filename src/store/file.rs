//! File-backed store backend
//!
//! Layout under the store root:
//!
//! ```text
//! deliverables/<id>.json
//! administrators/<username>.json
//! ```
//!
//! Every write goes to a temp file first and is renamed into place, so a
//! reader never sees a half-written record.

use crate::error::{VaultError, VaultResult};
use crate::store::{
    Administrator, Content, Deliverable, DeliverableId, DeliverableUpdate, FlagFilter,
    PersistentStore, Role,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Store keeping one JSON document per record
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> VaultResult<Self> {
        let root = root.into();
        for dir in [root.join("deliverables"), root.join("administrators")] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                VaultError::io(format!("creating store directory {}", dir.display()), e)
            })?;
        }

        // Credential hashes live here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(root.join("administrators"), perms)
                .map_err(|e| VaultError::io("setting administrators dir permissions", e))?;
        }

        debug!("Opened file store at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn deliverable_path(&self, id: DeliverableId) -> PathBuf {
        self.root.join("deliverables").join(format!("{}.json", id))
    }

    fn administrator_path(&self, username: &str) -> VaultResult<PathBuf> {
        validate_username(username)?;
        Ok(self
            .root
            .join("administrators")
            .join(format!("{}.json", username)))
    }

    async fn load_all(&self) -> VaultResult<Vec<Deliverable>> {
        let dir = self.root.join("deliverables");
        let mut records = vec![];
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| VaultError::io("reading deliverables directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| VaultError::io("reading deliverable entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(record) = read_json::<Deliverable>(&path).await? {
                    records.push(record);
                }
            }
        }

        records.sort_by_key(|d| d.id);
        Ok(records)
    }
}

#[async_trait]
impl PersistentStore for JsonFileStore {
    async fn get_deliverable(&self, id: DeliverableId) -> VaultResult<Option<Deliverable>> {
        read_json(&self.deliverable_path(id)).await
    }

    async fn get_deliverables(&self, ids: &[DeliverableId]) -> VaultResult<Vec<Deliverable>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_deliverable(*id).await {
                Ok(Some(record)) => found.push(record),
                Ok(None) => {}
                // One unreadable record must not hide the rest of the batch
                Err(e) => warn!("Skipping deliverable {} in batch read: {}", id, e),
            }
        }
        Ok(found)
    }

    async fn update_deliverable(
        &self,
        id: DeliverableId,
        update: &DeliverableUpdate,
    ) -> VaultResult<Deliverable> {
        let _guard = self.write_lock.lock().await;
        let path = self.deliverable_path(id);
        let mut record = read_json::<Deliverable>(&path)
            .await?
            .ok_or(VaultError::NotFound(id))?;

        record.apply(update);
        write_json_atomic(&path, &record).await?;
        Ok(record)
    }

    async fn find_by_flags(&self, filter: &FlagFilter) -> VaultResult<Vec<Deliverable>> {
        let records = self.load_all().await?;
        Ok(records.into_iter().filter(|d| filter.matches(d)).collect())
    }

    async fn insert_deliverable(&self, name: &str, content: Content) -> VaultResult<Deliverable> {
        let _guard = self.write_lock.lock().await;
        let next = self
            .load_all()
            .await?
            .last()
            .map_or(1, |d| d.id.0 + 1);

        let record = Deliverable::new(DeliverableId(next), name, content);
        write_json_atomic(&self.deliverable_path(record.id), &record).await?;
        debug!("Inserted deliverable {} ({})", record.id, record.name);
        Ok(record)
    }

    async fn get_administrator(&self, username: &str) -> VaultResult<Option<Administrator>> {
        // A name that could never have been stored is simply absent
        let Ok(path) = self.administrator_path(username) else {
            return Ok(None);
        };
        let admin = read_json::<Administrator>(&path).await?;
        Ok(admin.filter(|a| a.role == Role::Admin))
    }

    async fn put_administrator(&self, admin: &Administrator) -> VaultResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.administrator_path(&admin.username)?;
        write_json_atomic(&path, admin).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms)
                .map_err(|e| VaultError::io("setting administrator file permissions", e))?;
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}

/// Usernames become file names, so keep them to a safe alphabet
fn validate_username(username: &str) -> VaultResult<()> {
    let valid = !username.is_empty()
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(VaultError::User(format!("invalid username: {:?}", username)));
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> VaultResult<Option<T>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(VaultError::io(format!("reading {}", path.display()), e));
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| VaultError::Store(format!("corrupt record {}: {}", path.display(), e)))
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> VaultResult<()> {
    let content = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|e| VaultError::io(format!("creating {}", tmp.display()), e))?;
    file.write_all(&content)
        .await
        .map_err(|e| VaultError::io(format!("writing {}", tmp.display()), e))?;
    file.sync_all()
        .await
        .map_err(|e| VaultError::io(format!("syncing {}", tmp.display()), e))?;
    drop(file);

    fs::rename(&tmp, path)
        .await
        .map_err(|e| VaultError::io(format!("renaming into {}", path.display()), e))
}
