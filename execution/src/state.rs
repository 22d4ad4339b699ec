use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::{error, warn};

/// Independently persisted slices of state, one JSON document each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Balances,
    SharedAccounts,
    Market,
    Inventory,
    Buffs,
}

impl Domain {
    pub fn file_name(self) -> &'static str {
        match self {
            Domain::Balances => "balances.json",
            Domain::SharedAccounts => "sharedaccounts.json",
            Domain::Market => "cryptos.json",
            Domain::Inventory => "gifts.json",
            Domain::Buffs => "buffs.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed {domain:?} document: {source}")]
    Malformed {
        domain: Domain,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-document storage. Every write replaces the previous document.
pub trait Store: Send + Sync {
    fn read(&self, domain: Domain) -> Result<Option<Vec<u8>>, StoreError>;
    fn write(&self, domain: Domain, document: &[u8]) -> Result<(), StoreError>;
}

/// One file per domain under a data directory.
pub struct Disk {
    dir: PathBuf,
}

impl Disk {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self, domain: Domain) -> PathBuf {
        self.dir.join(domain.file_name())
    }
}

impl Store for Disk {
    fn read(&self, domain: Domain) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(domain);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&self, domain: Domain, document: &[u8]) -> Result<(), StoreError> {
        // Staged beside the target, then renamed over it.
        let path = self.path(domain);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, document).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// In-process store used by tests and ephemeral runs.
#[derive(Default)]
pub struct Memory {
    documents: Mutex<HashMap<Domain, Vec<u8>>>,
}

impl Store for Memory {
    fn read(&self, domain: Domain) -> Result<Option<Vec<u8>>, StoreError> {
        let documents = self
            .documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(documents.get(&domain).cloned())
    }

    fn write(&self, domain: Domain, document: &[u8]) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents.insert(domain, document.to_vec());
        Ok(())
    }
}

/// Encode as JSON with four-space indentation.
fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Load a domain, falling back to the default when it is missing or unreadable.
pub fn load<T: DeserializeOwned + Default>(store: &dyn Store, domain: Domain) -> T {
    let bytes = match store.read(domain) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(?domain, error = %e, "failed to read state, starting empty");
            return T::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(source) => {
            let e = StoreError::Malformed { domain, source };
            warn!(error = %e, "ignoring unreadable state");
            T::default()
        }
    }
}

/// Overwrite a domain with a full snapshot.
///
/// Failures are logged and reported but never undo the in-memory change.
pub fn save<T: Serialize>(store: &dyn Store, domain: Domain, value: &T) -> bool {
    let document = match encode(value) {
        Ok(document) => document,
        Err(source) => {
            let e = StoreError::Malformed { domain, source };
            error!(error = %e, "failed to encode state");
            return false;
        }
    };
    match store.write(domain, &document) {
        Ok(()) => true,
        Err(e) => {
            error!(?domain, error = %e, "failed to persist state");
            false
        }
    }
}
