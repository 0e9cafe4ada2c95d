//! File-backed employee record store.
//!
//! The whole document (a JSON object keyed by employee id) is read into
//! memory, mutated, and written back on every operation. A process-level
//! mutex serializes each read-modify-write cycle; there is no
//! cross-process file locking, so concurrent writers from separate
//! processes can still race.

mod backend;
mod id;

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use entity::{Department, Employee, EmployeeDraft};
use thiserror::Error;
use tracing::{debug, warn};

pub use backend::{DocumentBackend, FileBackend, MemoryBackend};

/// On-disk shape: employee id -> record. Every key equals its value's
/// `id` field.
type Document = BTreeMap<String, Employee>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee record not found")]
    NotFound,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("record document is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("record document I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record document could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional exact-match criteria for [`EmployeeStore::list`].
#[derive(Clone, Debug, Default)]
pub struct EmployeeFilter {
    pub name: Option<String>,
    pub department: Option<Department>,
}

impl EmployeeFilter {
    fn matches(&self, employee: &Employee) -> bool {
        self.name.as_deref().is_none_or(|name| name == employee.name)
            && self
                .department
                .is_none_or(|department| department == employee.department)
    }
}

/// Pagination window over the filtered sequence. Signed so that negative
/// client input can be rejected rather than silently clamped.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

pub struct EmployeeStore {
    backend: Box<dyn DocumentBackend>,
    lock: Mutex<()>,
}

impl EmployeeStore {
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            lock: Mutex::new(()),
        }
    }

    /// Store backed by a single JSON file at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }

    /// Insert a new record under a freshly generated id and persist the
    /// document. An absent backing file starts an empty document; an
    /// unparsable one is an error, never silently replaced.
    pub fn create(&self, draft: EmployeeDraft) -> StoreResult<Employee> {
        let _guard = self.guard();
        let mut document = self.load_document()?.unwrap_or_default();
        let id = id::fresh_id(|candidate| document.contains_key(candidate));
        let employee = Employee::from_draft(id.clone(), draft);
        document.insert(id.clone(), employee.clone());
        self.persist(&document)?;
        debug!(%id, "employee record created");
        Ok(employee)
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> StoreResult<Employee> {
        let _guard = self.guard();
        let document = self.require_document()?;
        document.get(id).cloned().ok_or(StoreError::NotFound)
    }

    /// Replace every non-id field of an existing record with the draft's
    /// values and persist.
    pub fn update(&self, id: &str, draft: EmployeeDraft) -> StoreResult<Employee> {
        let _guard = self.guard();
        let mut document = self.require_document()?;
        let record = document.get_mut(id).ok_or(StoreError::NotFound)?;
        record.apply(draft);
        let updated = record.clone();
        self.persist(&document)?;
        debug!(%id, "employee record updated");
        Ok(updated)
    }

    /// Remove a record and persist the remaining document.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let mut document = self.require_document()?;
        if document.remove(id).is_none() {
            return Err(StoreError::NotFound);
        }
        self.persist(&document)?;
        debug!(%id, "employee record deleted");
        Ok(())
    }

    /// Filtered, paginated listing in the document's stored key order.
    ///
    /// Negative pagination parameters are rejected before any file I/O.
    /// An empty page — whether because nothing matched or because the
    /// offset runs past the matches — is `NotFound`, not an empty list.
    pub fn list(&self, filter: &EmployeeFilter, page: Page) -> StoreResult<Vec<Employee>> {
        if page.offset < 0 {
            return Err(StoreError::InvalidArgument(
                "Offset cannot be negative".into(),
            ));
        }
        if page.limit < 0 {
            return Err(StoreError::InvalidArgument(
                "Limit cannot be negative".into(),
            ));
        }

        let _guard = self.guard();
        let document = self.require_document()?;
        let selected: Vec<Employee> = document
            .values()
            .filter(|employee| filter.matches(employee))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(selected)
    }

    /// Health probe: the backing document is readable and parsable (or
    /// simply absent).
    pub fn probe(&self) -> StoreResult<()> {
        let _guard = self.guard();
        self.load_document().map(|_| ())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Explicit load distinguishing an absent document (`None`) from a
    /// corrupt one (`Err(Corrupt)`).
    fn load_document(&self) -> StoreResult<Option<Document>> {
        let Some(contents) = self.backend.load()? else {
            return Ok(None);
        };
        match serde_json::from_str(&contents) {
            Ok(document) => Ok(Some(document)),
            Err(err) => Err(StoreError::Corrupt(err)),
        }
    }

    /// Load for read paths: absent and corrupt documents both surface as
    /// `NotFound`, matching the service contract.
    fn require_document(&self) -> StoreResult<Document> {
        match self.load_document() {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Err(StoreError::NotFound),
            Err(StoreError::Corrupt(err)) => {
                warn!(error = %err, "record document is unparsable; reporting not-found");
                Err(StoreError::NotFound)
            }
            Err(err) => Err(err),
        }
    }

    fn persist(&self, document: &Document) -> StoreResult<()> {
        let contents =
            serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;
        self.backend.save(&contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, department: Department) -> EmployeeDraft {
        EmployeeDraft {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            contact: 9_998_887_776,
            department,
        }
    }

    fn memory_store() -> EmployeeStore {
        EmployeeStore::new(MemoryBackend::new())
    }

    #[test]
    fn create_assigns_short_alphanumeric_id() {
        let store = memory_store();
        let employee = store.create(draft("Ada", Department::Development)).unwrap();
        assert!((4..=7).contains(&employee.id.len()));
        assert!(employee.id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn created_record_can_be_read_back() {
        let store = memory_store();
        let created = store.create(draft("Ada", Department::Development)).unwrap();
        let fetched = store.get(&created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_on_missing_id_is_not_found() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        assert!(matches!(store.get("zzzz"), Err(StoreError::NotFound)));
    }

    #[test]
    fn get_before_first_write_is_not_found() {
        let store = memory_store();
        assert!(matches!(store.get("any"), Err(StoreError::NotFound)));
    }

    #[test]
    fn update_preserves_id_and_replaces_fields() {
        let store = memory_store();
        let created = store.create(draft("Ada", Department::Development)).unwrap();
        let updated = store
            .update(&created.id, draft("Grace", Department::Testing))
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.department, Department::Testing);
        assert_eq!(store.get(&created.id).unwrap(), updated);
    }

    #[test]
    fn update_on_missing_id_is_not_found() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        assert!(matches!(
            store.update("zzzz", draft("Grace", Department::Testing)),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_removes_the_record() {
        let store = memory_store();
        let created = store.create(draft("Ada", Department::Development)).unwrap();
        store.delete(&created.id).unwrap();
        assert!(matches!(store.get(&created.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn delete_on_missing_id_is_not_found() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        assert!(matches!(store.delete("zzzz"), Err(StoreError::NotFound)));
    }

    #[test]
    fn list_defaults_return_at_most_ten_records() {
        let store = memory_store();
        for i in 0..12 {
            store
                .create(draft(&format!("Emp{i}"), Department::Support))
                .unwrap();
        }
        let listed = store
            .list(&EmployeeFilter::default(), Page::default())
            .unwrap();
        assert_eq!(listed.len(), 10);
    }

    #[test]
    fn list_filters_by_exact_name() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        store.create(draft("Adam", Department::Development)).unwrap();
        let filter = EmployeeFilter {
            name: Some("Ada".into()),
            department: None,
        };
        let listed = store.list(&filter, Page::default()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ada");
    }

    #[test]
    fn list_filters_by_department() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        store.create(draft("Bea", Department::Finance)).unwrap();
        store.create(draft("Cal", Department::Development)).unwrap();
        let filter = EmployeeFilter {
            name: None,
            department: Some(Department::Development),
        };
        let listed = store.list(&filter, Page::default()).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(
            listed
                .iter()
                .all(|e| e.department == Department::Development)
        );
    }

    #[test]
    fn list_pagination_slices_the_filtered_sequence() {
        let store = memory_store();
        for i in 0..5 {
            store
                .create(draft(&format!("Emp{i}"), Department::Support))
                .unwrap();
        }
        let all = store
            .list(&EmployeeFilter::default(), Page { offset: 0, limit: 10 })
            .unwrap();
        let page = store
            .list(&EmployeeFilter::default(), Page { offset: 2, limit: 2 })
            .unwrap();
        assert_eq!(page, all[2..4].to_vec());
    }

    #[test]
    fn list_offset_past_the_end_is_not_found() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        assert!(matches!(
            store.list(
                &EmployeeFilter::default(),
                Page {
                    offset: 5,
                    limit: 10
                }
            ),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn list_with_no_matches_is_not_found() {
        let store = memory_store();
        store.create(draft("Ada", Department::Development)).unwrap();
        let filter = EmployeeFilter {
            name: Some("Nobody".into()),
            department: None,
        };
        assert!(matches!(
            store.list(&filter, Page::default()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn list_rejects_negative_pagination_without_touching_the_backend() {
        struct PanicBackend;
        impl DocumentBackend for PanicBackend {
            fn load(&self) -> std::io::Result<Option<String>> {
                panic!("load must not be called");
            }
            fn save(&self, _contents: &str) -> std::io::Result<()> {
                panic!("save must not be called");
            }
        }
        let store = EmployeeStore::new(PanicBackend);
        assert!(matches!(
            store.list(
                &EmployeeFilter::default(),
                Page {
                    offset: -1,
                    limit: 10
                }
            ),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.list(
                &EmployeeFilter::default(),
                Page {
                    offset: 0,
                    limit: -1
                }
            ),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reads_on_corrupt_document_are_not_found() {
        let store = EmployeeStore::new(MemoryBackend::with_contents("{not json"));
        assert!(matches!(store.get("any"), Err(StoreError::NotFound)));
        assert!(matches!(
            store.list(&EmployeeFilter::default(), Page::default()),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete("any"), Err(StoreError::NotFound)));
    }

    #[test]
    fn create_on_corrupt_document_fails_without_overwriting() {
        let backend = MemoryBackend::with_contents("{not json");
        let store = EmployeeStore::new(backend);
        assert!(matches!(
            store.create(draft("Ada", Department::Development)),
            Err(StoreError::Corrupt(_))
        ));
        // The unparsable contents must survive the failed create.
        assert!(matches!(store.probe(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn file_backed_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let created = {
            let store = EmployeeStore::at_path(&path);
            store.create(draft("Ada", Department::Development)).unwrap()
        };
        let reopened = EmployeeStore::at_path(&path);
        assert_eq!(reopened.get(&created.id).unwrap(), created);
    }

    #[test]
    fn document_keys_match_record_ids_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = EmployeeStore::at_path(&path);
        let a = store.create(draft("Ada", Department::Development)).unwrap();
        let b = store.create(draft("Bea", Department::Finance)).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for employee in [a, b] {
            assert_eq!(document[&employee.id]["id"], employee.id.as_str());
        }
    }

    #[test]
    fn probe_is_ok_for_absent_document() {
        assert!(memory_store().probe().is_ok());
    }
}
