use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{BackendError, Collection, Document, RecordSource, Removal};
use crate::models::CandidateStatus;
use crate::session::{Role, Session, SessionUser};
use crate::table::Record;

/// In-memory backend for handler tests. Mutations are applied to the stored
/// collections so a refetch observes them.
pub struct StubSource {
    pub user: SessionUser,
    collections: Mutex<HashMap<Collection, Vec<Record>>>,
    documents: Mutex<HashMap<String, Record>>,
    failing: HashSet<Collection>,
    reject_mutations: bool,
    pub status_updates: Mutex<Vec<(String, CandidateStatus)>>,
}

impl StubSource {
    pub fn new(role: Role) -> Self {
        Self {
            user: SessionUser {
                full_name: Some("Test User".to_string()),
                role,
                is_active: true,
            },
            collections: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            reject_mutations: false,
            status_updates: Mutex::new(Vec::new()),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.user.is_active = false;
        self
    }

    pub fn with(self, collection: Collection, values: Vec<Value>) -> Self {
        let records = values
            .into_iter()
            .map(|v| serde_json::from_value(v).expect("stub record must be an object"))
            .collect();
        self.collections
            .lock()
            .expect("stub lock")
            .insert(collection, records);
        self
    }

    pub fn with_document(self, document: Document, value: Value) -> Self {
        let record = serde_json::from_value(value).expect("stub document must be an object");
        self.documents
            .lock()
            .expect("stub lock")
            .insert(document.path(), record);
        self
    }

    pub fn failing(mut self, collection: Collection) -> Self {
        self.failing.insert(collection);
        self
    }

    pub fn rejecting_mutations(mut self) -> Self {
        self.reject_mutations = true;
        self
    }

    fn patch_record<F: Fn(&mut Record)>(&self, collection: Collection, id: &str, patch: F) -> bool {
        let mut collections = self.collections.lock().expect("stub lock");
        let Some(records) = collections.get_mut(&collection) else {
            return false;
        };
        let mut found = false;
        for record in records.iter_mut().filter(|r| r.key().as_deref() == Some(id)) {
            patch(record);
            found = true;
        }
        found
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Api {
        status: 404,
        detail: format!("{what} not found"),
    }
}

#[async_trait]
impl RecordSource for StubSource {
    async fn current_user(&self, _session: &Session) -> Result<SessionUser, BackendError> {
        Ok(self.user.clone())
    }

    async fn list(&self, _session: &Session, collection: Collection) -> Result<Vec<Record>, BackendError> {
        if self.failing.contains(&collection) {
            return Err(BackendError::Api {
                status: 500,
                detail: String::new(),
            });
        }
        Ok(self
            .collections
            .lock()
            .expect("stub lock")
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn document(&self, _session: &Session, document: Document) -> Result<Record, BackendError> {
        self.documents
            .lock()
            .expect("stub lock")
            .get(&document.path())
            .cloned()
            .ok_or_else(|| not_found("Document"))
    }

    async fn update_candidate_status(
        &self,
        _session: &Session,
        id: &str,
        status: CandidateStatus,
    ) -> Result<(), BackendError> {
        if self.reject_mutations {
            return Err(BackendError::Api {
                status: 403,
                detail: "You don't have permission to update this candidate".to_string(),
            });
        }
        let set = |r: &mut Record| r.set("status", Value::from(status.as_str()));
        let company = self.patch_record(Collection::CompanyCandidates, id, set);
        let own = self.patch_record(Collection::RecruiterCandidates, id, set);
        let document = self
            .documents
            .lock()
            .expect("stub lock")
            .get_mut(&Document::Candidate(id.to_string()).path())
            .map(set)
            .is_some();
        if !company && !own && !document {
            return Err(not_found("Candidate"));
        }
        self.status_updates
            .lock()
            .expect("stub lock")
            .push((id.to_string(), status));
        Ok(())
    }

    async fn toggle_user_status(&self, _session: &Session, id: &str) -> Result<bool, BackendError> {
        let found = self.patch_record(Collection::Users, id, |r| {
            let flipped = !r.flag("is_active");
            r.set("is_active", Value::Bool(flipped));
        });
        if !found {
            return Err(not_found("User"));
        }
        let is_active = self
            .collections
            .lock()
            .expect("stub lock")
            .get(&Collection::Users)
            .and_then(|users| users.iter().find(|u| u.key().as_deref() == Some(id)))
            .map(|u| u.flag("is_active"))
            .unwrap_or(false);
        Ok(is_active)
    }

    async fn remove(&self, _session: &Session, removal: Removal) -> Result<(), BackendError> {
        if self.reject_mutations {
            return Err(BackendError::Api {
                status: 403,
                detail: "Only hiring managers or admins can perform this action.".to_string(),
            });
        }
        let (collection, id) = match &removal {
            Removal::Recruiter(id) => (Collection::Recruiters, id),
            Removal::JobRole(id) => (Collection::JobRoles, id),
        };
        let mut collections = self.collections.lock().expect("stub lock");
        let records = collections.entry(collection).or_default();
        let before = records.len();
        records.retain(|r| r.key().as_deref() != Some(id.as_str()));
        if records.len() == before {
            return Err(not_found("Record"));
        }
        Ok(())
    }
}
