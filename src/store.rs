//! In-memory dataset store keyed by generated uuid tokens.
//!
//! `HashMap` behind `std::sync::RwLock`; `put` (id generation plus insert)
//! is the atomic unit of mutation, so no partial-write state is observable.
//! Datasets live for the life of the process; no update, delete, or expiry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::models::Record;

#[derive(Default)]
pub struct DatasetStore {
    datasets: RwLock<HashMap<String, Arc<Vec<Record>>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record set under a fresh collision-resistant id.
    pub fn put(&self, records: Vec<Record>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut datasets = self.datasets.write().unwrap();
        datasets.insert(id.clone(), Arc::new(records));
        id
    }

    /// Looks up a dataset. `None` for unknown ids; the caller decides
    /// whether that is an empty result or a 404.
    pub fn get(&self, id: &str) -> Option<Arc<Vec<Record>>> {
        self.datasets.read().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.datasets.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
