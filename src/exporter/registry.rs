use std::collections::HashMap;

use super::types::MaterialRecord;

/// Materials exported during one pass, keyed by exported name, in export order.
#[derive(Debug, Default, Clone)]
pub struct MaterialRegistry {
    entries: Vec<Entry>,
    index_by_name: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct Entry {
    /// Host material the record came from; `None` for built-in records.
    host_name: Option<String>,
    record: MaterialRecord,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_by_name.contains_key(name)
    }

    /// Host material registered under `name`, if it came from the host.
    pub fn host_name(&self, name: &str) -> Option<&str> {
        self.index_by_name
            .get(name)
            .and_then(|&i| self.entries[i].host_name.as_deref())
    }

    /// Register `record` under `name`. Returns `false`, leaving the registry
    /// untouched, when the name is already present.
    pub fn register(
        &mut self,
        name: &str,
        host_name: Option<&str>,
        record: MaterialRecord,
    ) -> bool {
        if self.contains(name) {
            return false;
        }
        self.index_by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(Entry {
            host_name: host_name.map(str::to_string),
            record,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in registration order.
    pub fn into_records(self) -> Vec<MaterialRecord> {
        self.entries.into_iter().map(|e| e.record).collect()
    }
}
