//! Label storage contract.
//!
//! Labels are owned by the host: one optional string per (object, policy).
//! The anon crates only read and write them through [`LabelStore`].

use anon_core::{ObjectKind, ObjectRef, PolicyName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Access to persisted security labels.
pub trait LabelStore: Send + Sync {
    /// The label attached to `object` under `policy`, if any.
    fn get_label(&self, object: &ObjectRef, policy: &PolicyName) -> Option<String>;

    /// Attach `label` to `object` under `policy`. `None` removes the label.
    fn put_label(&self, object: &ObjectRef, policy: &PolicyName, label: Option<&str>);
}

impl<S: LabelStore + ?Sized> LabelStore for &S {
    fn get_label(&self, object: &ObjectRef, policy: &PolicyName) -> Option<String> {
        (**self).get_label(object, policy)
    }

    fn put_label(&self, object: &ObjectRef, policy: &PolicyName, label: Option<&str>) {
        (**self).put_label(object, policy, label)
    }
}

/// One stored label, as written to label files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub policy: PolicyName,
    pub kind: ObjectKind,
    pub object_id: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sub_object_id: i32,
    pub label: String,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl LabelEntry {
    pub fn object(&self) -> ObjectRef {
        ObjectRef::new(self.kind, self.object_id, self.sub_object_id)
    }
}

type LabelKey = (ObjectRef, PolicyName);

fn key(object: &ObjectRef, policy: &PolicyName) -> LabelKey {
    (object.canonical(), policy.clone())
}

/// Label store kept in memory.
///
/// Objects are keyed by their canonical address, so both spellings of a
/// column share one label.
#[derive(Debug, Default)]
pub struct InMemoryLabelStore {
    labels: RwLock<BTreeMap<LabelKey, String>>,
}

impl InMemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from label entries. Later entries replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = LabelEntry>) -> Self {
        let labels = entries
            .into_iter()
            .map(|entry| (key(&entry.object(), &entry.policy), entry.label))
            .collect();
        Self {
            labels: RwLock::new(labels),
        }
    }

    /// Every stored label, ordered by object then policy.
    pub fn entries(&self) -> Vec<LabelEntry> {
        let labels = self.labels.read().unwrap_or_else(|e| e.into_inner());
        labels
            .iter()
            .map(|((object, policy), label)| LabelEntry {
                policy: policy.clone(),
                kind: object.kind,
                object_id: object.object_id,
                sub_object_id: object.sub_object_id,
                label: label.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.labels.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LabelStore for InMemoryLabelStore {
    fn get_label(&self, object: &ObjectRef, policy: &PolicyName) -> Option<String> {
        let labels = self.labels.read().unwrap_or_else(|e| e.into_inner());
        labels.get(&key(object, policy)).cloned()
    }

    fn put_label(&self, object: &ObjectRef, policy: &PolicyName, label: Option<&str>) {
        let mut labels = self.labels.write().unwrap_or_else(|e| e.into_inner());
        let key = key(object, policy);
        match label {
            Some(label) => {
                labels.insert(key, label.to_string());
            }
            None => {
                labels.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(name: &str) -> PolicyName {
        PolicyName::new(name).unwrap()
    }

    #[test]
    fn labels_are_scoped_by_policy() {
        let store = InMemoryLabelStore::new();
        let role = ObjectRef::role(42);
        store.put_label(&role, &policy("anon"), Some("MASKED"));

        assert_eq!(store.get_label(&role, &policy("anon")).as_deref(), Some("MASKED"));
        assert_eq!(store.get_label(&role, &policy("gdpr")), None);
    }

    #[test]
    fn none_removes_the_label() {
        let store = InMemoryLabelStore::new();
        let role = ObjectRef::role(42);
        store.put_label(&role, &policy("anon"), Some("MASKED"));
        store.put_label(&role, &policy("anon"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn columns_do_not_collide_with_their_table() {
        let store = InMemoryLabelStore::new();
        store.put_label(&ObjectRef::table(7), &policy("anon"), Some("TABLESAMPLE SYSTEM(1)"));
        assert_eq!(store.get_label(&ObjectRef::column(7, 1), &policy("anon")), None);
    }

    #[test]
    fn both_column_spellings_share_a_label() {
        let store = InMemoryLabelStore::new();
        let via_table = ObjectRef::column(16402, 3);
        let via_column = ObjectRef {
            kind: ObjectKind::Column,
            object_id: 16402,
            sub_object_id: 3,
        };
        store.put_label(&via_table, &policy("anon"), Some("MASKED WITH VALUE NULL"));
        store.put_label(&via_column, &policy("anon"), Some("QUASI IDENTIFIER"));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get_label(&via_table, &policy("anon")).as_deref(),
            Some("QUASI IDENTIFIER")
        );

        store.put_label(&via_column, &policy("anon"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn column_entries_load_under_the_table() {
        let store = InMemoryLabelStore::from_entries([LabelEntry {
            policy: policy("anon"),
            kind: ObjectKind::Column,
            object_id: 16402,
            sub_object_id: 3,
            label: "QUASI IDENTIFIER".to_string(),
        }]);
        assert_eq!(store.entries()[0].kind, ObjectKind::Table);
        assert!(store.get_label(&ObjectRef::column(16402, 3), &policy("anon")).is_some());
    }

    #[test]
    fn entries_round_trip_through_yaml() {
        let store = InMemoryLabelStore::new();
        store.put_label(&ObjectRef::column(7, 2), &policy("anon"), Some("MASKED WITH VALUE NULL"));
        store.put_label(&ObjectRef::role(42), &policy("anon"), Some("MASKED"));

        let yaml = serde_yaml::to_string(&store.entries()).unwrap();
        let entries: Vec<LabelEntry> = serde_yaml::from_str(&yaml).unwrap();
        let reloaded = InMemoryLabelStore::from_entries(entries);

        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(
            reloaded.get_label(&ObjectRef::column(7, 2), &policy("anon")).as_deref(),
            Some("MASKED WITH VALUE NULL")
        );
    }
}
