//! An in-process document store with the hosted backend's observable
//! semantics.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{DocumentStore, StoreError};

/// A document tree held in memory.
///
/// Stands in for [super::RestStore] in tests and local runs. It mirrors the
/// hosted store's behavior: intermediate collections spring into existence on
/// write, and a collection that loses its last child ceases to exist, so
/// reading it yields `None` rather than an empty object.
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Mutex<Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut node = root;

    for segment in segments {
        node = node.as_object()?.get(*segment)?;
    }

    Some(node)
}

fn insert(root: &mut Value, segments: &[&str], value: Value) {
    let [first, rest @ ..] = segments else {
        *root = value;
        return;
    };

    if !root.is_object() {
        *root = Value::Object(Map::new());
    }

    let map = root.as_object_mut().expect("node was just made an object");
    let child = map.entry(first.to_string()).or_insert(Value::Null);

    insert(child, rest, value);
}

fn remove(root: &mut Value, segments: &[&str]) {
    let [first, rest @ ..] = segments else {
        *root = Value::Null;
        return;
    };

    let Some(map) = root.as_object_mut() else {
        return;
    };

    if rest.is_empty() {
        map.remove(*first);
        return;
    }

    if let Some(child) = map.get_mut(*first) {
        remove(child, rest);

        // Collections with no children do not exist.
        if child.as_object().is_some_and(Map::is_empty) {
            map.remove(*first);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.lock().unwrap();

        Ok(lookup(&root, &segments(path)).cloned())
    }

    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        let mut root = self.root.lock().unwrap();

        insert(&mut root, &segments(path), value.clone());

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let mut root = self.root.lock().unwrap();

        remove(&mut root, &segments(path));

        Ok(())
    }

    async fn push(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        let id = format!("-{}", Uuid::new_v4().simple());
        let mut root = self.root.lock().unwrap();
        let mut segments = segments(path);
        segments.push(&id);

        insert(&mut root, &segments, value.clone());

        Ok(id)
    }
}
