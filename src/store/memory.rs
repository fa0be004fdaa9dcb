use super::{RoomStore, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// In-process store with realtime-database semantics: writing `null` deletes,
/// and objects left empty by a delete disappear. Objects keep insertion order.
#[derive(Debug)]
pub struct MemoryStore {
    root: RwLock<Value>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Copy of the whole tree
    pub async fn dump(&self) -> Value {
        self.root.read().await.clone()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn lookup<'a>(node: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(node, |current, segment| current.as_object()?.get(*segment))
}

fn set_path(node: &mut Value, segments: &[&str], value: Value) {
    match segments.split_first() {
        None => *node = value,
        Some((first, rest)) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(map) = node {
                let child = map.entry(first.to_string()).or_insert(Value::Null);
                set_path(child, rest, value);
            }
        }
    }
}

fn remove_path(node: &mut Value, segments: &[&str]) {
    let Some((first, rest)) = segments.split_first() else {
        *node = Value::Object(Map::new());
        return;
    };
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        map.shift_remove(*first);
    } else if let Some(child) = map.get_mut(*first) {
        remove_path(child, rest);
        if child.as_object().is_some_and(Map::is_empty) {
            map.shift_remove(*first);
        }
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let root = self.root.read().await;
        let value = lookup(&root, &segments(path))
            .filter(|v| !v.is_null() && !v.as_object().is_some_and(Map::is_empty))
            .cloned();
        Ok(value)
    }

    async fn set(&self, path: &str, value: Value) -> StoreResult<()> {
        if value.is_null() {
            return self.delete(path).await;
        }
        let mut root = self.root.write().await;
        set_path(&mut root, &segments(path), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let mut root = self.root.write().await;
        remove_path(&mut root, &segments(path));
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
