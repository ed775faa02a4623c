//! List reconciliation by entity identity.
//!
//! A poll returns one page of entities; reconciling it against the cached
//! list merges matching entities, inserts unseen ones, and leaves entities
//! missing from the page alone (the page may be partial).

use super::merge::{merge, Snapshot};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Cached list of entity snapshots
pub type SnapshotList = Arc<Vec<Snapshot>>;

/// Default secondary attribute for composite keys
pub const DEFAULT_SECONDARY_KEY: &str = "service";

/// Identity of an entity inside a list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Id(String),
    Pk(String),
    Composite(String, String),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Id(id) => write!(f, "id:{}", id),
            EntityKey::Pk(pk) => write!(f, "pk:{}", pk),
            EntityKey::Composite(name, secondary) => write!(f, "{}/{}", name, secondary),
        }
    }
}

/// How identity keys are derived: `id`, then `pk`, then `name` plus a
/// secondary attribute
#[derive(Debug, Clone)]
pub struct KeyPolicy {
    secondary: String,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SECONDARY_KEY)
    }
}

impl KeyPolicy {
    pub fn new(secondary: impl Into<String>) -> Self {
        Self {
            secondary: secondary.into(),
        }
    }

    /// Identity of `entity`, or `None` if it carries nothing to key on
    pub fn key_of(&self, entity: &Value) -> Option<EntityKey> {
        if let Some(id) = scalar(entity.get("id")) {
            return Some(EntityKey::Id(id));
        }
        if let Some(pk) = scalar(entity.get("pk")) {
            return Some(EntityKey::Pk(pk));
        }
        let name = scalar(entity.get("name"))?;
        let secondary = scalar(entity.get(&self.secondary)).unwrap_or_default();
        Some(EntityKey::Composite(name, secondary))
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reconcile an incoming page against the cached list.
///
/// Returns `previous` itself when nothing changed and nothing was added.
/// Changed and new entities land at their index in the page; unchanged
/// entities stay where they are. Entities without a key match by equality.
pub fn reconcile(previous: &SnapshotList, incoming: &[Value], policy: &KeyPolicy) -> SnapshotList {
    let mut items: Vec<Snapshot> = previous.as_ref().clone();
    let mut keys: Vec<Option<EntityKey>> = items.iter().map(|e| policy.key_of(e)).collect();
    let mut changed = false;

    for (position, entity) in incoming.iter().enumerate() {
        let key = policy.key_of(entity);
        let found = match &key {
            Some(key) => keys.iter().position(|k| k.as_ref() == Some(key)),
            None => items.iter().position(|e| e.as_ref() == entity),
        };

        match found {
            Some(index) => {
                let merged = merge(&items[index], entity);
                if !Arc::ptr_eq(&merged, &items[index]) {
                    items.remove(index);
                    keys.remove(index);
                    let at = position.min(items.len());
                    keys.insert(at, policy.key_of(&merged));
                    items.insert(at, merged);
                    changed = true;
                }
            }
            None => {
                let at = position.min(items.len());
                items.insert(at, Arc::new(entity.clone()));
                keys.insert(at, key);
                changed = true;
            }
        }
    }

    if changed {
        Arc::new(items)
    } else {
        Arc::clone(previous)
    }
}

/// Reconcile against an optional cached list (first fetch when `None`)
pub fn reconcile_into(
    previous: Option<&SnapshotList>,
    incoming: &[Value],
    policy: &KeyPolicy,
) -> SnapshotList {
    match previous {
        Some(previous) => reconcile(previous, incoming, policy),
        None => reconcile(&Arc::new(Vec::new()), incoming, policy),
    }
}

/// Remove the entity with `key`; returns the list unchanged if absent
pub fn remove(previous: &SnapshotList, key: &EntityKey, policy: &KeyPolicy) -> SnapshotList {
    let before = previous.len();
    let items: Vec<Snapshot> = previous
        .iter()
        .filter(|e| policy.key_of(e).as_ref() != Some(key))
        .cloned()
        .collect();
    if items.len() == before {
        Arc::clone(previous)
    } else {
        Arc::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(values: Vec<Value>) -> SnapshotList {
        Arc::new(values.into_iter().map(Arc::new).collect())
    }

    fn plain(list: &SnapshotList) -> Vec<Value> {
        list.iter().map(|e| e.as_ref().clone()).collect()
    }

    #[test]
    fn key_precedence() {
        let policy = KeyPolicy::default();
        assert_eq!(
            policy.key_of(&json!({"id": 3, "pk": 4, "name": "x"})),
            Some(EntityKey::Id("3".into()))
        );
        assert_eq!(
            policy.key_of(&json!({"id": null, "pk": "p", "name": "x"})),
            Some(EntityKey::Pk("p".into()))
        );
        assert_eq!(
            policy.key_of(&json!({"name": "web", "service": 7})),
            Some(EntityKey::Composite("web".into(), "7".into()))
        );
        assert_eq!(policy.key_of(&json!({"status": "ok"})), None);
    }

    #[test]
    fn numeric_and_string_ids_match() {
        let policy = KeyPolicy::default();
        assert_eq!(policy.key_of(&json!({"id": 5})), policy.key_of(&json!({"id": "5"})));
    }

    #[test]
    fn identical_page_returns_same_list() {
        let previous = list(vec![
            json!({"id": 1, "status": "running"}),
            json!({"id": 2, "status": "stopped"}),
        ]);
        let page = plain(&previous);

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert!(Arc::ptr_eq(&result, &previous));
    }

    #[test]
    fn unchanged_items_keep_identity() {
        let previous = list(vec![
            json!({"id": 1, "status": "running"}),
            json!({"id": 2, "status": "building"}),
        ]);
        let page = vec![
            json!({"id": 1, "status": "running"}),
            json!({"id": 2, "status": "running"}),
        ];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert!(!Arc::ptr_eq(&result, &previous));
        assert!(Arc::ptr_eq(&result[0], &previous[0]));
        assert!(!Arc::ptr_eq(&result[1], &previous[1]));
        assert_eq!(*result[1], json!({"id": 2, "status": "running"}));
    }

    #[test]
    fn changed_items_are_merged_not_replaced() {
        let previous = list(vec![json!({"id": 1, "status": "running", "artifact": "v1.zip"})]);
        let page = vec![json!({"id": 1, "status": "stopped"})];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert_eq!(
            *result[0],
            json!({"id": 1, "status": "stopped", "artifact": "v1.zip"})
        );
    }

    #[test]
    fn new_items_inserted_at_page_position() {
        let previous = list(vec![json!({"id": 1}), json!({"id": 2})]);
        let page = vec![json!({"id": 3}), json!({"id": 1})];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert_eq!(plain(&result), vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn changed_items_move_to_page_position() {
        let previous = list(vec![
            json!({"id": 1, "status": "running"}),
            json!({"id": 2, "status": "running"}),
        ]);
        let page = vec![
            json!({"id": 2, "status": "running"}),
            json!({"id": 1, "status": "stopped"}),
        ];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        let ids: Vec<&Value> = result.iter().map(|e| &e["id"]).collect();
        assert_eq!(ids, vec![&json!(2), &json!(1)]);
        assert_eq!(result[1]["status"], "stopped");
        assert!(Arc::ptr_eq(&result[0], &previous[1]));
    }

    #[test]
    fn reordered_but_unchanged_page_keeps_list() {
        let previous = list(vec![json!({"id": 1}), json!({"id": 2})]);
        let page = vec![json!({"id": 2}), json!({"id": 1})];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert!(Arc::ptr_eq(&result, &previous));
    }

    #[test]
    fn absent_items_are_not_removed() {
        let previous = list(vec![json!({"id": 1}), json!({"id": 2})]);
        let result = reconcile(&previous, &[json!({"id": 2})], &KeyPolicy::default());
        assert!(Arc::ptr_eq(&result, &previous));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn duplicate_keys_in_page_do_not_duplicate() {
        let previous = list(vec![]);
        let page = vec![
            json!({"id": 7, "status": "building"}),
            json!({"id": 7, "status": "running"}),
        ];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert_eq!(plain(&result), vec![json!({"id": 7, "status": "running"})]);
    }

    #[test]
    fn composite_keys_distinguish_secondary() {
        let previous = list(vec![json!({"name": "db", "service": 1, "port": 5432})]);
        let page = vec![
            json!({"name": "db", "service": 1, "port": 5433}),
            json!({"name": "db", "service": 2, "port": 5432}),
        ];

        let result = reconcile(&previous, &page, &KeyPolicy::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0]["port"], 5433);
        assert_eq!(result[1]["service"], 2);
    }

    #[test]
    fn custom_secondary_attribute() {
        let policy = KeyPolicy::new("region");
        assert_eq!(
            policy.key_of(&json!({"name": "edge", "region": "eu"})),
            Some(EntityKey::Composite("edge".into(), "eu".into()))
        );
    }

    #[test]
    fn keyless_entities_match_by_equality() {
        let previous = list(vec![json!({"message": "queued"})]);
        let same = reconcile(&previous, &[json!({"message": "queued"})], &KeyPolicy::default());
        assert!(Arc::ptr_eq(&same, &previous));

        let grown = reconcile(&previous, &[json!({"message": "done"})], &KeyPolicy::default());
        assert_eq!(grown.len(), 2);
    }

    #[test]
    fn first_fetch_builds_list() {
        let result = reconcile_into(None, &[json!({"id": 1})], &KeyPolicy::default());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn explicit_remove() {
        let policy = KeyPolicy::default();
        let previous = list(vec![json!({"id": 1}), json!({"id": 2})]);

        let result = remove(&previous, &EntityKey::Id("1".into()), &policy);
        assert_eq!(plain(&result), vec![json!({"id": 2})]);

        let untouched = remove(&result, &EntityKey::Id("9".into()), &policy);
        assert!(Arc::ptr_eq(&untouched, &result));
    }
}
