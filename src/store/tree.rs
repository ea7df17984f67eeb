use std::collections::BTreeMap;
use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::{Map, Value as Json, json};
use tracing::warn;

use crate::foundation::error::{MetascoreError, MetascoreResult};
use crate::model::capability::{Capability, has_capability};
use crate::model::component::{Component, ComponentId, ComponentType};
use crate::schema::compose::SchemaSet;
use crate::schema::validate::{apply_defaults, validate};

/// The authoritative in-memory graph of component instances.
///
/// Components are indexed by id in insertion order; parent/child relations are
/// resolved through id references, never embedded objects. The editor session
/// is the single writer; player trees are read-only snapshots produced by
/// [`ComponentStore::load`].
///
/// Every mutation is atomic with respect to schema validation: either the
/// whole operation applies and validates, or the store is left unchanged.
#[derive(Debug)]
pub struct ComponentStore {
    components: IndexMap<ComponentId, Component>,
    schemas: SchemaSet,
}

impl ComponentStore {
    /// Create an empty store, composing all type schemas.
    pub fn new() -> MetascoreResult<Self> {
        Ok(Self {
            components: IndexMap::new(),
            schemas: SchemaSet::new()?,
        })
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the store holds no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The composed schemas this store validates against.
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Look up a component by id.
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// All components in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Insert one component from a raw JSON payload.
    ///
    /// The payload is validated against the composed schema for its `type`,
    /// defaults are filled, and an `id` is assigned when absent. A `parent`
    /// key, when present, names an existing container; the new id is appended
    /// to that container's owning reference list.
    pub fn insert(&mut self, data: Json) -> MetascoreResult<&Component> {
        let (component, parent) = self.prepare_insert(data, true)?;
        let id = component.id;

        if let Some(parent_id) = parent {
            let field = self.verify_attach(parent_id, component.kind)?;
            self.components.insert(id, component);
            if let Some(p) = self.components.get_mut(&parent_id) {
                match field {
                    "pages_ids" => p.pages_ids.push(id),
                    _ => p.children_ids.push(id),
                }
            }
        } else {
            self.components.insert(id, component);
        }

        self.components
            .get(&id)
            .ok_or_else(|| MetascoreError::validation("inserted component vanished"))
    }

    /// Insert a batch of payloads with all-or-nothing semantics.
    ///
    /// Later payloads may reference components inserted earlier in the same
    /// batch. On any failure the store is rolled back to its prior state.
    pub fn insert_many(&mut self, items: Vec<Json>) -> MetascoreResult<Vec<ComponentId>> {
        let snapshot = self.components.clone();
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            match self.insert(item) {
                Ok(c) => ids.push(c.id),
                Err(err) => {
                    self.components = snapshot;
                    return Err(err);
                }
            }
        }
        Ok(ids)
    }

    /// Apply a partial update to a component.
    ///
    /// The patch is shallow-merged over the serialized component (a `null`
    /// clears a field), the result is fully re-validated, and reference lists
    /// are re-resolved. For Resizable types the `dimension` components are
    /// rounded to whole pixels on every update, whether or not the patch
    /// touched them. `id` and `type` are immutable.
    pub fn update(&mut self, id: ComponentId, patch: Json) -> MetascoreResult<&Component> {
        let existing = self
            .components
            .get(&id)
            .ok_or_else(|| MetascoreError::validation(format!("unknown component id {id}")))?;
        let kind = existing.kind;

        let patch_obj = patch
            .as_object()
            .ok_or_else(|| MetascoreError::validation("update patch must be an object"))?;

        let mut merged = match serde_json::to_value(existing) {
            Ok(Json::Object(obj)) => obj,
            Ok(_) => return Err(MetascoreError::serde("component did not serialize to an object")),
            Err(e) => return Err(MetascoreError::serde(e.to_string())),
        };
        for (key, value) in patch_obj {
            match key.as_str() {
                "id" | "type" => {
                    if merged.get(key) != Some(value) {
                        return Err(MetascoreError::validation(format!(
                            "field '{key}' is immutable"
                        )));
                    }
                }
                _ => {
                    if value.is_null() {
                        merged.remove(key);
                    } else {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        let schema = self
            .schemas
            .schema(kind)
            .ok_or_else(|| MetascoreError::schema(format!("no composed schema for {kind}")))?;
        apply_defaults(schema, &mut merged);

        if has_capability(kind, Capability::Resizable)
            && let Some(Json::Array(dim)) = merged.get_mut("dimension")
        {
            for elem in dim.iter_mut() {
                if let Some(n) = elem.as_f64() {
                    *elem = json!(n.round());
                }
            }
        }

        validate(schema, &Json::Object(merged.clone()))
            .map_err(|e| MetascoreError::validation(e.to_string()))?;
        let updated: Component = serde_json::from_value(Json::Object(merged))
            .map_err(|e| MetascoreError::serde(e.to_string()))?;
        self.check_references(&updated)?;

        self.components.insert(id, updated);
        self.components
            .get(&id)
            .ok_or_else(|| MetascoreError::validation("updated component vanished"))
    }

    /// Delete a component.
    ///
    /// The owned subtree (through `children_ids`/`pages_ids`) is deleted with
    /// it, and every incoming reference-list entry across the tree is severed.
    /// BlockToggler `block_ids` associations are severed but never cascaded.
    pub fn delete(&mut self, id: ComponentId) -> MetascoreResult<()> {
        if !self.components.contains_key(&id) {
            return Err(MetascoreError::validation(format!(
                "unknown component id {id}"
            )));
        }

        let mut deleted = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !deleted.insert(next) {
                continue;
            }
            let component = self.components.get(&next).ok_or_else(|| {
                MetascoreError::reference(format!(
                    "owned reference to {next} does not resolve during delete cascade"
                ))
            })?;
            stack.extend(component.owned_child_ids().iter().copied());
        }

        for d in &deleted {
            self.components.shift_remove(d);
        }
        for component in self.components.values_mut() {
            component.children_ids.retain(|x| !deleted.contains(x));
            component.pages_ids.retain(|x| !deleted.contains(x));
            component.block_ids.retain(|x| !deleted.contains(x));
        }
        Ok(())
    }

    /// All components of `kind`, in insertion order.
    pub fn components_by_type(&self, kind: ComponentType) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| c.kind == kind)
            .collect()
    }

    /// Resolve a container's owning reference list, in list order.
    pub fn children_of(&self, component: &Component) -> Vec<&Component> {
        component
            .owned_child_ids()
            .iter()
            .filter_map(|id| self.components.get(id))
            .collect()
    }

    /// Resolve a BlockToggler's associated blocks, in list order.
    pub fn toggler_targets(&self, component: &Component) -> Vec<&Component> {
        component
            .block_ids
            .iter()
            .filter_map(|id| self.components.get(id))
            .collect()
    }

    /// Build a store from a flat serialized component array.
    ///
    /// Duplicate ids abort the load. Reference-list entries that do not
    /// resolve to an existing component of an admissible type are dropped
    /// with a warning; everything else round-trips through
    /// [`ComponentStore::to_value`] unchanged.
    pub fn load(data: Json) -> MetascoreResult<Self> {
        let mut store = Self::new()?;
        let items = data
            .as_array()
            .ok_or_else(|| MetascoreError::validation("component document must be an array"))?;

        for item in items {
            let (component, _) = store.prepare_insert(item.clone(), false)?;
            store.components.insert(component.id, component);
        }

        let kinds: BTreeMap<ComponentId, ComponentType> = store
            .components
            .iter()
            .map(|(id, c)| (*id, c.kind))
            .collect();
        for component in store.components.values_mut() {
            let parent_id = component.id;
            let parent_kind = component.kind;
            let allowed = parent_kind.allowed_children();
            let keep_owned = |child: &ComponentId| match kinds.get(child) {
                Some(k) if allowed.contains(k) => true,
                resolved => {
                    warn!(
                        parent = %parent_id,
                        orphan = %child,
                        resolved = resolved.is_some(),
                        "dropping unresolvable reference-list entry on load"
                    );
                    false
                }
            };
            component.children_ids.retain(keep_owned);
            component.pages_ids.retain(keep_owned);
            component.block_ids.retain(|child| match kinds.get(child) {
                Some(ComponentType::Block) => true,
                _ => {
                    warn!(
                        parent = %parent_id,
                        orphan = %child,
                        "dropping unresolvable block association on load"
                    );
                    false
                }
            });
        }

        Ok(store)
    }

    /// Flatten the tree back to a serialized component array, in insertion
    /// order.
    pub fn to_value(&self) -> MetascoreResult<Json> {
        serde_json::to_value(self.components.values().collect::<Vec<_>>())
            .map_err(|e| MetascoreError::serde(e.to_string()))
    }

    fn prepare_insert(
        &self,
        data: Json,
        resolve_refs: bool,
    ) -> MetascoreResult<(Component, Option<ComponentId>)> {
        let mut obj: Map<String, Json> = data
            .as_object()
            .cloned()
            .ok_or_else(|| MetascoreError::validation("component payload must be an object"))?;

        let kind_tag = obj
            .get("type")
            .cloned()
            .ok_or_else(|| MetascoreError::validation("component payload must carry a type"))?;
        let kind: ComponentType = serde_json::from_value(kind_tag)
            .map_err(|_| MetascoreError::validation("unknown component type"))?;

        let parent = match obj.remove("parent") {
            Some(v) => Some(
                serde_json::from_value::<ComponentId>(v)
                    .map_err(|_| MetascoreError::validation("parent must be a component id"))?,
            ),
            None => None,
        };

        let schema = self
            .schemas
            .schema(kind)
            .ok_or_else(|| MetascoreError::schema(format!("no composed schema for {kind}")))?;
        apply_defaults(schema, &mut obj);
        validate(schema, &Json::Object(obj.clone()))
            .map_err(|e| MetascoreError::validation(e.to_string()))?;

        let id = match obj.get("id") {
            Some(v) => serde_json::from_value::<ComponentId>(v.clone())
                .map_err(|_| MetascoreError::validation("id must be a UUID string"))?,
            None => {
                let id = ComponentId::generate();
                obj.insert("id".to_owned(), json!(id));
                id
            }
        };
        if self.components.contains_key(&id) {
            return Err(MetascoreError::duplicate_id(id.to_string()));
        }

        let component: Component = serde_json::from_value(Json::Object(obj))
            .map_err(|e| MetascoreError::serde(e.to_string()))?;

        // Loads defer reference resolution to a second pass; direct inserts
        // resolve immediately.
        if resolve_refs {
            self.check_references(&component)?;
        }
        Ok((component, parent))
    }

    fn check_references(&self, component: &Component) -> MetascoreResult<()> {
        let allowed = component.kind.allowed_children();
        for child in component.owned_child_ids() {
            match self.components.get(child) {
                None => {
                    return Err(MetascoreError::reference(format!(
                        "reference-list entry {child} on {} does not resolve",
                        component.id
                    )));
                }
                Some(c) if !allowed.contains(&c.kind) => {
                    return Err(MetascoreError::reference(format!(
                        "{} cannot hold a child of type {}",
                        component.kind, c.kind
                    )));
                }
                Some(_) => {}
            }
        }
        for block in &component.block_ids {
            match self.components.get(block) {
                Some(c) if c.kind == ComponentType::Block => {}
                Some(c) => {
                    return Err(MetascoreError::reference(format!(
                        "block association {block} resolves to a {}",
                        c.kind
                    )));
                }
                None => {
                    return Err(MetascoreError::reference(format!(
                        "block association {block} on {} does not resolve",
                        component.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn verify_attach(
        &self,
        parent: ComponentId,
        child_kind: ComponentType,
    ) -> MetascoreResult<&'static str> {
        let p = self
            .components
            .get(&parent)
            .ok_or_else(|| MetascoreError::reference(format!("parent {parent} does not resolve")))?;
        let field = p.kind.owned_reference_field().ok_or_else(|| {
            MetascoreError::reference(format!("{} components cannot hold children", p.kind))
        })?;
        if !p.kind.allowed_children().contains(&child_kind) {
            return Err(MetascoreError::reference(format!(
                "{} cannot hold a child of type {child_kind}",
                p.kind
            )));
        }
        Ok(field)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/tree.rs"]
mod tests;
