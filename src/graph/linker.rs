use crate::properties::{Entity, EntityMap, Relation, RelationDirection};

/// The entity records of one parse, addressed by canonical name.
///
/// Records are created on first reference (as a declaration or as a relation target) and then
/// filled in place, so creation order never matters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGraph {
    entities: EntityMap,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the record for `name`, creating a placeholder if absent.
    pub fn upsert(&mut self, name: &str) -> &mut Entity {
        self.entities
            .entry(name.to_string())
            .or_insert_with(|| Entity::placeholder(name))
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn into_entities(self) -> EntityMap {
        self.entities
    }

    /// Record a hierarchical relation declared by `from` at `position`.
    ///
    /// With [RelationDirection::Child] `from` becomes a child of `to`, with
    /// [RelationDirection::Parent] its parent. Both ends are created if missing. Each side gains
    /// the other only if no entry with that name exists yet; existing positions are kept.
    pub fn link(&mut self, from: &str, direction: RelationDirection, to: &str, position: usize) {
        if from.is_empty() || to.is_empty() {
            return;
        }
        let (child, parent) = match direction {
            RelationDirection::Child => (from, to),
            RelationDirection::Parent => (to, from),
        };
        tracing::trace!("[EntityGraph::link] {child} -> {parent} at {position}");

        let child_record = self.upsert(child);
        if !child_record.has_parent(parent) {
            child_record.parents.push(Relation {
                name: parent.to_string(),
                position,
            });
        }
        let parent_record = self.upsert(parent);
        if !parent_record.has_child(child) {
            parent_record.children.push(Relation {
                name: child.to_string(),
                position,
            });
        }
    }
}

impl From<EntityGraph> for EntityMap {
    fn from(graph: EntityGraph) -> Self {
        graph.into_entities()
    }
}
