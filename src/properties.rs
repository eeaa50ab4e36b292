/// [crate::properties] contains the data model produced by a parse: [Entity] records keyed by
/// canonical name, their occurrences and relations, and the document outline.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use crate::error::MuseTagError;

/// The entity graph: canonical name to [Entity].
pub type EntityMap = BTreeMap<String, Entity>;

/// Turn a source token into a canonical entity name (underscores become spaces).
pub fn canonical_name(raw: &str) -> String {
    raw.replace('_', " ")
}

/// What an entity is. The four fixed markers plus `Temporal` are built in, anything set through
/// `.Type(...)` becomes a lowercase [EntityKind::Custom].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    #[default]
    Character,
    Place,
    Event,
    Object,
    Temporal,
    Custom(String),
}

impl EntityKind {
    /// Map one of the fixed type-marker modifier names (`Character`, `Place`, `Event`,
    /// `Object`) to its kind. Matching is exact: `.place` is an ordinary property.
    pub fn from_marker(modifier: &str) -> Option<EntityKind> {
        match modifier {
            "Character" => Some(EntityKind::Character),
            "Place" => Some(EntityKind::Place),
            "Event" => Some(EntityKind::Event),
            "Object" => Some(EntityKind::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Place => "place",
            EntityKind::Event => "event",
            EntityKind::Object => "object",
            EntityKind::Temporal => "temporal",
            EntityKind::Custom(kind) => kind.as_str(),
        }
    }
}

impl From<String> for EntityKind {
    fn from(kind: String) -> Self {
        let kind = kind.trim().to_lowercase();
        match kind.as_str() {
            "character" => EntityKind::Character,
            "place" => EntityKind::Place,
            "event" => EntityKind::Event,
            "object" => EntityKind::Object,
            "temporal" => EntityKind::Temporal,
            _ => EntityKind::Custom(kind),
        }
    }
}

impl From<&str> for EntityKind {
    fn from(kind: &str) -> Self {
        EntityKind::from(kind.to_string())
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Narrative importance of an entity. Derived from the marker run length (`@@` main, `@@@`
/// secondary, `@@@@` minor) and never lowered by a later declaration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum HierarchyLevel {
    #[default]
    Main = 1,
    Secondary = 2,
    Minor = 3,
}

impl HierarchyLevel {
    /// Level for a marker run of `count` characters, clamped to the three known levels.
    pub fn from_marker_count(count: usize) -> HierarchyLevel {
        match count.saturating_sub(1) {
            0 | 1 => HierarchyLevel::Main,
            2 => HierarchyLevel::Secondary,
            _ => HierarchyLevel::Minor,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<HierarchyLevel> for u8 {
    fn from(level: HierarchyLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for HierarchyLevel {
    type Error = MuseTagError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(HierarchyLevel::Main),
            2 => Ok(HierarchyLevel::Secondary),
            3 => Ok(HierarchyLevel::Minor),
            _ => Err(MuseTagError::Serialization(format!(
                "hierarchy level must be 1, 2 or 3, got {value}"
            ))),
        }
    }
}

impl Display for HierarchyLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyLevel::Main => write!(f, "main"),
            HierarchyLevel::Secondary => write!(f, "secondary"),
            HierarchyLevel::Minor => write!(f, "minor"),
        }
    }
}

/// Which side of a hierarchical relation the declaring entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationDirection {
    /// The declaring entity is the child of the target.
    Child,
    /// The declaring entity is the parent of the target.
    Parent,
}

impl Display for RelationDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationDirection::Child => write!(f, "child"),
            RelationDirection::Parent => write!(f, "parent"),
        }
    }
}

/// One value of a cumulative (shout-case or type-marker) modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalValue {
    pub value: Option<String>,
    pub position: usize,
}

/// A per-occurrence modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProperty {
    pub name: String,
    pub value: Option<String>,
}

/// One explicit annotation of an entity, or one implicit bare-text mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub position: usize,
    pub local_info: Vec<LocalProperty>,
    #[serde(default)]
    pub is_implicit: bool,
}

impl Occurrence {
    pub fn explicit(position: usize, local_info: Vec<LocalProperty>) -> Self {
        Occurrence {
            position,
            local_info,
            is_implicit: false,
        }
    }

    pub fn implicit(position: usize) -> Self {
        Occurrence {
            position,
            local_info: vec![],
            is_implicit: true,
        }
    }

    /// Value of the first local property called `name`.
    pub fn local(&self, name: &str) -> Option<&LocalProperty> {
        self.local_info.iter().find(|p| p.name == name)
    }
}

/// One end of a parent/child edge. `position` is where the relation was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub hierarchy_level: HierarchyLevel,
    pub global_info: BTreeMap<String, Vec<GlobalValue>>,
    pub occurrences: Vec<Occurrence>,
    pub aliases: Vec<String>,
    pub color: Option<String>,
    pub parsed_absolute_date: Option<NaiveDateTime>,
    pub parents: Vec<Relation>,
    pub children: Vec<Relation>,
}

impl Entity {
    /// The minimal record used before (or instead of) a real declaration.
    pub fn placeholder(name: &str) -> Entity {
        Entity {
            name: name.to_string(),
            kind: EntityKind::Character,
            hierarchy_level: HierarchyLevel::Main,
            global_info: BTreeMap::new(),
            occurrences: vec![],
            aliases: vec![],
            color: None,
            parsed_absolute_date: None,
            parents: vec![],
            children: vec![],
        }
    }

    pub fn is_temporal(&self) -> bool {
        self.kind == EntityKind::Temporal
    }

    /// Raise the hierarchy level to `level` if it is higher; never lowers it.
    pub fn raise_level(&mut self, level: HierarchyLevel) {
        self.hierarchy_level = self.hierarchy_level.max(level);
    }

    /// Append a cumulative modifier value.
    pub fn push_global(&mut self, modifier: &str, value: Option<String>, position: usize) {
        self.global_info
            .entry(modifier.to_string())
            .or_default()
            .push(GlobalValue { value, position });
    }

    /// Record an alias once. Returns whether it was new.
    pub fn add_alias(&mut self, alias: &str) -> bool {
        if self.aliases.iter().any(|a| a == alias) {
            return false;
        }
        self.aliases.push(alias.to_string());
        true
    }

    pub fn has_parent(&self, name: &str) -> bool {
        self.parents.iter().any(|p| p.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    pub fn explicit_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| !o.is_implicit)
    }

    pub fn implicit_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| o.is_implicit)
    }

    /// Position of the first occurrence, if any.
    pub fn first_position(&self) -> Option<usize> {
        self.occurrences.first().map(|o| o.position)
    }

    /// All values recorded for a cumulative modifier, in document order.
    pub fn global_values(&self, modifier: &str) -> &[GlobalValue] {
        self.global_info
            .get(modifier)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// A heading of the document, either a literal markdown heading line or a hidden `@@.(# ...)`
/// heading marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: usize,
    pub text: String,
    pub position: usize,
}

/// Everything a parse produces. The three parts are computed independently from the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub clean_text: String,
    pub entities: EntityMap,
    pub outline: Vec<OutlineEntry>,
}

impl ParseResult {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Rewrite every position (occurrences, cumulative values, relations, outline entries)
    /// through `f`.
    pub fn map_positions(&mut self, f: impl Fn(usize) -> usize) {
        for entity in self.entities.values_mut() {
            for occurrence in &mut entity.occurrences {
                occurrence.position = f(occurrence.position);
            }
            for value in entity.global_info.values_mut().flatten() {
                value.position = f(value.position);
            }
            for relation in entity.parents.iter_mut().chain(entity.children.iter_mut()) {
                relation.position = f(relation.position);
            }
        }
        for entry in &mut self.outline {
            entry.position = f(entry.position);
        }
    }
}
