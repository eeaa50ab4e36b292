//! Read-only views over a parsed entity graph: display ordering, grouping by type, the relation
//! forest, the timeline, and the entities in play around a cursor position.
//!
//! None of these mutate the graph. They are what an editor front end needs to lay out its
//! panels, computed once here instead of in each widget.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    properties::{canonical_name, Entity, EntityKind, EntityMap, HierarchyLevel},
    syntax::Scanner,
};

/// Entities sorted by hierarchy level (main first), then by name.
pub fn display_order(entities: &EntityMap) -> Vec<&Entity> {
    let mut ordered: Vec<&Entity> = entities.values().collect();
    ordered.sort_by(|a, b| {
        a.hierarchy_level
            .cmp(&b.hierarchy_level)
            .then_with(|| a.name.cmp(&b.name))
    });
    ordered
}

/// One type's entities, split by hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelBuckets<'a> {
    pub main: Vec<&'a Entity>,
    pub secondary: Vec<&'a Entity>,
    pub minor: Vec<&'a Entity>,
}

impl<'a> LevelBuckets<'a> {
    fn push(&mut self, entity: &'a Entity) {
        match entity.hierarchy_level {
            HierarchyLevel::Main => self.main.push(entity),
            HierarchyLevel::Secondary => self.secondary.push(entity),
            HierarchyLevel::Minor => self.minor.push(entity),
        }
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.secondary.len() + self.minor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Non-temporal entities grouped by type, each bucket in display order.
pub fn group_by_kind(entities: &EntityMap) -> BTreeMap<EntityKind, LevelBuckets<'_>> {
    let mut groups: BTreeMap<EntityKind, LevelBuckets<'_>> = BTreeMap::new();
    for entity in display_order(entities) {
        if entity.is_temporal() {
            continue;
        }
        groups.entry(entity.kind.clone()).or_default().push(entity);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub name: String,
    /// Where to jump when the node is selected.
    pub focus_position: usize,
    /// Set when the node already appears higher up the same branch. Cycle nodes have no
    /// children.
    pub cycle: bool,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Rewrite the focus position of this node and its descendants through `f`.
    pub fn map_positions(&mut self, f: &impl Fn(usize) -> usize) {
        self.focus_position = f(self.focus_position);
        for child in &mut self.children {
            child.map_positions(f);
        }
    }
}

/// The parent/child forest of every entity taking part in a relation.
///
/// Roots are involved entities without an involved parent, sorted by name. A graph made only
/// of cycles has no roots and yields an empty forest.
pub fn hierarchy_forest(entities: &EntityMap) -> Vec<HierarchyNode> {
    let mut involved: BTreeSet<&str> = BTreeSet::new();
    for (name, entity) in entities {
        if entity.parents.is_empty() && entity.children.is_empty() {
            continue;
        }
        involved.insert(name);
        involved.extend(entity.parents.iter().map(|p| p.name.as_str()));
        involved.extend(entity.children.iter().map(|c| c.name.as_str()));
    }

    let roots: Vec<&str> = involved
        .iter()
        .copied()
        .filter(|name| {
            entities
                .get(*name)
                .map(|e| !e.parents.iter().any(|p| involved.contains(p.name.as_str())))
                .unwrap_or(true)
        })
        .collect();

    let mut branch = Vec::new();
    roots
        .into_iter()
        .map(|root| hierarchy_node(entities, &involved, root, None, &mut branch))
        .collect()
}

fn hierarchy_node(
    entities: &EntityMap,
    involved: &BTreeSet<&str>,
    name: &str,
    tree_parent: Option<&str>,
    branch: &mut Vec<String>,
) -> HierarchyNode {
    let entity = entities.get(name);
    let mut node = HierarchyNode {
        name: name.to_string(),
        focus_position: entity
            .map(|e| focus_position(e, tree_parent))
            .unwrap_or(0),
        cycle: false,
        children: vec![],
    };
    if branch.iter().any(|seen| seen == name) {
        node.cycle = true;
        return node;
    }
    if let Some(entity) = entity {
        branch.push(name.to_string());
        node.children = entity
            .children
            .iter()
            .filter(|c| involved.contains(c.name.as_str()))
            .map(|c| hierarchy_node(entities, involved, &c.name, Some(name), branch))
            .collect();
        branch.pop();
    }
    node
}

/// Relation position to the tree parent, or the earliest relation position when rendered as a
/// root. Falls back to the first occurrence when that is missing or zero.
fn focus_position(entity: &Entity, tree_parent: Option<&str>) -> usize {
    let relation_position = match tree_parent {
        Some(parent) => entity
            .parents
            .iter()
            .chain(entity.children.iter())
            .find(|r| r.name == parent && r.position != 0)
            .map(|r| r.position),
        None => entity
            .parents
            .iter()
            .chain(entity.children.iter())
            .map(|r| r.position)
            .min(),
    };
    match relation_position {
        Some(position) if position != 0 => position,
        _ => entity.first_position().unwrap_or(0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub name: String,
    pub date: NaiveDateTime,
    /// Relative place between the earliest (0.0) and latest (1.0) date.
    pub offset: f64,
}

/// Temporal entities with a parsed date, in chronological order (ties by name).
pub fn timeline(entities: &EntityMap) -> Vec<TimelineEntry> {
    let mut dated: Vec<(&str, NaiveDateTime)> = entities
        .values()
        .filter(|e| e.is_temporal())
        .filter_map(|e| e.parsed_absolute_date.map(|date| (e.name.as_str(), date)))
        .collect();
    dated.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let (Some(first), Some(last)) = (dated.first(), dated.last()) else {
        return vec![];
    };
    let (start, span) = (first.1, (last.1 - first.1).num_milliseconds());
    dated
        .iter()
        .map(|(name, date)| TimelineEntry {
            name: name.to_string(),
            date: *date,
            offset: if span > 0 {
                (*date - start).num_milliseconds() as f64 / span as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// The paragraph around a position and its two neighbours. Paragraphs are separated by a blank
/// line (`\n\n`); missing neighbours are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParagraphWindow<'a> {
    pub previous: &'a str,
    pub current: &'a str,
    pub next: &'a str,
}

impl ParagraphWindow<'_> {
    /// The three paragraphs joined by single spaces.
    pub fn joined(&self) -> String {
        [self.previous, self.current, self.next].join(" ")
    }
}

const PARAGRAPH_BREAK: &str = "\n\n";

pub fn paragraph_window(text: &str, position: usize) -> ParagraphWindow<'_> {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    let brk = PARAGRAPH_BREAK.len();

    let start = text[..position]
        .rfind(PARAGRAPH_BREAK)
        .map(|i| i + brk)
        .unwrap_or(0);
    let end = text[position..]
        .find(PARAGRAPH_BREAK)
        .map(|i| position + i)
        .unwrap_or(text.len());

    let mut window = ParagraphWindow {
        current: &text[start..end],
        ..Default::default()
    };
    if start > 0 {
        let before = &text[..start - brk];
        let previous_start = before.rfind(PARAGRAPH_BREAK).map(|i| i + brk).unwrap_or(0);
        window.previous = &before[previous_start..];
    }
    if end < text.len() {
        let after = &text[end + brk..];
        let next_len = after.find(PARAGRAPH_BREAK).unwrap_or(after.len());
        window.next = &after[..next_len];
    }
    window
}

/// Canonical names of entities mentioned near `position`: names of annotations in the window
/// and word-bounded mentions of known names or aliases.
pub fn entities_in_context(
    text: &str,
    position: usize,
    entities: &EntityMap,
    marker: char,
) -> BTreeSet<String> {
    let context = paragraph_window(text, position).joined();
    let mut found: BTreeSet<String> = Scanner::new(&context, marker)
        .flat_map(|annotation| {
            annotation
                .names()
                .into_iter()
                .map(canonical_name)
                .collect::<Vec<_>>()
        })
        .collect();

    for (name, entity) in entities {
        if found.contains(name) {
            continue;
        }
        let mentioned = std::iter::once(name)
            .chain(entity.aliases.iter())
            .any(|candidate| {
                match Regex::new(&format!(r"\b{}\b", regex::escape(candidate))) {
                    Ok(pattern) => pattern.is_match(&context),
                    Err(e) => {
                        tracing::warn!("[entities_in_context] Skipping '{candidate}': {e}");
                        false
                    }
                }
            });
        if mentioned {
            found.insert(name.clone());
        }
    }
    found
}
