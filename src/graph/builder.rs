use regex::Regex;
use std::ops::Range;

use crate::{
    config::ParserConfig,
    graph::linker::EntityGraph,
    properties::{canonical_name, EntityKind, EntityMap, LocalProperty, Occurrence},
    resolver::{resolve, DeclaredNames},
    syntax::{
        is_shout_case, is_temporal_token,
        modifier::{ALIAS_MODIFIER, COLOR_MODIFIER, TYPE_MODIFIER},
        parse_date_time, Annotation, Modifier, RelationTable, Scanner,
    },
};

/// Builds the entity graph of one document in two passes: explicit declarations, then implicit
/// bare-name mentions.
///
/// A builder holds only the configuration; every [GraphBuilder::build] starts from an empty
/// graph.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    marker: char,
    implicit_occurrences: bool,
    relations: RelationTable,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        GraphBuilder::new(&ParserConfig::default())
    }
}

/// Per-build state shared by both passes.
struct BuildSession {
    graph: EntityGraph,
    declared: DeclaredNames,
    /// Spans of every explicit annotation, in document order.
    spans: Vec<Range<usize>>,
}

impl GraphBuilder {
    pub fn new(config: &ParserConfig) -> Self {
        GraphBuilder {
            marker: config.marker,
            implicit_occurrences: config.implicit_occurrences,
            relations: config.relation_table(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn build(&self, text: &str) -> EntityMap {
        let mut session = BuildSession {
            graph: EntityGraph::new(),
            declared: DeclaredNames::new(),
            spans: vec![],
        };

        self.declare_explicit(text, &mut session);
        if self.implicit_occurrences {
            self.find_implicit(text, &mut session);
        }

        let mut graph = session.graph;
        for entity in graph.iter_mut() {
            entity.occurrences.sort_by_key(|o| o.position);
        }
        tracing::debug!(
            "[GraphBuilder::build] {} annotations, {} declared forms, {} entities",
            session.spans.len(),
            session.declared.len(),
            graph.len()
        );
        graph.into_entities()
    }

    /// Pass 1: every annotation, every name it declares, every modifier in its chain.
    #[tracing::instrument(skip_all)]
    fn declare_explicit(&self, text: &str, session: &mut BuildSession) {
        for annotation in Scanner::new(text, self.marker) {
            session.spans.push(annotation.span.clone());
            let modifiers = annotation.modifiers();

            let mut seen: Vec<String> = Vec::new();
            for raw in annotation.names() {
                let canonical = canonical_name(raw);
                if seen.contains(&canonical) {
                    continue;
                }
                seen.push(canonical.clone());
                self.declare(&annotation, raw, &canonical, &modifiers, session);
            }
        }
    }

    fn declare(
        &self,
        annotation: &Annotation<'_>,
        raw: &str,
        canonical: &str,
        modifiers: &[Modifier<'_>],
        session: &mut BuildSession,
    ) {
        let position = annotation.start();
        tracing::trace!("[GraphBuilder::declare] '{canonical}' at {position}");
        session.declared.declare(canonical, raw);

        let temporal_shape = annotation.is_hidden() && is_temporal_token(raw);
        {
            let entity = session.graph.upsert(canonical);
            entity.raise_level(annotation.level());
            if temporal_shape {
                entity.kind = EntityKind::Temporal;
                if let Some(date) = parse_date_time(raw) {
                    entity.parsed_absolute_date = Some(date);
                }
            }
        }

        let mut local_info = Vec::new();
        for modifier in modifiers {
            if let Some(direction) = self.relations.direction(modifier.name) {
                for target in self.relation_targets(modifier, &session.declared) {
                    session.graph.link(canonical, direction, &target, position);
                }
                continue;
            }

            let entity = session.graph.upsert(canonical);
            let value = modifier.value().map(str::to_string);
            let type_marker = EntityKind::from_marker(modifier.name);

            if !entity.is_temporal() {
                if let Some(kind) = &type_marker {
                    entity.kind = kind.clone();
                } else if modifier.name == TYPE_MODIFIER {
                    if let Some(kind) = modifier.non_empty_value() {
                        entity.kind = EntityKind::from(kind);
                    }
                }
            }

            if is_shout_case(modifier.name) || (type_marker.is_some() && !entity.is_temporal()) {
                entity.push_global(modifier.name, value, position);
            } else if let Some(alias) = argument_of(modifier, ALIAS_MODIFIER) {
                entity.add_alias(alias);
                session.declared.declare_alias(alias, canonical);
            } else if let Some(color) = argument_of(modifier, COLOR_MODIFIER) {
                entity.color = Some(color.to_string());
            } else {
                local_info.push(LocalProperty {
                    name: modifier.name.to_string(),
                    value,
                });
            }
        }

        session
            .graph
            .upsert(canonical)
            .occurrences
            .push(Occurrence::explicit(position, local_info));
    }

    /// Targets named by a relation argument: annotation names nested inside it, or else the
    /// argument text resolved against the names declared so far.
    fn relation_targets(&self, modifier: &Modifier<'_>, declared: &DeclaredNames) -> Vec<String> {
        let Some(value) = modifier.non_empty_value() else {
            return vec![];
        };
        let nested: Vec<String> = Scanner::new(value, self.marker)
            .flat_map(|inner| {
                inner
                    .names()
                    .into_iter()
                    .map(canonical_name)
                    .collect::<Vec<_>>()
            })
            .collect();
        if !nested.is_empty() {
            return nested;
        }
        resolve(value, declared).into_iter().collect()
    }

    /// Pass 2: word-bounded mentions of declared names outside any annotation.
    #[tracing::instrument(skip_all)]
    fn find_implicit(&self, text: &str, session: &mut BuildSession) {
        let forms = session.declared.surface_forms();
        let mut found = 0;
        for (owner, spellings) in forms {
            let Some(entity) = session.graph.get_mut(owner) else {
                continue;
            };
            if entity.is_temporal() {
                continue;
            }
            let pattern = match mention_pattern(spellings.iter().copied()) {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!("[GraphBuilder::find_implicit] Skipping '{owner}': {e}");
                    continue;
                }
            };
            for mention in pattern.find_iter(text) {
                if overlaps_any(&session.spans, mention.start()..mention.end()) {
                    continue;
                }
                entity.occurrences.push(Occurrence::implicit(mention.start()));
                found += 1;
            }
        }
        tracing::debug!("[GraphBuilder::find_implicit] {found} implicit occurrences");
    }
}

/// The trimmed, non-empty argument of `modifier` if it is called `name`.
fn argument_of<'a>(modifier: &Modifier<'a>, name: &str) -> Option<&'a str> {
    if modifier.name != name {
        return None;
    }
    modifier.value().map(str::trim).filter(|v| !v.is_empty())
}

/// `\b(?:longest|long|short)\b` over the escaped spellings.
fn mention_pattern<'a, I>(spellings: I) -> Result<Regex, regex::Error>
where
    I: Iterator<Item = &'a str>,
{
    let mut spellings: Vec<&str> = spellings.filter(|s| !s.is_empty()).collect();
    spellings.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternatives = spellings
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternatives})\b"))
}

/// Whether `range` intersects any of the sorted, disjoint `spans`.
fn overlaps_any(spans: &[Range<usize>], range: Range<usize>) -> bool {
    let first_after = spans.partition_point(|span| span.end <= range.start);
    spans
        .get(first_after)
        .is_some_and(|span| span.start < range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{HierarchyLevel, RelationDirection};
    use crate::syntax::HIERARCHICAL_SUGAR;
    use test_log::test;

    fn build(text: &str) -> EntityMap {
        GraphBuilder::default().build(text)
    }

    #[test]
    fn test_bare_declaration() {
        let entities = build("@@Della said hi.");
        let della = &entities["Della"];
        assert_eq!(della.kind, EntityKind::Character);
        assert_eq!(della.hierarchy_level, HierarchyLevel::Main);
        assert_eq!(della.occurrences, vec![Occurrence::explicit(0, vec![])]);
    }

    #[test]
    fn test_relation_to_nested_annotation() {
        let entities = build("@@watch.ChildOf(@@Jim)");
        assert!(entities["watch"].has_parent("Jim"));
        assert!(entities["Jim"].has_child("watch"));
        assert!(entities["watch"].occurrences[0].local_info.is_empty());
        assert!(entities["watch"].global_info.is_empty());
    }

    #[test]
    fn test_every_hierarchical_sugar_name_links_in_its_direction() {
        let cases = [
            ("ChildOf", RelationDirection::Child),
            ("PartOf", RelationDirection::Child),
            ("BelongsTo", RelationDirection::Child),
            ("MemberOf", RelationDirection::Child),
            ("ContainedIn", RelationDirection::Child),
            ("DescendantOf", RelationDirection::Child),
            ("ParentOf", RelationDirection::Parent),
            ("HasPart", RelationDirection::Parent),
            ("Includes", RelationDirection::Parent),
            ("GroupOf", RelationDirection::Parent),
            ("ContainerOf", RelationDirection::Parent),
            ("AncestorOf", RelationDirection::Parent),
        ];
        assert_eq!(cases.len(), HIERARCHICAL_SUGAR.len());
        for (name, direction) in cases {
            let entities = build(&format!("@@A.{name}(@@B)"));
            let (a, b) = (&entities["A"], &entities["B"]);
            match direction {
                RelationDirection::Child => {
                    assert!(b.has_child("A"), "{name}: B should be the parent");
                    assert!(a.has_parent("B"), "{name}");
                    assert!(b.parents.is_empty() && a.children.is_empty(), "{name}");
                }
                RelationDirection::Parent => {
                    assert!(b.has_parent("A"), "{name}: A should be the parent");
                    assert!(a.has_child("B"), "{name}");
                    assert!(b.children.is_empty() && a.parents.is_empty(), "{name}");
                }
            }
            assert!(a.occurrences[0].local_info.is_empty(), "{name}");
        }
    }

    #[test]
    fn test_relation_resolves_declared_names() {
        let entities = build("@@Jim_Young. Later @@@(watch).PartOf(jim young).Object");
        let watch = &entities["watch"];
        assert_eq!(watch.parents[0].name, "Jim Young");
        assert_eq!(watch.parents[0].position, 19);
        assert_eq!(watch.kind, EntityKind::Object);
        assert_eq!(watch.hierarchy_level, HierarchyLevel::Secondary);
    }

    #[test]
    fn test_unresolved_relation_is_dropped() {
        let entities = build("@@watch.ChildOf(Nobody)");
        assert!(entities["watch"].parents.is_empty());
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn test_placeholder_is_filled_by_later_declaration() {
        let entities = build("@@comb.ChildOf(@@Della) then @@@(Della).Place");
        let della = &entities["Della"];
        assert_eq!(della.kind, EntityKind::Place);
        assert_eq!(della.hierarchy_level, HierarchyLevel::Secondary);
        assert!(della.has_child("comb"));
    }

    #[test]
    fn test_temporal_declaration() {
        let entities = build("@@(1905-12-24 12:00).Place and 1905-12-24 12:00");
        let eve = &entities["1905-12-24 12:00"];
        assert_eq!(eve.kind, EntityKind::Temporal);
        assert!(eve.parsed_absolute_date.is_some());
        assert!(eve.global_info.is_empty());
        assert_eq!(eve.occurrences.len(), 1);
        assert_eq!(eve.occurrences[0].local("Place").map(|p| p.value.clone()), Some(None));
    }

    #[test]
    fn test_unparseable_temporal_keeps_type() {
        let entities = build("@@(@dawn)");
        assert_eq!(entities["@dawn"].kind, EntityKind::Temporal);
        assert_eq!(entities["@dawn"].parsed_absolute_date, None);
    }

    #[test]
    fn test_cumulative_and_local_modifiers() {
        let entities = build("@@Jim.DIALOG[Hello].Mood(sad) @@(Jim).DIALOG(Bye).Place");
        let jim = &entities["Jim"];
        let dialog: Vec<_> = jim
            .global_values("DIALOG")
            .iter()
            .map(|g| (g.value.clone(), g.position))
            .collect();
        assert_eq!(
            dialog,
            vec![(Some("Hello".to_string()), 0), (Some("Bye".to_string()), 30)]
        );
        assert_eq!(jim.global_values("Place").len(), 1);
        assert_eq!(jim.kind, EntityKind::Place);
        assert_eq!(
            jim.occurrences[0].local("Mood").and_then(|p| p.value.clone()),
            Some("sad".to_string())
        );
        assert!(jim.occurrences[1].local_info.is_empty());
    }

    #[test]
    fn test_custom_type_alias_and_color() {
        let text = "@@(Hansom).Type(Vehicle).Alias(cab).Color(#aa0000) A cab waited.";
        let entities = build(text);
        let hansom = &entities["Hansom"];
        assert_eq!(hansom.kind, EntityKind::Custom("vehicle".to_string()));
        assert_eq!(hansom.aliases, vec!["cab".to_string()]);
        assert_eq!(hansom.color.as_deref(), Some("#aa0000"));
        assert_eq!(
            hansom.occurrences[0].local("Type").and_then(|p| p.value.clone()),
            Some("Vehicle".to_string())
        );
        let implicit: Vec<_> = hansom.implicit_occurrences().map(|o| o.position).collect();
        assert_eq!(implicit, vec![text.find("A cab").unwrap() + 2]);
        assert!(!entities.contains_key("cab"));
    }

    #[test]
    fn test_grouped_declaration_fans_out() {
        let entities = build("@@(Jim, Della).Place");
        for name in ["Jim", "Della"] {
            assert_eq!(entities[name].kind, EntityKind::Place);
            assert_eq!(entities[name].occurrences.len(), 1);
            assert_eq!(entities[name].occurrences[0].position, 0);
        }
    }

    #[test]
    fn test_implicit_occurrences_skip_annotations() {
        let text = "@@Jim_Young waits. Jim Young and Jim_Young. Jimmy is not Jim Young's.";
        let entities = build(text);
        let positions: Vec<_> = entities["Jim Young"]
            .occurrences
            .iter()
            .map(|o| (o.position, o.is_implicit))
            .collect();
        assert_eq!(
            positions,
            vec![(0, false), (19, true), (33, true), (57, true)]
        );
    }

    #[test]
    fn test_implicit_occurrences_can_be_disabled() {
        let config = ParserConfig {
            implicit_occurrences: false,
            ..Default::default()
        };
        let entities = GraphBuilder::new(&config).build("@@Della. Della again.");
        assert_eq!(entities["Della"].occurrences.len(), 1);
    }

    #[test]
    fn test_configured_relation_names() {
        let mut config = ParserConfig::default();
        config
            .relations
            .insert("RulerOf".to_string(), RelationDirection::Parent);
        let entities = GraphBuilder::new(&config).build("@@Emperor.RulerOf(@@Empire)");
        assert!(entities["Empire"].has_parent("Emperor"));
        assert!(entities["Emperor"].occurrences[0].local_info.is_empty());
    }

    #[test]
    fn test_overlaps_any() {
        let spans = vec![0..5, 10..15];
        assert!(overlaps_any(&spans, 4..6));
        assert!(!overlaps_any(&spans, 5..10));
        assert!(overlaps_any(&spans, 14..20));
        assert!(!overlaps_any(&spans, 15..20));
    }
}
