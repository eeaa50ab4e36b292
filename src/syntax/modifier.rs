//! Modifier chains (`.Name`, `.Name(hidden)`, `.Name[visible]`) and the reserved modifier names.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::properties::RelationDirection;

/// Fixed type markers. These set the entity type and are always cumulative.
pub const TYPE_MARKERS: [&str; 4] = ["Character", "Place", "Event", "Object"];
/// `.Type(kind)` sets an arbitrary lowercase type.
pub const TYPE_MODIFIER: &str = "Type";
pub const ALIAS_MODIFIER: &str = "Alias";
pub const COLOR_MODIFIER: &str = "Color";

/// Built-in hierarchical sugar, from the declaring entity's point of view.
pub static HIERARCHICAL_SUGAR: Lazy<BTreeMap<&'static str, RelationDirection>> = Lazy::new(|| {
    use RelationDirection::{Child, Parent};
    BTreeMap::from([
        ("ChildOf", Child),
        ("PartOf", Child),
        ("BelongsTo", Child),
        ("MemberOf", Child),
        ("ContainedIn", Child),
        ("DescendantOf", Child),
        ("ParentOf", Parent),
        ("HasPart", Parent),
        ("Includes", Parent),
        ("GroupOf", Parent),
        ("ContainerOf", Parent),
        ("AncestorOf", Parent),
    ])
});

/// Whether `name` is a reserved modifier that is not a relation.
pub fn is_reserved_property(name: &str) -> bool {
    TYPE_MARKERS.contains(&name)
        || name == TYPE_MODIFIER
        || name == ALIAS_MODIFIER
        || name == COLOR_MODIFIER
}

/// Shout-case names (no lowercase letters, at least one cased letter) mark cumulative modifiers.
pub fn is_shout_case(name: &str) -> bool {
    name.to_uppercase() == name && name.to_lowercase() != name
}

/// The relation modifiers in effect for one parse: the built-in sugar plus configured synonyms.
#[derive(Debug, Clone)]
pub struct RelationTable(BTreeMap<String, RelationDirection>);

impl Default for RelationTable {
    fn default() -> Self {
        RelationTable(
            HIERARCHICAL_SUGAR
                .iter()
                .map(|(name, direction)| (name.to_string(), *direction))
                .collect(),
        )
    }
}

impl RelationTable {
    /// Add synonyms. Built-in names keep their direction.
    pub fn extend<'a, I>(&mut self, synonyms: I)
    where
        I: IntoIterator<Item = (&'a String, &'a RelationDirection)>,
    {
        for (name, direction) in synonyms {
            if HIERARCHICAL_SUGAR.contains_key(name.as_str()) {
                tracing::debug!("[RelationTable::extend] Ignoring built-in relation {}", name);
                continue;
            }
            self.0.insert(name.clone(), *direction);
        }
    }

    pub fn direction(&self, modifier: &str) -> Option<RelationDirection> {
        self.0.get(modifier).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

/// Argument of a modifier. Hidden arguments drive logic only, visible ones are shown verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument<'a> {
    Hidden(&'a str),
    Visible(&'a str),
}

impl<'a> Argument<'a> {
    pub fn value(&self) -> &'a str {
        match self {
            Argument::Hidden(v) | Argument::Visible(v) => v,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Argument::Visible(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier<'a> {
    pub name: &'a str,
    pub arg: Option<Argument<'a>>,
}

impl<'a> Modifier<'a> {
    pub fn value(&self) -> Option<&'a str> {
        self.arg.map(|a| a.value())
    }

    /// The argument value when present and non-empty.
    pub fn non_empty_value(&self) -> Option<&'a str> {
        self.value().filter(|v| !v.is_empty())
    }

    pub fn visible_value(&self) -> Option<&'a str> {
        self.arg.filter(|a| a.is_visible()).map(|a| a.value())
    }
}

pub(crate) fn is_modifier_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '!' | '?')
}

/// Read one modifier starting at byte `pos` (which must hold a `.`).
///
/// Returns the modifier and the byte offset just past it. The name is the longest run of
/// modifier-name characters; an argument is attached only when its closing delimiter exists,
/// otherwise the modifier ends after its name. An empty name is accepted only when
/// `allow_empty_name` is set (the first element of a null annotation).
pub(crate) fn modifier_at(
    text: &str,
    pos: usize,
    allow_empty_name: bool,
) -> Option<(Modifier<'_>, usize)> {
    let rest = text.get(pos..)?;
    if !rest.starts_with('.') {
        return None;
    }
    let name_start = pos + 1;
    let name_end = text[name_start..]
        .find(|c: char| !is_modifier_name_char(c))
        .map(|offset| name_start + offset)
        .unwrap_or(text.len());
    let name = &text[name_start..name_end];
    if name.is_empty() && !allow_empty_name {
        return None;
    }
    let (arg, end) = argument_at(text, name_end);
    Some((Modifier { name, arg }, end))
}

fn argument_at(text: &str, pos: usize) -> (Option<Argument<'_>>, usize) {
    let rest = &text[pos..];
    let (close, hidden) = if rest.starts_with('(') {
        (')', true)
    } else if rest.starts_with('[') {
        (']', false)
    } else {
        return (None, pos);
    };
    match rest[1..].find(close) {
        Some(len) => {
            let content = &rest[1..1 + len];
            let arg = if hidden {
                Argument::Hidden(content)
            } else {
                Argument::Visible(content)
            };
            (Some(arg), pos + len + 2)
        }
        None => (None, pos),
    }
}

/// Split a raw modifier chain into its modifiers.
///
/// `allow_empty_first` admits an empty first name, as in the null form `@@.(# Heading)`.
pub fn parse_chain(chain: &str, allow_empty_first: bool) -> Vec<Modifier<'_>> {
    let mut modifiers = Vec::new();
    let mut pos = 0;
    while let Some((modifier, end)) =
        modifier_at(chain, pos, allow_empty_first && modifiers.is_empty())
    {
        modifiers.push(modifier);
        if end == pos {
            break;
        }
        pos = end;
    }
    modifiers
}

/// Length in bytes of the modifier chain starting at `pos`.
pub(crate) fn chain_end(text: &str, pos: usize, allow_empty_first: bool) -> usize {
    let mut end = pos;
    let mut first = true;
    while let Some((_, next)) = modifier_at(text, end, allow_empty_first && first) {
        first = false;
        if next == end {
            break;
        }
        end = next;
    }
    end
}

/// Concatenate the visible arguments of a chain, in order.
pub fn visible_text(modifiers: &[Modifier<'_>]) -> String {
    modifiers
        .iter()
        .filter_map(|m| m.visible_value())
        .collect::<String>()
}
