/// [crate::resolver] contains the declared-name table built during a parse and the fuzzy lookup
/// used to turn relation targets into canonical entity names.
use std::collections::{BTreeMap, BTreeSet};

/// How a surface form was declared: its raw spelling in the source and the canonical entity it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredName {
    pub raw: String,
    pub owner: String,
}

/// Surface forms seen so far in a parse, keyed by the form itself.
///
/// Keys are canonical names, the underscore spelling of names declared with underscores, and
/// aliases. Iteration is in key order, which makes first-match lookups deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredNames(BTreeMap<String, DeclaredName>);

impl DeclaredNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration of `canonical` spelled `raw` in the source. A later declaration of
    /// the same canonical name replaces the stored raw spelling.
    pub fn declare(&mut self, canonical: &str, raw: &str) {
        let entry = DeclaredName {
            raw: raw.to_string(),
            owner: canonical.to_string(),
        };
        if raw.contains('_') {
            self.0.insert(raw.to_string(), entry.clone());
        }
        self.0.insert(canonical.to_string(), entry);
    }

    /// Record an alias of `owner`. An alias never displaces a name that is already declared.
    pub fn declare_alias(&mut self, alias: &str, owner: &str) -> bool {
        let alias = alias.trim();
        if alias.is_empty() || self.0.contains_key(alias) {
            return false;
        }
        self.0.insert(
            alias.to_string(),
            DeclaredName {
                raw: alias.to_string(),
                owner: owner.to_string(),
            },
        );
        true
    }

    pub fn get(&self, form: &str) -> Option<&DeclaredName> {
        self.0.get(form)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeclaredName)> {
        self.0.iter()
    }

    /// Every spelling that refers to each owner: the keys it is declared under plus their raw
    /// spellings.
    pub fn surface_forms(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut forms: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (form, declared) in self.0.iter() {
            let owned = forms.entry(declared.owner.as_str()).or_default();
            owned.insert(form.as_str());
            owned.insert(declared.raw.as_str());
        }
        forms
    }
}

/// Resolve a relation target to the canonical name of a declared entity.
///
/// Tries, in order: the exact form; the form with underscores read as spaces; the form with
/// spaces read as underscores; a case-insensitive match against every declared form; and
/// finally exact, underscore, space or case-insensitive matches against raw spellings.
/// Returns `None` when nothing matches, which callers treat as "no relation".
pub fn resolve(token: &str, declared: &DeclaredNames) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let with_spaces = token.replace('_', " ");
    let with_underscores = token.replace(' ', "_");

    for form in [token, with_spaces.as_str(), with_underscores.as_str()] {
        if let Some(found) = declared.get(form) {
            return Some(found.owner.clone());
        }
    }

    let lower = token.to_lowercase();
    if let Some((_, found)) = declared.iter().find(|(form, _)| form.to_lowercase() == lower) {
        return Some(found.owner.clone());
    }

    declared
        .iter()
        .find(|(_, found)| {
            found.raw == token
                || found.raw == with_underscores
                || found.raw == with_spaces
                || found.raw.to_lowercase() == lower
        })
        .map(|(_, found)| found.owner.clone())
}
