use std::ops::Range;

use crate::{
    properties::HierarchyLevel,
    syntax::modifier::{chain_end, parse_chain, visible_text, Modifier},
};

/// The marker run bounds: `@@` to `@@@@`.
pub const MIN_MARKERS: usize = 2;
pub const MAX_MARKERS: usize = 4;

/// The name part of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head<'a> {
    /// `@@Jim_Young`: displayed in clean text.
    Bare(&'a str),
    /// `@@(Jim, Della)`: never displayed; may declare several names.
    Hidden(&'a str),
    /// `@@.`: no name at all, only a modifier chain.
    Null,
}

/// One recognised annotation. Borrowed slices point into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation<'a> {
    /// Byte span of the whole annotation, markers through the last modifier.
    pub span: Range<usize>,
    pub markers: usize,
    pub head: Head<'a>,
    /// The raw modifier chain (`.Place.Says[hi]`), possibly empty.
    pub chain: &'a str,
}

impl<'a> Annotation<'a> {
    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn level(&self) -> HierarchyLevel {
        HierarchyLevel::from_marker_count(self.markers)
    }

    pub fn is_hidden(&self) -> bool {
        !matches!(self.head, Head::Bare(_))
    }

    /// The raw (not yet canonical) names this annotation declares.
    pub fn names(&self) -> Vec<&'a str> {
        match self.head {
            Head::Bare(name) => vec![name],
            Head::Hidden(content) if content.contains(',') => content
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
            Head::Hidden(content) => {
                let name = content.trim();
                if name.is_empty() {
                    vec![]
                } else {
                    vec![name]
                }
            }
            Head::Null => vec![],
        }
    }

    pub fn modifiers(&self) -> Vec<Modifier<'a>> {
        parse_chain(self.chain, self.head == Head::Null)
    }

    /// Concatenated `[visible]` arguments of the chain.
    pub fn visible_text(&self) -> String {
        visible_text(&self.modifiers())
    }

    /// `@@.(## Text)` yields `(2, "Text")`.
    pub fn hidden_heading(&self) -> Option<(usize, &'a str)> {
        if self.head != Head::Null {
            return None;
        }
        let first = self.modifiers().into_iter().next()?;
        if !first.name.is_empty() || first.arg.is_some_and(|a| a.is_visible()) {
            return None;
        }
        let content = first.value()?;
        let text = content.trim_start_matches('#');
        let level = content.len() - text.len();
        if level == 0 {
            return None;
        }
        Some((level, text.trim()))
    }
}

/// Left-to-right annotation scanner over one text.
///
/// Text that does not form an annotation is skipped as literal prose. Matches never overlap.
pub struct Scanner<'a> {
    text: &'a str,
    marker: char,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, marker: char) -> Scanner<'a> {
        Scanner {
            text,
            marker,
            pos: 0,
        }
    }

    fn run_length(&self, start: usize) -> usize {
        self.text[start..]
            .chars()
            .take_while(|c| *c == self.marker)
            .count()
    }

    fn head_at(&self, pos: usize) -> Option<(Head<'a>, usize)> {
        let rest = &self.text[pos..];
        let first = rest.chars().next()?;
        if is_bare_name_char(first) {
            let len = rest
                .find(|c: char| !is_bare_name_char(c))
                .unwrap_or(rest.len());
            return Some((Head::Bare(&rest[..len]), pos + len));
        }
        match first {
            '(' => {
                let len = rest[1..].find(')')?;
                if len == 0 {
                    return None;
                }
                Some((Head::Hidden(&rest[1..1 + len]), pos + len + 2))
            }
            // The chain starts at the dot itself.
            '.' => Some((Head::Null, pos)),
            _ => None,
        }
    }

    fn annotation_at(&self, start: usize, markers: usize) -> Option<Annotation<'a>> {
        let head_start = start + markers * self.marker.len_utf8();
        let (head, chain_start) = self.head_at(head_start)?;
        let end = chain_end(self.text, chain_start, head == Head::Null);
        Some(Annotation {
            span: start..end,
            markers,
            head,
            chain: &self.text[chain_start..end],
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Annotation<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let marker_len = self.marker.len_utf8();
        while self.pos < self.text.len() {
            let offset = self.text[self.pos..].find(self.marker)?;
            let start = self.pos + offset;
            let run = self.run_length(start);
            if run < MIN_MARKERS {
                self.pos = start + marker_len;
                continue;
            }
            if run > MAX_MARKERS {
                // Only the last four markers of a longer run can open an annotation.
                self.pos = start + marker_len;
                continue;
            }
            match self.annotation_at(start, run) {
                Some(annotation) => {
                    self.pos = annotation.span.end;
                    return Some(annotation);
                }
                None => self.pos = start + run * marker_len,
            }
        }
        None
    }
}

pub(crate) fn is_bare_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// All annotations in `text`, in document order.
pub fn scan(text: &str, marker: char) -> Vec<Annotation<'_>> {
    Scanner::new(text, marker).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_scan_bare_annotation() {
        let found = scan("@@Della said hi.", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 0..7);
        assert_eq!(found[0].head, Head::Bare("Della"));
        assert_eq!(found[0].chain, "");
        assert_eq!(found[0].level(), HierarchyLevel::Main);
    }

    #[test]
    fn test_trailing_period_is_not_a_modifier() {
        let found = scan("I saw @@Jim. Then left.", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].head, Head::Bare("Jim"));
        assert_eq!(found[0].span.end, "I saw @@Jim".len());
    }

    #[test]
    fn test_hidden_group_names() {
        let found = scan("@@@(Jim_Young, Della ,).Place", '@');
        assert_eq!(found.len(), 1);
        assert!(found[0].is_hidden());
        assert_eq!(found[0].names(), vec!["Jim_Young", "Della"]);
        assert_eq!(found[0].level(), HierarchyLevel::Secondary);
        assert_eq!(found[0].chain, ".Place");
    }

    #[test]
    fn test_single_marker_and_email_are_prose() {
        assert!(scan("mail me @ home or at jim@example.org", '@').is_empty());
    }

    #[test]
    fn test_long_marker_run_uses_last_four() {
        let found = scan("@@@@@Ghost", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 1..10);
        assert_eq!(found[0].markers, 4);
    }

    #[test]
    fn test_empty_hidden_name_is_not_an_annotation() {
        let found = scan("@@() then @@Jim", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].head, Head::Bare("Jim"));
    }

    #[test]
    fn test_hidden_heading() {
        let found = scan("@@.(## The Gift)", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].head, Head::Null);
        assert_eq!(found[0].hidden_heading(), Some((2, "The Gift")));
    }

    #[test]
    fn test_null_annotation_with_visible_argument() {
        let found = scan("@@.Note[ (sic)] end", '@');
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hidden_heading(), None);
        assert_eq!(found[0].visible_text(), " (sic)");
    }

    #[test]
    fn test_unicode_bare_names_and_custom_marker() {
        let found = scan("§§Zoë.Mood(calme) et §§Ana", '§');
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].head, Head::Bare("Zoë"));
        assert_eq!(found[0].modifiers()[0].value(), Some("calme"));
        assert_eq!(found[1].head, Head::Bare("Ana"));
    }
}
