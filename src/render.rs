//! Clean text: the narrative as a reader sees it, with annotations removed or expanded.
//!
//! Works on raw text alone. No entity graph is involved.

use crate::syntax::{Annotation, Head, Scanner, DEFAULT_MARKER};

/// Characters that attach to a displayed name without a separating space.
const NO_SPACE_BEFORE: [char; 7] = ['.', ',', ':', ';', '?', '!', ')'];

#[derive(Debug, Clone, Copy)]
pub struct CleanTextRenderer {
    marker: char,
}

impl Default for CleanTextRenderer {
    fn default() -> Self {
        CleanTextRenderer::new(DEFAULT_MARKER)
    }
}

impl CleanTextRenderer {
    pub fn new(marker: char) -> Self {
        CleanTextRenderer { marker }
    }

    /// Render `text`. The result contains no annotation, so rendering it again is the identity.
    pub fn render(&self, text: &str) -> String {
        let mut rendered = self.substitute(text);
        // Expanding visible arguments can assemble a new annotation (`@@(x)[@]@Jim`). Every
        // substitution shortens the text, so this ends. Annotation syntax inside a visible
        // argument is rendered too: `[mail a@@b.com]` shows as `mail ab`, never verbatim.
        while Scanner::new(&rendered, self.marker).next().is_some() {
            tracing::trace!("[CleanTextRenderer::render] Sweeping leftover annotation syntax");
            rendered = self.substitute(&rendered);
        }
        rendered
    }

    fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for annotation in Scanner::new(text, self.marker) {
            out.push_str(&text[last..annotation.span.start]);
            out.push_str(&replacement(&annotation));
            last = annotation.span.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

/// The display text of one annotation.
///
/// Hidden headings vanish. A bare name shows de-underscored, followed by its visible arguments
/// (separated by one space unless they open with closing punctuation). Hidden and null forms
/// show only their visible arguments.
pub fn replacement(annotation: &Annotation<'_>) -> String {
    if annotation.hidden_heading().is_some() {
        return String::new();
    }
    let visible = annotation.visible_text();
    match annotation.head {
        Head::Bare(name) => {
            let mut shown = name.replace('_', " ");
            if visible.starts_with(|c: char| !NO_SPACE_BEFORE.contains(&c)) {
                shown.push(' ');
            }
            shown.push_str(&visible);
            shown
        }
        Head::Hidden(_) | Head::Null => visible,
    }
}

/// Clean text with the default marker.
pub fn clean_text(text: &str) -> String {
    CleanTextRenderer::default().render(text)
}
