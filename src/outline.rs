/// [crate::outline] builds the document outline from hidden heading markers (`@@.(## Text)`)
/// and literal markdown heading lines.
use crate::{
    properties::OutlineEntry,
    render::CleanTextRenderer,
    syntax::{Scanner, DEFAULT_MARKER},
};

#[derive(Debug, Clone, Copy)]
pub struct OutlineExtractor {
    marker: char,
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        OutlineExtractor::new(DEFAULT_MARKER)
    }
}

impl OutlineExtractor {
    pub fn new(marker: char) -> Self {
        OutlineExtractor { marker }
    }

    /// All headings of `text`, sorted by position. Hidden headings are positioned at their
    /// annotation, visible ones at the start of their line.
    pub fn extract(&self, text: &str) -> Vec<OutlineEntry> {
        let mut outline: Vec<OutlineEntry> = Scanner::new(text, self.marker)
            .filter_map(|annotation| {
                let (level, heading) = annotation.hidden_heading()?;
                Some(OutlineEntry {
                    level,
                    text: heading.to_string(),
                    position: annotation.start(),
                })
            })
            .collect();
        let hidden = outline.len();

        let renderer = CleanTextRenderer::new(self.marker);
        let mut line_start = 0;
        for line in text.split('\n') {
            if let Some((level, heading)) = heading_line(line) {
                outline.push(OutlineEntry {
                    level,
                    text: renderer.render(heading).trim().to_string(),
                    position: line_start,
                });
            }
            line_start += line.len() + 1;
        }

        // Stable, so a hidden heading keeps its place ahead of a line starting at the same spot.
        outline.sort_by_key(|entry| entry.position);
        tracing::debug!(
            "[OutlineExtractor::extract] {} hidden and {} visible headings",
            hidden,
            outline.len() - hidden
        );
        outline
    }
}

/// `## Text` at the start of a line: one or more `#`, at least one space or tab, then the text.
fn heading_line(line: &str) -> Option<(usize, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.trim_start_matches('#');
    let level = line.len() - rest.len();
    if level == 0 || !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim_start_matches([' ', '\t'])))
}

/// Outline with the default marker.
pub fn document_outline(text: &str) -> Vec<OutlineEntry> {
    OutlineExtractor::default().extract(text)
}
