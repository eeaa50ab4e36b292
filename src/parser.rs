use crate::{
    config::ParserConfig,
    graph::GraphBuilder,
    outline::OutlineExtractor,
    properties::{OutlineEntry, ParseResult},
    render::CleanTextRenderer,
};

/// Runs the three independent consumers of a document (renderer, outline extractor, graph
/// builder) over the same raw text.
///
/// Parsing is a pure function of the text and the configuration; a parser can be reused for
/// any number of documents.
#[derive(Debug, Clone)]
pub struct MuseTagParser {
    config: ParserConfig,
    renderer: CleanTextRenderer,
    outline: OutlineExtractor,
    builder: GraphBuilder,
}

impl Default for MuseTagParser {
    fn default() -> Self {
        MuseTagParser::new(ParserConfig::default())
    }
}

impl MuseTagParser {
    pub fn new(config: ParserConfig) -> Self {
        MuseTagParser {
            renderer: CleanTextRenderer::new(config.marker),
            outline: OutlineExtractor::new(config.marker),
            builder: GraphBuilder::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[tracing::instrument(skip_all, fields(len = text.len()))]
    pub fn parse(&self, text: &str) -> ParseResult {
        let result = ParseResult {
            clean_text: self.renderer.render(text),
            entities: self.builder.build(text),
            outline: self.outline.extract(text),
        };
        tracing::debug!(
            "Parsed document: {} entities, {} outline entries",
            result.entities.len(),
            result.outline.len()
        );
        result
    }

    pub fn clean_text(&self, text: &str) -> String {
        self.renderer.render(text)
    }

    pub fn outline(&self, text: &str) -> Vec<OutlineEntry> {
        self.outline.extract(text)
    }
}

/// Parse `text` with the default configuration.
pub fn parse(text: &str) -> ParseResult {
    MuseTagParser::default().parse(text)
}
