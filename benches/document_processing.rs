//! Performance benchmarks for document processing
//!
//! A generated multi-chapter manuscript is run through:
//! - The full parse (clean text, outline and entity graph)
//! - Clean-text rendering alone
//! - Entity graph building with and without implicit occurrence scanning
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use musetag_core::{clean_text, config::ParserConfig, graph::GraphBuilder, parse};

const CHAPTERS: usize = 40;

// Each chapter declares a handful of entities, relates them, and mentions earlier ones bare.
fn generate_manuscript() -> String {
    let mut text = String::new();
    for chapter in 0..CHAPTERS {
        text.push_str(&format!("@@.(# Chapter {chapter})\n\n"));
        text.push_str(&format!(
            "@@(1905-12-{:02} 12:00).Event\n",
            chapter % 28 + 1
        ));
        text.push_str(&format!(
            "@@Hero_{chapter}.Mood(restless) walked to @@@(Town_{chapter}).Place.ChildOf(Realm).\n"
        ));
        text.push_str(&format!(
            "@@@@(ring_{chapter}).Object.PartOf(@@Hero_{chapter}) glinted. @@Hero_{chapter}.DIALOG[ said nothing.]\n\n"
        ));
        if chapter > 0 {
            text.push_str(&format!(
                "Hero {} remembered Town {} and the ring_{}.\n\n",
                chapter - 1,
                chapter - 1,
                chapter - 1
            ));
        }
        text.push_str("@@(Realm).Place.Alias(the kingdom) watched over the kingdom.\n\n");
    }
    text
}

fn bench_full_parse(c: &mut Criterion) {
    let manuscript = generate_manuscript();
    c.bench_function("parse_manuscript", |b| {
        b.iter(|| parse(black_box(&manuscript)).entities.len())
    });
}

fn bench_clean_text(c: &mut Criterion) {
    let manuscript = generate_manuscript();
    c.bench_function("clean_text", |b| {
        b.iter(|| clean_text(black_box(&manuscript)).len())
    });
}

fn bench_graph_without_implicit(c: &mut Criterion) {
    let manuscript = generate_manuscript();
    let builder = GraphBuilder::new(&ParserConfig {
        implicit_occurrences: false,
        ..Default::default()
    });
    c.bench_function("graph_explicit_only", |b| {
        b.iter(|| builder.build(black_box(&manuscript)).len())
    });
}

criterion_group!(
    benches,
    bench_full_parse,
    bench_clean_text,
    bench_graph_without_implicit
);
criterion_main!(benches);
