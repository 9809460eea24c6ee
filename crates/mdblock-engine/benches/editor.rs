use criterion::{Criterion, criterion_group, criterion_main};
use mdblock_engine::{BlockEditor, EditorConfig, MemoryDom, split_blocks};
use std::hint::black_box;

fn large_document(blocks: usize) -> String {
    (0..blocks)
        .map(|i| format!("## Heading {i}\n\nParagraph {i} with *emphasis* and `code`."))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn bench_split(c: &mut Criterion) {
    let doc = large_document(500);
    c.bench_function("split_blocks_1000", |b| {
        b.iter(|| split_blocks(black_box(&doc)))
    });
}

fn bench_load(c: &mut Criterion) {
    let doc = large_document(200);
    c.bench_function("load_400_blocks", |b| {
        b.iter(|| {
            let dom = MemoryDom::new();
            let body = dom.body();
            BlockEditor::new(dom, EditorConfig::new(body).with_markdown(doc.as_str())).unwrap()
        })
    });
}

fn bench_expanding_save(c: &mut Criterion) {
    let doc = large_document(200);
    c.bench_function("save_expansion_mid_document", |b| {
        b.iter_batched(
            || {
                let dom = MemoryDom::new();
                let body = dom.body();
                let mut editor =
                    BlockEditor::new(dom, EditorConfig::new(body).with_markdown(doc.as_str()))
                        .unwrap();
                editor.enable_editing(200).unwrap();
                editor.type_text("first half\n\nsecond half\n\n- and a list");
                editor
            },
            |mut editor| editor.save().unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_split, bench_load, bench_expanding_save);
criterion_main!(benches);
