use criterion::{Criterion, criterion_group, criterion_main};
use journal_lexer::Lexer;
use std::hint::black_box;

fn journal_fixture(transactions: usize) -> String {
    let mut out = String::new();
    for i in 0..transactions {
        out.push_str(&format!(
            "2024-01-{:02} * grocery run {i} ; batch:{i}\n    expenses:food:market  $-{}.50\n    assets:checking\n\n",
            (i % 28) + 1,
            i + 1,
        ));
    }
    out
}

fn bench_lexer(c: &mut Criterion) {
    let small = journal_fixture(10);
    let large = journal_fixture(1_000);

    c.bench_function("lex_small_journal", |b| {
        b.iter(|| Lexer::new(black_box(&small)).count())
    });

    c.bench_function("lex_large_journal", |b| {
        b.iter(|| Lexer::new(black_box(&large)).count())
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
