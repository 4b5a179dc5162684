use criterion::{criterion_group, criterion_main, Criterion};
use lrkit::{first_follow::FirstSets, grammar::Grammar, table, Algorithm, Config};
use lrkit_tests::grammars::{self, GrammarFn};
use std::hint::black_box;

criterion_main!(benches);
criterion_group!(benches, bench_tables, bench_automata);

fn bench_tables(c: &mut Criterion) {
    for &(name, f) in grammars::ALL {
        bench_table_gen(c, name, f);
    }
}

fn bench_automata(c: &mut Criterion) {
    // these grammars have conflicts, so only the construction is measured.
    bench_automaton_gen(c, "g2", grammars::g2);
    bench_automaton_gen(c, "min_caml", grammars::min_caml);
}

fn bench_table_gen(c: &mut Criterion, name: &str, f: GrammarFn) {
    let grammar = Grammar::define(f).unwrap();

    let mut group = c.benchmark_group(name);
    for (label, algorithm) in [
        ("LR0", Algorithm::LR0),
        ("SLR1", Algorithm::SLR1),
        ("LALR1", Algorithm::LALR1),
        ("LR1", Algorithm::LR1),
    ] {
        let mut config = Config::new();
        config.set_algorithm(algorithm);
        group.bench_function(label, |b| {
            b.iter(|| black_box(config.generate(&grammar)));
        });
    }
    group.finish();
}

fn bench_automaton_gen(c: &mut Criterion, name: &str, f: GrammarFn) {
    let grammar = Grammar::define(f).unwrap();

    let mut group = c.benchmark_group(name);
    group.bench_function("LR1", |b| {
        b.iter(|| {
            let first = FirstSets::new(&grammar);
            black_box(lrkit::automaton::lr1(&grammar, &first))
        });
    });
    group.bench_function("LALR1", |b| {
        b.iter(|| {
            let automaton = Config::new().use_lalr1().automaton(&grammar);
            black_box(table::synthesize(&grammar, &automaton, None))
        });
    });
    group.finish();
}
