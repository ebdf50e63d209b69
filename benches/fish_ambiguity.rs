use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cfgchart::{ChartParser, Grammar};

const GRAMMAR_SRC: &str = include_str!("../grammars/fish.cfg");

fn count(g: &Grammar, input: &[&str]) -> usize {
  g.parse(input).count()
}

fn first(g: &Grammar, input: &[&str]) -> usize {
  ChartParser::new(g)
    .with_max_results(1)
    .parse(input)
    .map(|t| t.height())
    .sum()
}

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = GRAMMAR_SRC.parse::<Grammar>().unwrap();
  let short_input = vec!["fish"; 11];
  let long_input = vec!["fish"; 23];

  c.bench_function("enumerate 11 fish", |b| {
    b.iter(|| count(black_box(&grammar), black_box(&short_input)))
  });

  c.bench_function("first parse of 23 fish", |b| {
    b.iter(|| first(black_box(&grammar), black_box(&long_input)))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
