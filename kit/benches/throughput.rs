use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

const SAMPLE_SECTIONS: &[&str] = &[
    "[server]\nhost = \"127.0.0.1\"\nport = 8080\nenabled = true\n",
    "[[products]]\nname = \"Hammer\"\nsku = 738_594_937\nprice = 12.5\n",
    "[owner]\nname = \"Tom \\\"T\\\" P-W\"\ndob = 1979-05-27T07:32:00-08:00\n",
    "[database]\nports = [8000, 8001, 8002]\ntargets = { cpu = 79.5, case = 72.0 }\n",
];

/// A document with `count` sections, each under a distinct table name.
fn generate_toml(count: usize) -> String {
    let mut result = String::with_capacity(count * 80);
    for i in 0..count {
        let section = SAMPLE_SECTIONS[i % SAMPLE_SECTIONS.len()];
        let section = match section.split_once(']') {
            Some((head, tail)) if !head.starts_with("[[") => format!("{head}_{i}]{tail}"),
            _ => section.to_string(),
        };
        result.push_str(&section);
        result.push('\n');
    }
    result
}

// ANCHOR: benchmarks
#[divan::bench(args = [100, 1000, 10_000, 100_000])]
fn tokenize(bencher: Bencher, n: usize) {
    let input = generate_toml(n);

    bencher
        .counter(divan::counter::BytesCount::new(input.len()))
        .bench(|| black_box(tomltree::tokenize(black_box(&input))));
}

#[divan::bench(args = [100, 1000, 10_000, 100_000])]
fn parse(bencher: Bencher, n: usize) {
    let input = generate_toml(n);

    bencher
        .counter(divan::counter::BytesCount::new(input.len()))
        .bench(|| black_box(tomltree::parse(black_box(&input))));
}

#[divan::bench(args = [100, 1000, 10_000])]
fn to_json(bencher: Bencher, n: usize) {
    let toml = tomltree::parse(&generate_toml(n));

    bencher.bench(|| black_box(toml.to_json()));
}
// ANCHOR_END: benchmarks
