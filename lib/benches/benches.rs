use criterion::{criterion_group, criterion_main, Criterion};

use pikere::Pattern;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
    sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut \
    enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut \
    aliquip ex ea commodo consequat. Contact: lorem.ipsum@example.com";

macro_rules! gen_bench {
    ($name:ident, $samples:expr, $desc:literal, $re:literal, $data:expr) => {
        fn $name(c: &mut Criterion) {
            let mut group = c.benchmark_group($desc);

            group.sample_size($samples);

            group.bench_function("compile", |b| {
                b.iter(|| Pattern::compile($re).unwrap());
            });

            group.bench_function("find_all", |b| {
                let pattern = Pattern::compile($re).unwrap();
                b.iter(|| {
                    let mut matcher = pattern.matcher($data);
                    let mut count = 0;
                    while matcher.find() {
                        count += 1;
                    }
                    count
                });
            });
        }
    };
}

/// Compares the literal fast path with the same literal executed by the VM.
fn bench_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("Literal");

    let trivial = Pattern::compile("consequat").unwrap();
    let vm = Pattern::builder()
        .literal_fast_path(false)
        .build("consequat")
        .unwrap();

    group.bench_function("substring search", |b| {
        b.iter(|| trivial.matcher(LOREM).find());
    });

    group.bench_function("vm", |b| {
        b.iter(|| vm.matcher(LOREM).find());
    });
}

gen_bench!(
    bench_alternation,
    50,
    "Alternation",
    "dolor|labore|magna|veniam",
    LOREM
);

gen_bench!(bench_words, 50, "Words", r"\b\w+\b", LOREM);

gen_bench!(
    bench_email,
    50,
    "E-mail",
    r"[\w.]+@(\w+)\.(com|org|net)",
    LOREM
);

gen_bench!(
    bench_lookaround,
    50,
    "Lookaround",
    r"(?<=\s)\w+(?=,)",
    LOREM
);

gen_bench!(bench_repetition, 20, "Repetition", r"(?:\w{2,5}\s){3}", LOREM);

criterion_group!(
    benches,
    bench_literal,
    bench_alternation,
    bench_words,
    bench_email,
    bench_lookaround,
    bench_repetition,
);

criterion_main!(benches);
