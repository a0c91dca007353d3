use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use service::validation::FieldValidator;

fn bench_validate_form(c: &mut Criterion) {
    let validator = FieldValidator::default();

    c.bench_function("validate_form_valid", |b| {
        b.iter(|| validator.validate_form(black_box("employee@company.com"), black_box("Secret123")));
    });

    c.bench_function("validate_form_invalid", |b| {
        b.iter(|| validator.validate_form(black_box("not-an-email"), black_box("123")));
    });
}

criterion_group!(benches, bench_validate_form);
criterion_main!(benches);
