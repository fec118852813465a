//! Minting throughput through the full ledger stack.

use academic_ledger_testkit::fixtures::{student_addresses, LedgerFixture};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

fn bench_mint(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("mint");

    for existing in [0usize, 50, 250] {
        // Mint one more token into a ledger already holding `existing`.
        group.bench_with_input(BenchmarkId::from_parameter(existing), &existing, |b, &existing| {
            b.iter_batched(
                || {
                    rt.block_on(async {
                        let fixture = LedgerFixture::new().await;
                        let students = student_addresses(existing + 1);
                        for student in &students {
                            fixture.enroll(student).await;
                        }
                        for student in &students[..existing] {
                            fixture.mint(student, "75").await.expect("mint");
                        }
                        (fixture, students[existing].clone())
                    })
                },
                |(fixture, student)| {
                    rt.block_on(async {
                        fixture.mint(&student, "90").await.expect("mint");
                    })
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let (fixture, token) = rt.block_on(async {
        let fixture = LedgerFixture::new().await;
        let student = &student_addresses(1)[0];
        fixture.enroll(student).await;
        let executed = fixture.mint(student, "80").await.expect("mint");
        let token = executed.response.created_index().unwrap_or_default().to_string();
        (fixture, token)
    });

    c.bench_function("verify_token", |b| {
        b.iter(|| rt.block_on(fixture.ledger.verify_token(&token)).expect("verify"))
    });
}

criterion_group!(benches, bench_mint, bench_verify);
criterion_main!(benches);
