//! Ledger replay benchmarks.
//!
//! Run with: cargo bench -p booklend-core

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use booklend_core::{ledger, Book, BookDraft, Ledger, LoanAction, MemberType, Transaction};

const MEMBERS: [&str; 4] = ["ALI", "SITI", "CHONG", "RAVI"];

/// Generate a ledger with N records spread over a few members and books.
fn generate_ledger(num_records: usize) -> Ledger {
    let books: Vec<Book> = (0..8)
        .map(|i| Book::from_draft(format!("B{i}"), BookDraft::new(format!("BOOK {i}"), "X", 1)).unwrap())
        .collect();
    let mut log = Ledger::new();
    for i in 0..num_records {
        let action = if i % 3 == 2 {
            LoanAction::Return
        } else {
            LoanAction::Borrow
        };
        log.record(Transaction::new(
            format!("T{i}"),
            &books[i % books.len()],
            action,
            (MEMBERS[i % MEMBERS.len()], MemberType::Student),
            1,
            i as i64,
        ));
    }
    log
}

fn bench_active_loans(c: &mut Criterion) {
    let mut group = c.benchmark_group("active_loans");

    for size in [10, 100, 1000] {
        let log = generate_ledger(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(log.active_loans("ALI")));
        });
    }

    group.finish();
}

fn bench_fine_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("fine_summary");

    for size in [100, 1000] {
        let log = generate_ledger(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(ledger::fine_summary(log.entries())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_active_loans, bench_fine_summary);
criterion_main!(benches);
