use criterion::{black_box, criterion_group, criterion_main, Criterion};
use aat_reconcile::{
    core::RawMatch,
    providers::parser::parse_term_match,
    ranking::{token_sort_ratio, Ranker, TokenSortRanker},
};

fn create_test_matches(count: usize) -> Vec<RawMatch> {
    (0..count)
        .map(|i| RawMatch::new(format!("Neo-Romantic style {} ", i), (300_021_476 + i).to_string()))
        .collect()
}

fn create_test_response(count: usize) -> String {
    let subjects: String = (0..count)
        .map(|i| {
            format!(
                "<Subject><Preferred_Parent>Romantic variant {} [{}], styles and periods by general era</Preferred_Parent></Subject>",
                i,
                300_000_000 + i
            )
        })
        .collect();
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?><Vocabulary>{}</Vocabulary>", subjects)
}

fn bench_token_sort_ratio(c: &mut Criterion) {
    c.bench_function("token_sort_ratio", |b| {
        b.iter(|| black_box(token_sort_ratio("Romantic Neo", "Neo-Romantic style")));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = TokenSortRanker::new();

    let matches_10 = create_test_matches(10);
    let matches_100 = create_test_matches(100);

    c.bench_function("token_sort_rank_10", |b| {
        b.iter(|| black_box(ranker.rank("romantic style 5", matches_10.clone())));
    });

    c.bench_function("token_sort_rank_100", |b| {
        b.iter(|| black_box(ranker.rank("romantic style 50", matches_100.clone())));
    });
}

fn bench_parse_response(c: &mut Criterion) {
    let response = create_test_response(50);

    c.bench_function("parse_term_match_50", |b| {
        b.iter(|| black_box(parse_term_match(&response).unwrap()));
    });
}

criterion_group!(benches, bench_token_sort_ratio, bench_ranking, bench_parse_response);
criterion_main!(benches);
