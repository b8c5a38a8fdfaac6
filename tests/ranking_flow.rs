// tests/ranking_flow.rs
// Group -> score -> Top-N -> relative weighting over a hand-built batch,
// checking uniqueness, ordering and the sum-to-100 property end to end.

use std::collections::HashSet;

use licita_ranker::config::Weights;
use licita_ranker::rank::{apply_relative_weights, group_by_code, select_top_n};
use licita_ranker::tender::{Scores, ScoredTender, Tender};

fn tender(code: &str, category: &str, product: &str) -> Tender {
    Tender {
        external_code: code.to_string(),
        name: format!("licitacion {code}"),
        category: category.to_string(),
        product_code: product.to_string(),
        ..Default::default()
    }
}

fn scored(tender: Tender, category: f64, keyword: f64, monetary: f64, client: f64) -> ScoredTender {
    ScoredTender {
        tender,
        scores: Scores {
            category,
            keyword,
            monetary,
            client,
        },
    }
}

#[test]
fn grouped_batch_ranks_without_duplicate_codes() {
    // Three raw rows for A-1 (one per rubro), one each for the rest.
    let raw = vec![
        tender("A-1", "alimentos", "1001"),
        tender("A-1", "bebidas", "1002"),
        tender("A-1", "aseo", ""),
        tender("B-2", "construccion", "2001"),
        tender("C-3", "", ""),
    ];
    let grouped = group_by_code(raw);
    assert_eq!(grouped.len(), 3);
    assert_eq!(grouped[0].category, "alimentos bebidas aseo");

    let batch: Vec<ScoredTender> = grouped
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let v = (i + 1) as f64;
            scored(t, 5.0 * v, 10.0 * v, 20.0 * v, 0.0)
        })
        .collect();

    let ranked = apply_relative_weights(
        select_top_n(batch, 100),
        &Weights {
            category: 0.4,
            keyword: 0.3,
            client: 0.1,
            monetary: 0.2,
        },
    );

    let codes: HashSet<&str> = ranked.iter().map(|r| r.tender.external_code.as_str()).collect();
    assert_eq!(codes.len(), ranked.len(), "external codes must be unique after ranking");

    // ranks are 1-based and contiguous, ordered by final score
    for (i, row) in ranked.iter().enumerate() {
        assert_eq!(row.rank, i + 1);
        if i > 0 {
            assert!(ranked[i - 1].final_score >= row.final_score);
        }
    }
}

#[test]
fn top_n_cut_happens_before_relative_rescaling() {
    // 150 tenders; only the Top-100 take part in the relative sums.
    let batch: Vec<ScoredTender> = (0..150)
        .map(|i| {
            let t = tender(&format!("T-{i}"), "", "");
            scored(t, i as f64, 1.0, 0.0, 0.0)
        })
        .collect();

    let top = select_top_n(batch, 100);
    assert_eq!(top.len(), 100);
    // lexicographic ordering: highest category first
    assert_eq!(top[0].scores.category, 149.0);
    assert_eq!(top[99].scores.category, 50.0);

    let ranked = apply_relative_weights(
        top,
        &Weights {
            category: 1.0,
            keyword: 0.0,
            client: 0.0,
            monetary: 0.0,
        },
    );
    let sum_category: f64 = ranked.iter().map(|r| r.relative_category).sum();
    assert!((sum_category - 100.0).abs() < 1e-9);
    let sum_keyword: f64 = ranked.iter().map(|r| r.relative_keyword).sum();
    assert!((sum_keyword - 100.0).abs() < 0.5); // rounded presentation column
}

#[test]
fn zero_columns_do_not_poison_the_final_score() {
    let batch = vec![
        scored(tender("A-1", "", ""), 10.0, 0.0, 0.0, 0.0),
        scored(tender("B-2", "", ""), 30.0, 0.0, 0.0, 0.0),
    ];
    let ranked = apply_relative_weights(
        batch,
        &Weights {
            category: 0.5,
            keyword: 0.2,
            client: 0.2,
            monetary: 0.1,
        },
    );
    // keyword/monetary/client columns are all zero; final comes from category only
    assert_eq!(ranked[0].tender.external_code, "B-2");
    assert!(ranked.iter().all(|r| r.relative_keyword == 0.0));
    assert!(ranked.iter().all(|r| r.final_score.is_finite()));
}
