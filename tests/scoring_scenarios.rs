// tests/scoring_scenarios.rs
// End-to-end scoring scenarios against a hand-built configuration.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use licita_ranker::config::{RankingConfig, Weights};
use licita_ranker::scoring::{score_tender, BLACKLIST_PENALTY};
use licita_ranker::tender::Tender;

fn config() -> RankingConfig {
    let keywords: HashSet<String> = ["salud", "equipos"].iter().map(|s| s.to_string()).collect();
    let blacklist: HashSet<String> = ["consumo humano"].iter().map(|s| s.to_string()).collect();
    let mut category_products = HashMap::new();
    category_products.insert(
        "alimentos".to_string(),
        vec!["1001".to_string(), "1002".to_string()],
    );
    let mut client_scores = HashMap::new();
    client_scores.insert("municipalidad de maipu".to_string(), 10);

    RankingConfig {
        keywords,
        blacklist,
        category_products,
        client_scores,
        weights: Weights {
            category: 0.4,
            keyword: 0.3,
            client: 0.1,
            monetary: 0.2,
        },
        min_publication_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        min_closing_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

#[test]
fn blacklisted_phrase_forces_keyword_penalty() {
    let tender = Tender {
        name: "compra equipos".into(),
        description: "para consumo humano".into(),
        ..Default::default()
    };
    let scores = score_tender(&tender, &config());
    assert_eq!(scores.keyword, BLACKLIST_PENALTY);
}

#[test]
fn category_and_product_match_scores_fifteen() {
    let tender = Tender {
        category: "Alimentos y Bebidas".into(),
        product_code: "1001".into(),
        ..Default::default()
    };
    let scores = score_tender(&tender, &config());
    assert_eq!(scores.category, 15.0);
}

#[test]
fn monetary_proxy_divides_base_by_duration() {
    let tender = Tender {
        type_code: "LP".into(),
        contract_duration: "10".into(),
        ..Default::default()
    };
    let scores = score_tender(&tender, &config());
    assert_eq!(scores.monetary, 100.0);
}

#[test]
fn client_reputation_lookup_is_diacritic_insensitive() {
    let known = Tender {
        organism_name: "Municipalidad de Maipú".into(),
        ..Default::default()
    };
    let unknown = Tender {
        organism_name: "Municipalidad Desconocida".into(),
        ..Default::default()
    };
    let cfg = config();
    assert_eq!(score_tender(&known, &cfg).client, 10.0);
    assert_eq!(score_tender(&unknown, &cfg).client, 0.0);
}

#[test]
fn total_is_exactly_the_sum_of_sub_scores() {
    let tender = Tender {
        name: "compra equipos de salud".into(),
        description: "reposicion".into(),
        category: "alimentos".into(),
        product_code: "1002".into(),
        type_code: "LE".into(),
        contract_duration: "4".into(),
        organism_name: "municipalidad de maipu".into(),
        ..Default::default()
    };
    let scores = score_tender(&tender, &config());
    assert_eq!(
        scores.total(),
        scores.category + scores.keyword + scores.monetary + scores.client
    );
    // and each part is what the model says it should be
    assert_eq!(scores.keyword, 20.0);
    assert_eq!(scores.category, 15.0);
    assert_eq!(scores.monetary, 25.0);
    assert_eq!(scores.client, 10.0);
}
