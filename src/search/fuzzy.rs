//! Weighted scoring for typo-tolerant, partial-term search.

use serde::Serialize;

use crate::domain::aggregates::Product;

const EXACT_NAME: u32 = 100;
const EXACT_BRAND: u32 = 50;
const EXACT_DESCRIPTION: u32 = 30;
const WORD_NAME: u32 = 10;
const WORD_BRAND: u32 = 8;
const WORD_DESCRIPTION: u32 = 5;
const TAG: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: u32,
}

pub fn score(product: &Product, query: &str) -> u32 {
    let q = query.trim().to_lowercase();
    if q.is_empty() { return 0; }
    let name = product.name.to_lowercase();
    let brand = product.brand.to_lowercase();
    let description = product.description.to_lowercase();
    let words: Vec<&str> = q.split_whitespace().collect();

    let mut score = 0;
    if name.contains(&q) { score += EXACT_NAME; }
    if brand.contains(&q) { score += EXACT_BRAND; }
    if description.contains(&q) { score += EXACT_DESCRIPTION; }
    for word in &words {
        if name.contains(word) { score += WORD_NAME; }
        if brand.contains(word) { score += WORD_BRAND; }
        if description.contains(word) { score += WORD_DESCRIPTION; }
    }
    for tag in &product.tags {
        let tag = tag.to_lowercase();
        if words.iter().any(|w| tag.contains(w)) { score += TAG; }
    }
    score
}

/// Items with a positive score, best first; ties keep catalog order.
pub fn fuzzy_search(catalog: &[Product], query: &str, limit: usize) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = catalog
        .iter()
        .filter_map(|p| match score(p, query) {
            0 => None,
            s => Some(ScoredProduct { product: p.clone(), score: s }),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Money;

    fn catalog() -> Vec<Product> {
        vec![
            Product::create("1", "Ốp lưng iPhone 15", Money::vnd(150_000)).with_brand("Spigen").with_tags(["phụ kiện"]),
            Product::create("2", "iPhone 15 Pro Max", Money::vnd(29_990_000)).with_brand("Apple").with_description("Chip A17 Pro"),
            Product::create("3", "Galaxy Buds", Money::vnd(2_000_000)).with_brand("Samsung").with_description("Tai nghe cho điện thoại"),
            Product::create("4", "Cáp USB-C", Money::vnd(90_000)).with_brand("Anker").with_tags(["iphone", "sạc"]),
        ]
    }

    #[test]
    fn test_exact_name_ranks_above_partial_words() {
        let results = fuzzy_search(&catalog(), "iphone 15 pro", 10);
        assert_eq!(results[0].product.id, "2");
        assert!(results.iter().all(|r| r.score > 0));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_tag_only_match_scores_lowest() {
        let results = fuzzy_search(&catalog(), "iphone", 10);
        let ids: Vec<&str> = results.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert_eq!(results[2].score, TAG);
    }

    #[test]
    fn test_no_match_and_empty_query() {
        assert!(fuzzy_search(&catalog(), "nokia", 10).is_empty());
        assert!(fuzzy_search(&catalog(), "  ", 10).is_empty());
        assert_eq!(fuzzy_search(&catalog(), "iphone", 1).len(), 1);
    }

    #[test]
    fn test_brand_outweighs_description() {
        let brand = score(&catalog()[1], "apple");
        let desc = score(&catalog()[1], "a17");
        assert!(brand > desc);
    }
}
