// Relevance scoring against the free-text query and the AI keyword context.

use crate::models::{AiResponse, Product, VehicleProfile};
use crate::normalize::{normalize, tokenize};
use std::collections::HashSet;

const USER_WORD_POINTS: u32 = 10;
const CONTEXT_WORD_POINTS: u32 = 2;
const VEHICLE_MATCH_BONUS: u32 = 5;

// Direct query words must be longer than 1 character, AI context words
// longer than 2; shorter fragments match almost everything by substring.
const USER_WORD_MIN_LEN: usize = 1;
const CONTEXT_WORD_MIN_LEN: usize = 2;

/// Ranks `products` by relevance to `query`, dropping everything that does
/// not score. A blank query is a pass-through: the candidate set and its
/// order come back unaltered.
///
/// The sort is stable and descending on score, so equal-score products keep
/// catalog order and repeated calls with identical input agree.
pub fn rank_by_relevance(
    products: Vec<Product>,
    query: &str,
    vehicle: Option<&VehicleProfile>,
    ai: &AiResponse,
) -> Vec<Product> {
    if query.trim().is_empty() {
        return products;
    }

    let user_words = tokenize(query, USER_WORD_MIN_LEN);
    let context_words = context_words(ai);

    let mut scored: Vec<(u32, Product)> = products
        .into_iter()
        .filter_map(|product| {
            let score = relevance_score(&product, &user_words, &context_words, vehicle);
            (score > 0).then_some((score, product))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, product)| product).collect()
}

// All searchable text fields of a product, normalized and concatenated.
fn haystack(product: &Product) -> String {
    let mut text = String::new();
    text.push_str(&product.name);
    text.push(' ');
    text.push_str(&product.description);
    text.push(' ');
    text.push_str(&product.category);
    for model in &product.compatible_models {
        text.push(' ');
        text.push_str(model);
    }
    normalize(&text)
}

// Union of the AI keyword list and the words of the suggested part type,
// normalized and de-duplicated.
fn context_words(ai: &AiResponse) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    let from_keywords = ai
        .keywords
        .iter()
        .flat_map(|keyword| tokenize(keyword, CONTEXT_WORD_MIN_LEN));
    let from_part_type = tokenize(&ai.suggested_part_type, CONTEXT_WORD_MIN_LEN);
    for word in from_keywords.chain(from_part_type) {
        if seen.insert(word.clone()) {
            words.push(word);
        }
    }
    words
}

fn relevance_score(
    product: &Product,
    user_words: &[String],
    context_words: &[String],
    vehicle: Option<&VehicleProfile>,
) -> u32 {
    let haystack = haystack(product);
    let mut score = 0;

    for word in user_words {
        if haystack.contains(word.as_str()) {
            score += USER_WORD_POINTS;
        }
    }
    for word in context_words {
        if haystack.contains(word.as_str()) {
            score += CONTEXT_WORD_POINTS;
        }
    }
    if let Some(profile) = vehicle {
        let model = normalize(&profile.model);
        if !model.is_empty()
            && product
                .compatible_models
                .iter()
                .any(|m| normalize(m).contains(&model))
        {
            score += VEHICLE_MATCH_BONUS;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: String::new(),
            price: 0.0,
            compatible_models: Vec::new(),
            specifications: Default::default(),
            updated_at: None,
        }
    }

    fn profile(model: &str) -> VehicleProfile {
        VehicleProfile {
            model: model.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_query_is_a_pass_through() {
        let products = vec![
            product("1", "Pastilha de Freio", ""),
            product("2", "Óleo Sintético", ""),
        ];
        let ranked = rank_by_relevance(products.clone(), "   ", None, &AiResponse::default());
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(ranked.len(), products.len());
    }

    #[test]
    fn zero_score_products_are_excluded() {
        let products = vec![
            product("pads", "Pastilha de Freio Dianteira Cerâmica", "Para sistema de freio"),
            product("oil", "Óleo Sintético 5W30", "Lubrificante para motor"),
        ];
        let ai = AiResponse {
            suggested_part_type: "Pastilha de Freio".to_string(),
            reasoning: String::new(),
            keywords: vec!["freio".to_string(), "pastilha".to_string()],
        };
        // "frear" is not a substring of "freio": only the AI context words hit.
        let ranked = rank_by_relevance(products, "barulho ao frear", None, &ai);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pads"]);
    }

    #[test]
    fn user_words_outscore_context_words() {
        let products = vec![
            product("ctx", "Pastilha dianteira", ""),
            product("direct", "Kit embreagem completo", ""),
        ];
        let ai = AiResponse {
            suggested_part_type: String::new(),
            reasoning: String::new(),
            keywords: vec!["pastilha".to_string()],
        };
        let ranked = rank_by_relevance(products, "embreagem", None, &ai);
        // 10 points for the direct hit beats 2 for the context hit.
        assert_eq!(ranked[0].id, "direct");
        assert_eq!(ranked[1].id, "ctx");
    }

    #[test]
    fn vehicle_bonus_applies_on_normalized_substring() {
        let mut compatible = product("a", "Filtro de ar", "");
        compatible.compatible_models = vec!["Chevrolet Ônix 2019".to_string()];
        let mut other = product("b", "Filtro de ar esportivo", "");
        other.compatible_models = vec!["Gol G5".to_string()];

        let ranked = rank_by_relevance(
            vec![other, compatible],
            "filtro",
            Some(&profile("Onix")),
            &AiResponse::default(),
        );
        // Both hit "filtro"; the bonus puts the compatible one first.
        assert_eq!(ranked[0].id, "a");
    }

    #[test]
    fn degrades_to_user_words_without_ai_context() {
        let products = vec![product("1", "Amortecedor traseiro", "")];
        let ranked =
            rank_by_relevance(products, "amortecedor", None, &AiResponse::default());
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn short_query_words_are_ignored() {
        let products = vec![product("1", "Correia dentada", "")];
        // Single-character words never count as user words.
        let ranked = rank_by_relevance(products, "a correia", None, &AiResponse::default());
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn repeated_calls_agree() {
        let products = vec![
            product("1", "Vela de ignição", "motor"),
            product("2", "Cabo de vela", "motor"),
        ];
        let ai = AiResponse::default();
        let first = rank_by_relevance(products.clone(), "vela motor", None, &ai);
        let second = rank_by_relevance(products, "vela motor", None, &ai);
        let first_ids: Vec<&str> = first.iter().map(|p| p.id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
