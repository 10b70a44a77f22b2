// Constraint filtering: independent, composable predicates narrowing the
// candidate set. Applied in a fixed order so later predicates see fewer
// products, but the result equals applying them all as an AND in any order.

use crate::models::{FilterCriteria, Product, VehicleProfile};
use crate::normalize::normalize;
use crate::vehicles;

// Specification value meaning "fits either side/position".
const BOTH_SIDES: &str = "Ambos";

// Attribute keys where the wildcard applies.
const SIDED_KEYS: [&str; 2] = ["side", "position"];

/// Applies every active predicate from `criteria`. Unset criteria fields
/// skip their predicate entirely; malformed or absent product data fails
/// closed for that one predicate, never the whole search.
pub fn apply_filters(
    products: Vec<Product>,
    criteria: &FilterCriteria,
    vehicle: Option<&VehicleProfile>,
) -> Vec<Product> {
    let mut remaining = products;

    if let Some(category) = criteria.category.as_deref() {
        if !category.is_empty() {
            remaining.retain(|p| p.category == category);
        }
    }

    if let Some(max_price) = criteria.max_price {
        if max_price > 0.0 {
            remaining.retain(|p| p.price <= max_price);
        }
    }

    match vehicle {
        Some(profile) if criteria.use_my_vehicle => {
            remaining.retain(|p| fits_vehicle(p, profile));
        }
        _ => {
            if let Some(model) = criteria.model.as_deref().filter(|m| !m.is_empty()) {
                remaining.retain(|p| p.compatible_models.iter().any(|m| m == model));
            } else if let Some(make) = criteria.make.as_deref().filter(|m| !m.is_empty()) {
                let models = vehicles::models_for_make(make).unwrap_or_default();
                remaining.retain(|p| {
                    p.compatible_models
                        .iter()
                        .any(|m| models.iter().any(|known| known == m))
                });
            }
        }
    }

    let active: Vec<(&String, &String)> = criteria
        .attributes
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();
    if !active.is_empty() {
        remaining.retain(|p| active.iter().all(|&(key, value)| matches_attribute(p, key, value)));
    }

    remaining
}

// My-vehicle compatibility: the profile model must appear in the product's
// compatible models (normalized substring), and any engine/valve codes the
// product does specify must contain the profile's codes. Unspecified
// product attributes impose no constraint.
fn fits_vehicle(product: &Product, profile: &VehicleProfile) -> bool {
    let model = normalize(&profile.model);
    if model.is_empty() {
        return false;
    }
    let model_matches = product
        .compatible_models
        .iter()
        .any(|m| normalize(m).contains(&model));
    if !model_matches {
        return false;
    }

    spec_contains(product, "engine", &profile.engine)
        && spec_contains(product, "valves", &profile.valves)
}

// Open-world check on one specification key: a product without the key is
// compatible; one with it must contain the profile's code as a normalized
// substring.
fn spec_contains(product: &Product, key: &str, code: &str) -> bool {
    let code = normalize(code);
    if code.is_empty() {
        return true;
    }
    match product.specifications.get(key) {
        Some(value) => normalize(value).contains(&code),
        None => true,
    }
}

fn matches_attribute(product: &Product, key: &str, value: &str) -> bool {
    match product.specifications.get(key) {
        Some(spec) => spec == value || (SIDED_KEYS.contains(&key) && spec == BOTH_SIDES),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: String::new(),
            price,
            compatible_models: Vec::new(),
            specifications: HashMap::new(),
            updated_at: None,
        }
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn empty_criteria_keeps_everything() {
        let products = vec![product("1", 10.0), product("2", 20.0)];
        let kept = apply_filters(products, &FilterCriteria::default(), None);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn price_ceiling_is_inclusive() {
        let products = vec![product("cheap", 49.90), product("pricey", 145.90)];
        let criteria = FilterCriteria {
            max_price: Some(100.0),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(products.clone(), &criteria, None)), vec!["cheap"]);

        let exact = FilterCriteria {
            max_price: Some(49.90),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(products, &exact, None)), vec!["cheap"]);
    }

    #[test]
    fn non_positive_ceiling_is_ignored() {
        let products = vec![product("1", 10.0)];
        let criteria = FilterCriteria {
            max_price: Some(0.0),
            ..Default::default()
        };
        assert_eq!(apply_filters(products, &criteria, None).len(), 1);
    }

    #[test]
    fn category_is_exact_equality() {
        let mut brake = product("brake", 10.0);
        brake.category = "Freios".to_string();
        let mut filter = product("filter", 10.0);
        filter.category = "Filtros".to_string();

        let criteria = FilterCriteria {
            category: Some("Freios".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(vec![brake, filter], &criteria, None)), vec!["brake"]);
    }

    #[test]
    fn my_vehicle_engine_code_must_be_contained() {
        let profile = VehicleProfile {
            model: "Onix".to_string(),
            engine: "1.0".to_string(),
            ..Default::default()
        };
        let mut fits = product("a", 10.0);
        fits.compatible_models = vec!["Onix".to_string()];
        fits.specifications
            .insert("engine".to_string(), "1.0/1.4".to_string());
        let mut wrong_engine = product("b", 10.0);
        wrong_engine.compatible_models = vec!["Onix".to_string()];
        wrong_engine
            .specifications
            .insert("engine".to_string(), "1.6".to_string());

        let criteria = FilterCriteria {
            use_my_vehicle: true,
            ..Default::default()
        };
        let kept = apply_filters(vec![fits, wrong_engine], &criteria, Some(&profile));
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn unspecified_engine_never_excludes() {
        let profile = VehicleProfile {
            model: "Onix".to_string(),
            engine: "1.4".to_string(),
            valves: "16v".to_string(),
            ..Default::default()
        };
        let mut open = product("open", 10.0);
        open.compatible_models = vec!["Onix LT".to_string()];

        let criteria = FilterCriteria {
            use_my_vehicle: true,
            ..Default::default()
        };
        assert_eq!(apply_filters(vec![open], &criteria, Some(&profile)).len(), 1);
    }

    #[test]
    fn manual_model_filter_is_exact_membership() {
        let mut exact = product("exact", 10.0);
        exact.compatible_models = vec!["Gol".to_string()];
        let mut partial = product("partial", 10.0);
        partial.compatible_models = vec!["Gol G5".to_string()];

        let criteria = FilterCriteria {
            model: Some("Gol".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(vec![exact, partial], &criteria, None)), vec!["exact"]);
    }

    #[test]
    fn manual_make_filter_uses_reference_models() {
        let mut chevy = product("chevy", 10.0);
        chevy.compatible_models = vec!["Onix".to_string()];
        let mut vw = product("vw", 10.0);
        vw.compatible_models = vec!["Gol".to_string()];

        let criteria = FilterCriteria {
            make: Some("Chevrolet".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(vec![chevy, vw], &criteria, None)), vec!["chevy"]);
    }

    #[test]
    fn manual_filters_ignored_when_my_vehicle_active() {
        let profile = VehicleProfile {
            model: "Onix".to_string(),
            ..Default::default()
        };
        let mut onix_part = product("onix", 10.0);
        onix_part.compatible_models = vec!["Onix".to_string()];

        // The manual model filter would exclude this product; the profile wins.
        let criteria = FilterCriteria {
            model: Some("Gol".to_string()),
            use_my_vehicle: true,
            ..Default::default()
        };
        assert_eq!(apply_filters(vec![onix_part], &criteria, Some(&profile)).len(), 1);
    }

    #[test]
    fn side_attribute_accepts_the_both_wildcard() {
        let mut front = product("front", 10.0);
        front
            .specifications
            .insert("side".to_string(), "Dianteira".to_string());
        let mut both = product("both", 10.0);
        both.specifications
            .insert("side".to_string(), "Ambos".to_string());
        let mut rear = product("rear", 10.0);
        rear.specifications
            .insert("side".to_string(), "Traseira".to_string());

        let mut attributes = HashMap::new();
        attributes.insert("side".to_string(), "Dianteira".to_string());
        let criteria = FilterCriteria {
            attributes,
            ..Default::default()
        };
        let kept = apply_filters(vec![front, both, rear], &criteria, None);
        assert_eq!(ids(&kept), vec!["front", "both"]);
    }

    #[test]
    fn wildcard_does_not_apply_to_other_keys() {
        let mut ambos = product("ambos", 10.0);
        ambos
            .specifications
            .insert("material".to_string(), "Ambos".to_string());

        let mut attributes = HashMap::new();
        attributes.insert("material".to_string(), "Cerâmica".to_string());
        let criteria = FilterCriteria {
            attributes,
            ..Default::default()
        };
        assert!(apply_filters(vec![ambos], &criteria, None).is_empty());
    }

    #[test]
    fn product_without_specifications_fails_attribute_criteria() {
        let bare = product("bare", 10.0);
        let mut attributes = HashMap::new();
        attributes.insert("side".to_string(), "Dianteira".to_string());
        let criteria = FilterCriteria {
            attributes,
            ..Default::default()
        };
        assert!(apply_filters(vec![bare], &criteria, None).is_empty());
    }

    #[test]
    fn empty_attribute_values_are_wildcards() {
        let bare = product("bare", 10.0);
        let mut attributes = HashMap::new();
        attributes.insert("side".to_string(), String::new());
        let criteria = FilterCriteria {
            attributes,
            ..Default::default()
        };
        assert_eq!(apply_filters(vec![bare], &criteria, None).len(), 1);
    }

    #[test]
    fn predicates_commute() {
        let mut a = product("a", 80.0);
        a.category = "Freios".to_string();
        a.specifications
            .insert("side".to_string(), "Dianteira".to_string());
        let mut b = product("b", 300.0);
        b.category = "Freios".to_string();
        b.specifications
            .insert("side".to_string(), "Dianteira".to_string());
        let mut c = product("c", 50.0);
        c.category = "Suspensão".to_string();
        let products = vec![a, b, c];

        let mut attributes = HashMap::new();
        attributes.insert("side".to_string(), "Dianteira".to_string());
        let all = FilterCriteria {
            category: Some("Freios".to_string()),
            max_price: Some(100.0),
            attributes: attributes.clone(),
            ..Default::default()
        };

        // Price-only then the rest vs everything at once: same final set.
        let price_only = FilterCriteria {
            max_price: Some(100.0),
            ..Default::default()
        };
        let rest = FilterCriteria {
            category: Some("Freios".to_string()),
            attributes,
            ..Default::default()
        };
        let staged = apply_filters(apply_filters(products.clone(), &price_only, None), &rest, None);
        let combined = apply_filters(products, &all, None);
        assert_eq!(ids(&staged), ids(&combined));
        assert_eq!(ids(&combined), vec!["a"]);
    }
}
