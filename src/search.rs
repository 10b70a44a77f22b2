// The search pipeline: relevance scoring, constraint filtering, and the
// final presentation sort, run strictly in that order over one catalog
// snapshot. Everything here is pure and synchronous; the async
// collaborators (catalog fetch, AI suggestion) are awaited by the caller.

use crate::filters::apply_filters;
use crate::models::{AiResponse, FilterCriteria, Product, SortOrder, VehicleProfile};
use crate::scoring::rank_by_relevance;

// One search invocation's full input, owned by the caller. Holding this as
// a value keeps the pipeline free of hidden state between invocations.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub query: String,
    pub criteria: FilterCriteria,
    pub vehicle: Option<VehicleProfile>,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub products: Vec<Product>,
    pub match_count: usize,
    // Human-readable rationale from the keyword suggestion, when one ran.
    pub reasoning: Option<String>,
}

/// Runs scorer, constraint filters, and the optional price sort over a
/// catalog snapshot. Infallible: predicates fail closed on bad data, a
/// blank query skips scoring, and an empty AI response degrades scoring to
/// plain keyword matching.
pub fn run_search(catalog: &[Product], session: &SearchSession, ai: &AiResponse) -> SearchOutcome {
    // The scorer awards its compatibility bonus whenever a profile exists;
    // only the constraint filter is gated on the use-my-vehicle toggle.
    let vehicle = session.vehicle.as_ref();

    let candidates = rank_by_relevance(catalog.to_vec(), &session.query, vehicle, ai);
    let mut products = apply_filters(candidates, &session.criteria, vehicle);

    // An explicit price sort replaces the relevance order; they are
    // mutually exclusive presentation orders and price wins.
    match session.criteria.sort_order {
        SortOrder::Asc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::Desc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOrder::Unset => {}
    }

    let match_count = products.len();
    let reasoning = (!ai.reasoning.is_empty()).then(|| ai.reasoning.clone());

    SearchOutcome {
        products,
        match_count,
        reasoning,
    }
}
