// Reference table of vehicle makes and models sold in the Brazilian
// market. Used by the manual vehicle filter and the /api/makes endpoints.
// Catalog compatibility strings are free text, so this list is reference
// data, not a constraint on what merchants may enter.

use crate::normalize::normalize;
use once_cell::sync::Lazy;

static MAKES: Lazy<Vec<(&'static str, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            "Chevrolet",
            vec!["Onix", "Prisma", "Celta", "Cruze", "Tracker", "S10", "Spin", "Montana"],
        ),
        (
            "Volkswagen",
            vec!["Gol", "Polo", "Virtus", "Fox", "Voyage", "Saveiro", "T-Cross", "Nivus"],
        ),
        (
            "Fiat",
            vec!["Uno", "Palio", "Argo", "Mobi", "Cronos", "Strada", "Toro", "Pulse"],
        ),
        (
            "Ford",
            vec!["Ka", "Fiesta", "EcoSport", "Focus", "Ranger"],
        ),
        (
            "Hyundai",
            vec!["HB20", "HB20S", "Creta", "Tucson"],
        ),
        (
            "Toyota",
            vec!["Corolla", "Etios", "Yaris", "Hilux", "Corolla Cross"],
        ),
        (
            "Honda",
            vec!["Civic", "Fit", "City", "HR-V", "WR-V"],
        ),
        (
            "Renault",
            vec!["Kwid", "Sandero", "Logan", "Duster", "Oroch"],
        ),
        (
            "Nissan",
            vec!["March", "Versa", "Kicks", "Frontier"],
        ),
        (
            "Jeep",
            vec!["Renegade", "Compass", "Commander"],
        ),
    ]
});

/// All reference makes, in display order.
pub fn all_makes() -> Vec<&'static str> {
    MAKES.iter().map(|(make, _)| *make).collect()
}

/// Models registered for `make`. The lookup is case- and
/// diacritic-insensitive; an unknown make yields None.
pub fn models_for_make(make: &str) -> Option<&'static [&'static str]> {
    let wanted = normalize(make);
    MAKES
        .iter()
        .find(|(name, _)| normalize(name) == wanted)
        .map(|(_, models)| models.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_make_lists_models() {
        let models = models_for_make("Chevrolet").expect("Chevrolet is in the table");
        assert!(models.contains(&"Onix"));
    }

    #[test]
    fn make_lookup_ignores_case() {
        assert!(models_for_make("chevrolet").is_some());
        assert!(models_for_make("VOLKSWAGEN").is_some());
    }

    #[test]
    fn unknown_make_yields_none() {
        assert!(models_for_make("Lada").is_none());
    }

    #[test]
    fn all_makes_is_not_empty() {
        assert!(all_makes().len() >= 10);
    }
}
