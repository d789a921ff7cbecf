/// Spellings tried when looking a user-typed city name up: as typed, title case, upper case,
/// lower case. Duplicates are dropped, the order is kept.
pub(crate) fn name_variants(name: &str) -> Vec<String> {
    let candidates = [
        name.to_string(),
        title_case(name),
        name.to_uppercase(),
        name.to_lowercase(),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }

    variants
}

/// Upper-cases the first letter of every word and lower-cases the rest, where a word is any
/// run of alphabetic characters ("saint-étienne" becomes "Saint-Étienne").
pub(crate) fn title_case(name: &str) -> String {
    let mut titled = String::with_capacity(name.len());
    let mut previous_is_alpha = false;

    for ch in name.chars() {
        if ch.is_alphabetic() {
            if previous_is_alpha {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            titled.push(ch);
            previous_is_alpha = false;
        }
    }

    titled
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("LOS ANGELES"), "Los Angeles");
        assert_eq!(title_case("saint-étienne"), "Saint-Étienne");
        assert_eq!(title_case("o'fallon"), "O'Fallon");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_name_variants_order_and_dedup() {
        assert_eq!(
            name_variants("lonDon"),
            vec!["lonDon", "London", "LONDON", "london"]
        );

        // Already title case: the exact spelling and the title variant collapse.
        assert_eq!(name_variants("Paris"), vec!["Paris", "PARIS", "paris"]);
        assert_eq!(name_variants("123"), vec!["123"]);
    }
}
