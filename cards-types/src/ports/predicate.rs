//! Lookup predicates understood by the repository ports.
//!
//! Text comparisons are case-insensitive and treat the needle literally.
//! `matches` is the reference semantics every adapter must agree with.

use crate::domain::{Card, Holder};

/// Filters over cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardPredicate {
    /// Card number contains the needle.
    NumberContains(String),
    /// Holder name contains the needle.
    HolderContains(String),
    /// Both of the above, evaluated as one lookup.
    NumberAndHolderContain { number: String, holder: String },
    /// Holder name equals the value.
    HolderIs(String),
}

impl CardPredicate {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            CardPredicate::NumberContains(number) => contains(&card.number, number),
            CardPredicate::HolderContains(holder) => contains(&card.holder_name, holder),
            CardPredicate::NumberAndHolderContain { number, holder } => {
                contains(&card.number, number) && contains(&card.holder_name, holder)
            }
            CardPredicate::HolderIs(name) => fold_case(&card.holder_name) == fold_case(name),
        }
    }
}

/// Filters over holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderPredicate {
    /// Name contains the needle.
    NameContains(String),
    /// Name equals the value.
    NameIs(String),
}

impl HolderPredicate {
    pub fn matches(&self, holder: &Holder) -> bool {
        match self {
            HolderPredicate::NameContains(name) => contains(&holder.name, name),
            HolderPredicate::NameIs(name) => holder.is_named(name),
        }
    }
}

/// Case-folded form of `text` used for every case-insensitive comparison.
///
/// Adapters store and bind this form; SQL `lower()` is not used for names.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn contains(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardId, ExternalId, NewCard};
    use chrono::{NaiveDate, Utc};

    fn card(number: &str, holder: &str) -> Card {
        let now = Utc::now();
        NewCard {
            external_id: ExternalId::new(),
            number: number.to_string(),
            cvc: "123".to_string(),
            expiry: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            holder_name: holder.to_string(),
            balance: 0.0,
            created_at: now,
            updated_at: now,
        }
        .with_id(CardId::new(1))
    }

    #[test]
    fn test_holder_contains_ignores_case() {
        let c = card("1111-2222-3333-4444", "Ana Maria");
        assert!(CardPredicate::HolderContains("maria".into()).matches(&c));
        assert!(!CardPredicate::HolderContains("jose".into()).matches(&c));
    }

    #[test]
    fn test_combined_requires_both() {
        let c = card("1111-2222-3333-4444", "Ana");
        let both = CardPredicate::NumberAndHolderContain {
            number: "2222".into(),
            holder: "an".into(),
        };
        let wrong_holder = CardPredicate::NumberAndHolderContain {
            number: "2222".into(),
            holder: "jose".into(),
        };
        assert!(both.matches(&c));
        assert!(!wrong_holder.matches(&c));
    }

    #[test]
    fn test_holder_is_is_exact() {
        let c = card("1111222233334444", "Ana");
        assert!(CardPredicate::HolderIs("ANA".into()).matches(&c));
        assert!(!CardPredicate::HolderIs("An".into()).matches(&c));
    }

    #[test]
    fn test_non_ascii_names_fold() {
        let c = card("1111222233334444", "élodie");
        assert!(CardPredicate::HolderIs("Élodie".into()).matches(&c));
        assert!(CardPredicate::HolderContains("ÉLO".into()).matches(&c));
        assert_eq!(fold_case("ÉLODIE"), "élodie");
    }

    #[test]
    fn test_wildcards_are_literal() {
        let c = card("1111222233334444", "Ana");
        assert!(!CardPredicate::HolderContains("%".into()).matches(&c));
        assert!(!CardPredicate::NumberContains("_".into()).matches(&c));
    }
}
