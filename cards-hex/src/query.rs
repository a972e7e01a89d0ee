//! Lookup strategy selection for list operations.
//!
//! A blank filter (empty or whitespace only) is treated exactly like an
//! omitted one. Listing never fails with NotFound: no match is an empty list.

use cards_types::{
    Card, CardPredicate, CardRepository, Holder, HolderPredicate, HolderRepository, RepoError,
};

/// Drops filters that carry no text.
pub fn provided(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.trim().is_empty())
}

/// How a card listing is executed against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardQuery {
    /// Unfiltered enumeration.
    All,
    /// One predicate lookup; with both filters set this is the combined form.
    Matching(CardPredicate),
}

impl CardQuery {
    pub fn compose(number: Option<&str>, holder: Option<&str>) -> Self {
        match (provided(number), provided(holder)) {
            (None, None) => CardQuery::All,
            (Some(number), None) => {
                CardQuery::Matching(CardPredicate::NumberContains(number.to_string()))
            }
            (None, Some(holder)) => {
                CardQuery::Matching(CardPredicate::HolderContains(holder.to_string()))
            }
            (Some(number), Some(holder)) => {
                CardQuery::Matching(CardPredicate::NumberAndHolderContain {
                    number: number.to_string(),
                    holder: holder.to_string(),
                })
            }
        }
    }

    pub async fn execute<R: CardRepository + ?Sized>(
        &self,
        repo: &R,
    ) -> Result<Vec<Card>, RepoError> {
        match self {
            CardQuery::All => repo.find_all_cards().await,
            CardQuery::Matching(predicate) => repo.find_cards_by(predicate).await,
        }
    }
}

/// How a holder listing is executed against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderQuery {
    All,
    Matching(HolderPredicate),
}

impl HolderQuery {
    pub fn compose(name: Option<&str>) -> Self {
        match provided(name) {
            None => HolderQuery::All,
            Some(name) => HolderQuery::Matching(HolderPredicate::NameContains(name.to_string())),
        }
    }

    pub async fn execute<R: HolderRepository + ?Sized>(
        &self,
        repo: &R,
    ) -> Result<Vec<Holder>, RepoError> {
        match self {
            HolderQuery::All => repo.find_all_holders().await,
            HolderQuery::Matching(predicate) => repo.find_holders_by(predicate).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_lists_everything() {
        assert_eq!(CardQuery::compose(None, None), CardQuery::All);
        assert_eq!(HolderQuery::compose(None), HolderQuery::All);
    }

    #[test]
    fn test_blank_filters_count_as_absent() {
        assert_eq!(CardQuery::compose(Some(""), Some("   ")), CardQuery::All);
        assert_eq!(
            CardQuery::compose(Some(""), Some("Ana")),
            CardQuery::Matching(CardPredicate::HolderContains("Ana".into()))
        );
        assert_eq!(HolderQuery::compose(Some("")), HolderQuery::All);
    }

    #[test]
    fn test_single_filters() {
        assert_eq!(
            CardQuery::compose(Some("1111"), None),
            CardQuery::Matching(CardPredicate::NumberContains("1111".into()))
        );
        assert_eq!(
            HolderQuery::compose(Some("an")),
            HolderQuery::Matching(HolderPredicate::NameContains("an".into()))
        );
    }

    #[test]
    fn test_both_filters_combine_into_one_lookup() {
        assert_eq!(
            CardQuery::compose(Some("1111"), Some("Ana")),
            CardQuery::Matching(CardPredicate::NumberAndHolderContain {
                number: "1111".into(),
                holder: "Ana".into(),
            })
        );
    }
}
