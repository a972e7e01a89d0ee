//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use cards_types::{
        CardId, CardPredicate, CardRepository, ExternalId, HolderId, HolderPredicate,
        HolderRepository, NewCard, NewHolder, RepoError,
    };
    use chrono::{Duration, NaiveDate, Utc};

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_card(number: &str, holder: &str) -> NewCard {
        let now = Utc::now();
        NewCard {
            external_id: ExternalId::new(),
            number: number.to_string(),
            cvc: "123".to_string(),
            expiry: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            holder_name: holder.to_string(),
            balance: 100.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_holder(name: &str) -> NewHolder {
        let now = Utc::now();
        NewHolder {
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_card_assigns_id() {
        let repo = setup_repo().await;

        let first = repo.insert_card(new_card("1111-2222-3333-4444", "Ana")).await.unwrap();
        let second = repo.insert_card(new_card("5555666677778888", "Jose")).await.unwrap();

        assert_eq!(first.id, CardId::new(1));
        assert_eq!(second.id, CardId::new(2));
        assert_eq!(first.number, "1111-2222-3333-4444");
    }

    #[tokio::test]
    async fn test_card_round_trips_through_store() {
        let repo = setup_repo().await;

        let created = repo.insert_card(new_card("1111 2222 3333 4444", "Ana")).await.unwrap();

        let by_id = repo.find_card_by_id(created.id).await.unwrap().unwrap();
        let by_external = repo
            .find_card_by_external_id(created.external_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_id, created);
        assert_eq!(by_external, created);
    }

    #[tokio::test]
    async fn test_find_card_not_found() {
        let repo = setup_repo().await;

        assert!(repo.find_card_by_id(CardId::new(42)).await.unwrap().is_none());
        assert!(
            repo.find_card_by_external_id(ExternalId::new())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_all_cards_ordered_by_id() {
        let repo = setup_repo().await;

        repo.insert_card(new_card("1111222233334444", "Ana")).await.unwrap();
        repo.insert_card(new_card("5555666677778888", "Jose")).await.unwrap();
        repo.insert_card(new_card("9999000011112222", "Maria")).await.unwrap();

        let ids: Vec<i64> = repo
            .find_all_cards()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id.get())
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_cards_by_predicates() {
        let repo = setup_repo().await;

        repo.insert_card(new_card("1111-2222-3333-4444", "Ana Maria")).await.unwrap();
        repo.insert_card(new_card("1111-0000-0000-0000", "Jose")).await.unwrap();
        repo.insert_card(new_card("9999-0000-0000-0000", "MARIA")).await.unwrap();

        let by_number = repo
            .find_cards_by(&CardPredicate::NumberContains("1111".into()))
            .await
            .unwrap();
        assert_eq!(by_number.len(), 2);

        let by_holder = repo
            .find_cards_by(&CardPredicate::HolderContains("maria".into()))
            .await
            .unwrap();
        assert_eq!(by_holder.len(), 2);

        let both = repo
            .find_cards_by(&CardPredicate::NumberAndHolderContain {
                number: "1111".into(),
                holder: "maria".into(),
            })
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].holder_name, "Ana Maria");

        let exact = repo
            .find_cards_by(&CardPredicate::HolderIs("maria".into()))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].holder_name, "MARIA");
    }

    #[tokio::test]
    async fn test_needle_is_matched_literally() {
        let repo = setup_repo().await;

        repo.insert_card(new_card("1111222233334444", "Ana")).await.unwrap();

        let percent = repo
            .find_cards_by(&CardPredicate::HolderContains("%".into()))
            .await
            .unwrap();
        let underscore = repo
            .find_cards_by(&CardPredicate::HolderContains("A_a".into()))
            .await
            .unwrap();

        assert!(percent.is_empty());
        assert!(underscore.is_empty());
    }

    #[tokio::test]
    async fn test_exists_card_by() {
        let repo = setup_repo().await;

        repo.insert_card(new_card("1111222233334444", "Ana")).await.unwrap();

        assert!(
            repo.exists_card_by(&CardPredicate::HolderIs("ANA".into()))
                .await
                .unwrap()
        );
        assert!(
            !repo
                .exists_card_by(&CardPredicate::HolderIs("An".into()))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_replace_card() {
        let repo = setup_repo().await;

        let mut card = repo.insert_card(new_card("1111222233334444", "Ana")).await.unwrap();
        card.balance = 500.0;
        card.cvc = "999".to_string();
        card.updated_at = card.updated_at + Duration::seconds(5);

        let replaced = repo.replace_card(card.clone()).await.unwrap();
        let fetched = repo.find_card_by_id(card.id).await.unwrap().unwrap();

        assert_eq!(replaced, card);
        assert_eq!(fetched, card);
    }

    #[tokio::test]
    async fn test_replace_missing_card_is_not_found() {
        let repo = setup_repo().await;

        let card = new_card("1111222233334444", "Ana").with_id(CardId::new(7));
        let result = repo.replace_card(card).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_conflict() {
        let repo = setup_repo().await;

        let card = new_card("1111222233334444", "Ana");
        repo.insert_card(card.clone()).await.unwrap();
        let result = repo.insert_card(card).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_card() {
        let repo = setup_repo().await;

        let card = repo.insert_card(new_card("1111222233334444", "Ana")).await.unwrap();

        assert!(repo.delete_card_by_id(card.id).await.unwrap());
        assert!(!repo.delete_card_by_id(card.id).await.unwrap());
        assert!(repo.find_card_by_id(card.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_and_find_holder() {
        let repo = setup_repo().await;

        let holder = repo.insert_holder(new_holder("Ana")).await.unwrap();
        let fetched = repo.find_holder_by_id(holder.id).await.unwrap().unwrap();

        assert_eq!(holder.id, HolderId::new(1));
        assert_eq!(fetched, holder);
    }

    #[tokio::test]
    async fn test_holder_names_are_unique_ignoring_case() {
        let repo = setup_repo().await;

        repo.insert_holder(new_holder("Ana")).await.unwrap();
        let result = repo.insert_holder(new_holder("ANA")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_holders_by_name() {
        let repo = setup_repo().await;

        repo.insert_holder(new_holder("Ana Maria")).await.unwrap();
        repo.insert_holder(new_holder("Mariano")).await.unwrap();
        repo.insert_holder(new_holder("Jose")).await.unwrap();

        let containing = repo
            .find_holders_by(&HolderPredicate::NameContains("MARI".into()))
            .await
            .unwrap();
        let names: Vec<_> = containing.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Maria", "Mariano"]);

        let exact = repo
            .find_holders_by(&HolderPredicate::NameIs("jose".into()))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].name, "Jose");
    }

    #[tokio::test]
    async fn test_rename_holder_onto_existing_name_is_conflict() {
        let repo = setup_repo().await;

        repo.insert_holder(new_holder("Ana")).await.unwrap();
        let mut jose = repo.insert_holder(new_holder("Jose")).await.unwrap();
        jose.name = "ana".to_string();

        let result = repo.replace_holder(jose).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_holder_unreferenced() {
        let repo = setup_repo().await;

        let holder = repo.insert_holder(new_holder("Ana")).await.unwrap();
        let still_referenced = CardPredicate::HolderIs(holder.name.clone());

        assert!(
            repo.delete_holder_unreferenced(holder.id, &still_referenced)
                .await
                .unwrap()
        );
        assert!(repo.find_holder_by_id(holder.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_holder_with_cards_is_refused() {
        let repo = setup_repo().await;

        let holder = repo.insert_holder(new_holder("Ana")).await.unwrap();
        repo.insert_card(new_card("1111222233334444", "ana")).await.unwrap();
        let still_referenced = CardPredicate::HolderIs(holder.name.clone());

        let deleted = repo
            .delete_holder_unreferenced(holder.id, &still_referenced)
            .await
            .unwrap();

        assert!(!deleted);
        assert!(repo.find_holder_by_id(holder.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_accented_names_are_unique_ignoring_case() {
        let repo = setup_repo().await;

        repo.insert_holder(new_holder("Élodie")).await.unwrap();
        let result = repo.insert_holder(new_holder("élodie")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));

        let found = repo
            .find_holders_by(&HolderPredicate::NameContains("ÉLO".into()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Élodie");
    }

    #[tokio::test]
    async fn test_accented_holder_with_cards_is_not_deleted() {
        let repo = setup_repo().await;

        let holder = repo.insert_holder(new_holder("Élodie")).await.unwrap();
        let card = repo
            .insert_card(new_card("1111222233334444", "élodie"))
            .await
            .unwrap();
        let still_referenced = CardPredicate::HolderIs(holder.name.clone());

        assert!(still_referenced.matches(&card));
        assert!(repo.exists_card_by(&still_referenced).await.unwrap());
        let by_holder = repo
            .find_cards_by(&CardPredicate::HolderContains("ÉLOD".into()))
            .await
            .unwrap();
        assert_eq!(by_holder, vec![card]);

        let deleted = repo
            .delete_holder_unreferenced(holder.id, &still_referenced)
            .await
            .unwrap();

        assert!(!deleted);
        assert!(repo.find_holder_by_id(holder.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_holder_returns_false() {
        let repo = setup_repo().await;

        let still_referenced = CardPredicate::HolderIs("Nobody".into());
        let deleted = repo
            .delete_holder_unreferenced(HolderId::new(9), &still_referenced)
            .await
            .unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/nested/cards.db", dir.path().display());

        let id = {
            let repo = SqliteRepo::new(&url).await.unwrap();
            repo.insert_holder(new_holder("Ana")).await.unwrap().id
        };

        let reopened = SqliteRepo::new(&url).await.unwrap();
        let holder = reopened.find_holder_by_id(id).await.unwrap().unwrap();
        assert_eq!(holder.name, "Ana");
    }
}
