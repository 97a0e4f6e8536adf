//! Behaviour every backend must share, run against each of them.
//!
//! Backends invoke [`repository_contract_tests!`] with an async setup
//! expression returning `(repository, guard)`; the guard keeps temporary
//! resources alive for the duration of the test.

use shortie_core::repository::Repository;
use shortie_core::{OwnerId, ShortId, StorageError, UrlMapping};

fn id(s: &str) -> ShortId {
    ShortId::new_unchecked(s)
}

fn owner(s: &str) -> OwnerId {
    OwnerId::new(s)
}

fn mapping(short_id: &str, url: &str) -> UrlMapping {
    UrlMapping::new(id(short_id), url)
}

pub(crate) async fn create_then_get_url_by_id<R: Repository>(repo: &R) {
    repo.create(&id("ab12cd34ef56"), "https://example.com", &OwnerId::anonymous())
        .await
        .unwrap();

    let url = repo.get_url_by_id(&id("ab12cd34ef56")).await.unwrap();
    assert_eq!(url, "https://example.com");

    let short_id = repo.get_id_by_url("https://example.com").await.unwrap();
    assert_eq!(short_id, id("ab12cd34ef56"));
}

pub(crate) async fn create_rejects_taken_url<R: Repository>(repo: &R) {
    repo.create(&id("ab12cd34ef56"), "https://example.com", &OwnerId::anonymous())
        .await
        .unwrap();

    let err = repo
        .create(&id("other-id"), "https://example.com", &OwnerId::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UrlAlreadyExists(_)));

    let err = repo.get_url_by_id(&id("other-id")).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub(crate) async fn create_rejects_taken_id<R: Repository>(repo: &R) {
    repo.create(&id("abc123"), "https://one.example", &owner("u1"))
        .await
        .unwrap();

    let err = repo
        .create(&id("abc123"), "https://two.example", &owner("u2"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::IdAlreadyExists(_)));

    let err = repo.get_id_by_url("https://two.example").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub(crate) async fn create_rejects_empty_id<R: Repository>(repo: &R) {
    let err = repo
        .create(&id(""), "https://example.com", &OwnerId::anonymous())
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::EmptyId);

    let err = repo
        .create_batch(
            &[mapping("ok-id", "https://a.example"), mapping("", "https://b.example")],
            &OwnerId::anonymous(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::EmptyId);

    let err = repo.get_id_by_url("https://a.example").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub(crate) async fn lookups_of_unknown_keys_are_not_found<R: Repository>(repo: &R) {
    let err = repo.get_url_by_id(&id("missing")).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    let err = repo.get_id_by_url("https://missing.example").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    let urls = repo.get_urls_by_owner(&owner("nobody")).await.unwrap();
    assert!(urls.is_empty());
}

pub(crate) async fn create_batch_stores_every_item<R: Repository>(repo: &R) {
    let items = [
        mapping("b1", "https://one.example"),
        mapping("b2", "https://two.example"),
        mapping("b3", "https://three.example"),
    ];
    repo.create_batch(&items, &owner("u1")).await.unwrap();

    for item in &items {
        let url = repo.get_url_by_id(&item.short_id).await.unwrap();
        assert_eq!(url, item.original_url);
        let short_id = repo.get_id_by_url(&item.original_url).await.unwrap();
        assert_eq!(short_id, item.short_id);
    }

    let owned = repo.get_urls_by_owner(&owner("u1")).await.unwrap();
    assert_eq!(owned.len(), 3);
}

pub(crate) async fn create_batch_is_atomic_on_url_collision<R: Repository>(repo: &R) {
    repo.create(&id("seed"), "https://taken.example", &owner("u1"))
        .await
        .unwrap();

    let err = repo
        .create_batch(
            &[
                mapping("n1", "https://fresh-1.example"),
                mapping("n2", "https://taken.example"),
                mapping("n3", "https://fresh-3.example"),
            ],
            &owner("u1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UrlAlreadyExists(_)));

    for short_id in ["n1", "n2", "n3"] {
        let err = repo.get_url_by_id(&id(short_id)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
    let owned = repo.get_urls_by_owner(&owner("u1")).await.unwrap();
    assert_eq!(owned, vec![mapping("seed", "https://taken.example")]);
}

pub(crate) async fn create_batch_is_atomic_on_id_collision<R: Repository>(repo: &R) {
    repo.create(&id("seed"), "https://seed.example", &owner("u1"))
        .await
        .unwrap();

    let err = repo
        .create_batch(
            &[
                mapping("n1", "https://fresh-1.example"),
                mapping("seed", "https://fresh-2.example"),
            ],
            &owner("u1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::IdAlreadyExists(_)));

    let err = repo.get_id_by_url("https://fresh-1.example").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub(crate) async fn create_batch_rejects_duplicates_within_batch<R: Repository>(repo: &R) {
    let err = repo
        .create_batch(
            &[
                mapping("d1", "https://dup.example"),
                mapping("d2", "https://dup.example"),
            ],
            &OwnerId::anonymous(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UrlAlreadyExists(_)));

    let err = repo
        .create_batch(
            &[
                mapping("same", "https://x.example"),
                mapping("same", "https://y.example"),
            ],
            &OwnerId::anonymous(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::IdAlreadyExists(_)));

    for url in ["https://dup.example", "https://x.example", "https://y.example"] {
        let err = repo.get_id_by_url(url).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}

pub(crate) async fn empty_batch_is_a_no_op<R: Repository>(repo: &R) {
    repo.create_batch(&[], &owner("u1")).await.unwrap();
    assert!(repo.get_urls_by_owner(&owner("u1")).await.unwrap().is_empty());
}

pub(crate) async fn soft_delete_keeps_the_url_reserved<R: Repository>(repo: &R) {
    repo.create(&id("x"), "https://deleted.example", &owner("u1"))
        .await
        .unwrap();
    repo.create(&id("y"), "https://kept.example", &owner("u1"))
        .await
        .unwrap();

    let deleted = repo.delete_batch(&owner("u1"), &[id("x")]).await.unwrap();
    assert_eq!(deleted, 1);

    let err = repo.get_url_by_id(&id("x")).await.unwrap_err();
    assert!(matches!(err, StorageError::Deleted(_)));

    let err = repo.get_id_by_url("https://deleted.example").await.unwrap_err();
    assert!(matches!(err, StorageError::Deleted(_)));

    let owned = repo.get_urls_by_owner(&owner("u1")).await.unwrap();
    assert_eq!(owned, vec![mapping("y", "https://kept.example")]);

    let err = repo
        .create(&id("fresh"), "https://deleted.example", &owner("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UrlAlreadyExists(_)));

    let err = repo
        .create(&id("x"), "https://another.example", &owner("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::IdAlreadyExists(_)));
}

pub(crate) async fn delete_by_other_owner_is_a_no_op<R: Repository>(repo: &R) {
    repo.create(&id("x"), "https://owned.example", &owner("u1"))
        .await
        .unwrap();

    let deleted = repo.delete_batch(&owner("u2"), &[id("x")]).await.unwrap();
    assert_eq!(deleted, 0);

    let url = repo.get_url_by_id(&id("x")).await.unwrap();
    assert_eq!(url, "https://owned.example");
}

pub(crate) async fn delete_skips_unknown_and_deleted_ids<R: Repository>(repo: &R) {
    repo.create(&id("a"), "https://a.example", &owner("u1"))
        .await
        .unwrap();
    repo.create(&id("b"), "https://b.example", &owner("u1"))
        .await
        .unwrap();

    assert_eq!(repo.delete_batch(&owner("u1"), &[id("a")]).await.unwrap(), 1);

    let deleted = repo
        .delete_batch(&owner("u1"), &[id("a"), id("b"), id("unknown")])
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(repo.delete_batch(&owner("u1"), &[]).await.unwrap(), 0);
    assert!(repo.get_urls_by_owner(&owner("u1")).await.unwrap().is_empty());
}

pub(crate) async fn owner_listing_is_scoped_to_owner<R: Repository>(repo: &R) {
    repo.create(&id("a1"), "https://a1.example", &owner("alice"))
        .await
        .unwrap();
    repo.create(&id("a2"), "https://a2.example", &owner("alice"))
        .await
        .unwrap();
    repo.create(&id("b1"), "https://b1.example", &owner("bob"))
        .await
        .unwrap();
    repo.create(&id("anon"), "https://anon.example", &OwnerId::anonymous())
        .await
        .unwrap();

    let mut alice = repo.get_urls_by_owner(&owner("alice")).await.unwrap();
    alice.sort_by(|a, b| a.short_id.cmp(&b.short_id));
    assert_eq!(
        alice,
        vec![
            mapping("a1", "https://a1.example"),
            mapping("a2", "https://a2.example"),
        ]
    );

    let anonymous = repo.get_urls_by_owner(&OwnerId::anonymous()).await.unwrap();
    assert_eq!(anonymous, vec![mapping("anon", "https://anon.example")]);
}

macro_rules! repository_contract_tests {
    ($setup:expr) => {
        mod contract_suite {
            use super::*;
            use crate::contract;

            #[tokio::test]
            async fn create_then_get_url_by_id() {
                let (repo, _guard) = $setup.await;
                contract::create_then_get_url_by_id(&repo).await;
            }

            #[tokio::test]
            async fn create_rejects_taken_url() {
                let (repo, _guard) = $setup.await;
                contract::create_rejects_taken_url(&repo).await;
            }

            #[tokio::test]
            async fn create_rejects_taken_id() {
                let (repo, _guard) = $setup.await;
                contract::create_rejects_taken_id(&repo).await;
            }

            #[tokio::test]
            async fn create_rejects_empty_id() {
                let (repo, _guard) = $setup.await;
                contract::create_rejects_empty_id(&repo).await;
            }

            #[tokio::test]
            async fn lookups_of_unknown_keys_are_not_found() {
                let (repo, _guard) = $setup.await;
                contract::lookups_of_unknown_keys_are_not_found(&repo).await;
            }

            #[tokio::test]
            async fn create_batch_stores_every_item() {
                let (repo, _guard) = $setup.await;
                contract::create_batch_stores_every_item(&repo).await;
            }

            #[tokio::test]
            async fn create_batch_is_atomic_on_url_collision() {
                let (repo, _guard) = $setup.await;
                contract::create_batch_is_atomic_on_url_collision(&repo).await;
            }

            #[tokio::test]
            async fn create_batch_is_atomic_on_id_collision() {
                let (repo, _guard) = $setup.await;
                contract::create_batch_is_atomic_on_id_collision(&repo).await;
            }

            #[tokio::test]
            async fn create_batch_rejects_duplicates_within_batch() {
                let (repo, _guard) = $setup.await;
                contract::create_batch_rejects_duplicates_within_batch(&repo).await;
            }

            #[tokio::test]
            async fn empty_batch_is_a_no_op() {
                let (repo, _guard) = $setup.await;
                contract::empty_batch_is_a_no_op(&repo).await;
            }

            #[tokio::test]
            async fn soft_delete_keeps_the_url_reserved() {
                let (repo, _guard) = $setup.await;
                contract::soft_delete_keeps_the_url_reserved(&repo).await;
            }

            #[tokio::test]
            async fn delete_by_other_owner_is_a_no_op() {
                let (repo, _guard) = $setup.await;
                contract::delete_by_other_owner_is_a_no_op(&repo).await;
            }

            #[tokio::test]
            async fn delete_skips_unknown_and_deleted_ids() {
                let (repo, _guard) = $setup.await;
                contract::delete_skips_unknown_and_deleted_ids(&repo).await;
            }

            #[tokio::test]
            async fn owner_listing_is_scoped_to_owner() {
                let (repo, _guard) = $setup.await;
                contract::owner_listing_is_scoped_to_owner(&repo).await;
            }
        }
    };
}

pub(crate) use repository_contract_tests;
