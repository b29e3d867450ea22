//! Behaviour every store backend must share. Run from each backend's tests.

use passvault_common::{Account, Error, OwnerId, RecordField, Sealed, SealedFields};

use crate::store::{AccountStore, RecordStore};

fn sealed(value: &str) -> Sealed {
    Sealed::from_stored(value)
}

fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

pub(crate) async fn run_record_suite(store: &dyn RecordStore) {
    create_assigns_ids_and_owner(store).await;
    list_is_owner_scoped(store).await;
    partial_update_keeps_other_fields(store).await;
    cross_owner_update_and_delete_miss(store).await;
    delete_twice_reports_missing(store).await;
}

pub(crate) async fn run_account_suite(store: &dyn AccountStore) {
    let account = Account::new("alice@example.com", "$argon2id$hash");
    let created = store.create_account(account.clone()).await.unwrap();
    assert_eq!(created, account);

    let found = store
        .find_account_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, account.id);
    assert_eq!(found.password_hash, "$argon2id$hash");

    let duplicate = store
        .create_account(Account::new("alice@example.com", "other"))
        .await;
    assert!(matches!(duplicate, Err(Error::AlreadyExists(_))));

    assert!(store
        .find_account_by_email("bob@example.com")
        .await
        .unwrap()
        .is_none());
}

async fn create_assigns_ids_and_owner(store: &dyn RecordStore) {
    let o = owner("creator");
    let fields = SealedFields::default().with(RecordField::Title, sealed("ct-title"));

    let a = store.create(&o, fields.clone()).await.unwrap();
    let b = store.create(&o, fields).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.owner_id, o);
    assert_eq!(a.fields.title, Some(sealed("ct-title")));
    assert!(a.fields.username.is_none());
}

async fn list_is_owner_scoped(store: &dyn RecordStore) {
    let a = owner("list-a");
    let b = owner("list-b");
    let first = store
        .create(&a, SealedFields::default().with(RecordField::Title, sealed("a1")))
        .await
        .unwrap();
    let second = store
        .create(&a, SealedFields::default().with(RecordField::Title, sealed("a2")))
        .await
        .unwrap();
    store
        .create(&b, SealedFields::default().with(RecordField::Title, sealed("b1")))
        .await
        .unwrap();

    let listed = store.find_all_by_owner(&a).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.owner_id == a));
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);

    assert!(store
        .find_all_by_owner(&owner("list-nobody"))
        .await
        .unwrap()
        .is_empty());
}

async fn partial_update_keeps_other_fields(store: &dyn RecordStore) {
    let o = owner("patcher");
    let original = SealedFields::default()
        .with(RecordField::Title, sealed("t0"))
        .with(RecordField::Username, sealed("u0"))
        .with(RecordField::Password, sealed("p0"))
        .with(RecordField::Url, sealed("l0"))
        .with(RecordField::Notes, sealed("n0"));
    let record = store.create(&o, original).await.unwrap();

    let patch = SealedFields::default()
        .with(RecordField::Title, sealed("t1"))
        .with(RecordField::Notes, sealed("n1"));
    let updated = store
        .update_by_id_and_owner(&record.id, &o, patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, record.id);
    assert_eq!(updated.fields.title, Some(sealed("t1")));
    assert_eq!(updated.fields.notes, Some(sealed("n1")));
    assert_eq!(updated.fields.username, Some(sealed("u0")));
    assert_eq!(updated.fields.password, Some(sealed("p0")));
    assert_eq!(updated.fields.url, Some(sealed("l0")));

    let listed = store.find_all_by_owner(&o).await.unwrap();
    assert_eq!(listed, vec![updated]);
}

async fn cross_owner_update_and_delete_miss(store: &dyn RecordStore) {
    let a = owner("iso-a");
    let b = owner("iso-b");
    let record = store
        .create(&a, SealedFields::default().with(RecordField::Password, sealed("pa")))
        .await
        .unwrap();

    let patch = SealedFields::default().with(RecordField::Password, sealed("stolen"));
    assert!(store
        .update_by_id_and_owner(&record.id, &b, patch)
        .await
        .unwrap()
        .is_none());
    assert!(!store.delete_by_id_and_owner(&record.id, &b).await.unwrap());

    let listed = store.find_all_by_owner(&a).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].fields.password, Some(sealed("pa")));
    assert_eq!(listed[0].owner_id, a);
}

async fn delete_twice_reports_missing(store: &dyn RecordStore) {
    let o = owner("deleter");
    let record = store.create(&o, SealedFields::default()).await.unwrap();

    assert!(store.delete_by_id_and_owner(&record.id, &o).await.unwrap());
    assert!(!store.delete_by_id_and_owner(&record.id, &o).await.unwrap());
    assert!(store.find_all_by_owner(&o).await.unwrap().is_empty());
}
