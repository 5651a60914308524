//! Integration tests for the address book over the in-memory record store.

use std::sync::Arc;

use common::{AddressId, UserId};
use domain::{
    AddressError, AddressInput, AddressService, DomainError, RegisterUser, User, UserService,
};
use record_store::{InMemoryRecordStore, RecordId, RecordStoreExt};

fn create_store() -> InMemoryRecordStore {
    InMemoryRecordStore::new(Arc::new(domain::collection_registry()))
}

fn input(label: &str) -> AddressInput {
    AddressInput {
        name: Some("Asha".to_string()),
        phone: Some("9999999999".to_string()),
        address: Some("12 Park Street".to_string()),
        city: Some("Kolkata".to_string()),
        state: Some("WB".to_string()),
        pincode: Some("700016".to_string()),
        label: Some(label.to_string()),
        ..AddressInput::default()
    }
}

async fn register(store: &InMemoryRecordStore) -> UserId {
    let (user_id, _) = UserService::new(store.clone())
        .register(RegisterUser::new("Asha", "asha@example.com"))
        .await
        .unwrap();
    user_id
}

#[tokio::test]
async fn default_flag_lifecycle() {
    let store = create_store();
    let user_id = register(&store).await;
    let service = AddressService::new(store.clone());

    service.add(user_id, input("Home")).await.unwrap();
    service.add(user_id, input("Work")).await.unwrap();
    let list = service.add(user_id, input("Other")).await.unwrap();
    let ids: Vec<_> = list.iter().map(|a| a.id).collect();

    for &target in ids.iter().rev() {
        let list = service.set_default(user_id, target).await.unwrap();
        let defaults: Vec<_> = list.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![target]);
    }

    let user = store
        .find_by_id_as::<User>(RecordId::from(user_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.doc.default_address().map(|a| a.id), Some(ids[0]));
}

#[tokio::test]
async fn deleting_default_leaves_no_default() {
    let store = create_store();
    let user_id = register(&store).await;
    let service = AddressService::new(store);

    let list = service.add(user_id, input("Home")).await.unwrap();
    service.add(user_id, input("Work")).await.unwrap();

    let list = service.delete(user_id, list[0].id).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(!list[0].is_default);
}

#[tokio::test]
async fn adding_after_emptying_list_is_default_again() {
    let store = create_store();
    let user_id = register(&store).await;
    let service = AddressService::new(store);

    let list = service.add(user_id, input("Home")).await.unwrap();
    service.delete(user_id, list[0].id).await.unwrap();

    let list = service.add(user_id, input("Work")).await.unwrap();
    assert!(list[0].is_default);
}

#[tokio::test]
async fn operations_on_missing_user() {
    let service = AddressService::new(create_store());
    let user_id = UserId::new();

    assert!(matches!(
        service.add(user_id, input("Home")).await,
        Err(DomainError::UserNotFound { .. })
    ));
    assert!(matches!(
        service.set_default(user_id, AddressId::new()).await,
        Err(DomainError::UserNotFound { .. })
    ));
}

#[tokio::test]
async fn delete_unknown_address_is_not_found() {
    let store = create_store();
    let user_id = register(&store).await;
    let service = AddressService::new(store);
    service.add(user_id, input("Home")).await.unwrap();

    let result = service.delete(user_id, AddressId::new()).await;
    assert!(matches!(
        result,
        Err(DomainError::Address(AddressError::AddressNotFound { .. }))
    ));
    assert_eq!(service.list(user_id).await.unwrap().len(), 1);
}
