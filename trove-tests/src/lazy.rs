use crate::{User, UserInput, clear};
use std::collections::BTreeMap;
use trove::{Entity, Storage, Store, Value, Where};

pub async fn lazy<S: Store>(storage: &Storage<S>) {
    clear(storage).await;
    storage
        .insert::<User>(UserInput::new("dave", "Dave", 52))
        .await
        .expect("Failed to insert Dave");

    // Fields load on first read only
    let mut dave = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query Dave");
    assert!(dave.is_attached());
    assert!(!dave.name.is_loaded());
    assert!(!dave.age.is_loaded());
    assert_eq!(dave.name(), "Dave");
    assert!(dave.name.is_loaded());
    assert!(!dave.age.is_loaded());

    // Writing the same value is not a change, flushing it writes nothing
    let updated = storage
        .update::<User>(
            BTreeMap::from([("name".into(), "David".into())]),
            Some(Where::id_equals("id", "dave")),
        )
        .await
        .expect("Failed to update Dave in bulk");
    assert_eq!(updated, 1);
    dave.set_name("Dave");
    assert!(!dave.is_dirty());
    assert!(!dave.name.is_dirty());
    storage
        .flush(&mut dave)
        .await
        .expect("Failed to flush the unchanged Dave");

    // A loaded value is not refreshed by a bulk update
    assert_eq!(dave.name(), "Dave");
    let mut fresh = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query Dave again");
    assert_eq!(fresh.name(), "David");
    assert_eq!(
        storage
            .update::<User>(BTreeMap::new(), None)
            .await
            .expect("An empty update does nothing"),
        0
    );

    // A pending write wins over the row
    let mut blind = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query Dave for a blind write");
    blind.set_age(53);
    assert!(blind.age.is_dirty());
    assert!(!blind.name.is_dirty());
    assert_eq!(blind.age(), 53);
    storage
        .flush(&mut blind)
        .await
        .expect("Failed to flush the blind write");
    let mut check = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to check the blind write");
    assert_eq!(check.age(), 53);
    assert_eq!(check.name(), "David");

    // Undecodable values are ignored at read time
    storage
        .update::<User>(
            BTreeMap::from([("age".into(), Value::Varchar("fifty".into()))]),
            Some(Where::id_equals("id", "dave")),
        )
        .await
        .expect("Failed to store an invalid age");
    let mut broken = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query the broken Dave");
    assert_eq!(broken.age(), 0);
    assert!(!broken.age.is_loaded());
    assert_eq!(broken.name(), "David");

    // Columns never written are null in the row
    let mut check = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query Dave");
    assert_eq!(check.email(), None);
    assert!(check.email.is_loaded());
    assert_eq!(check.tags(), Vec::<String>::new());
    assert!(!check.tags.is_loaded());

    // Handles of the same row see each other's flushed writes
    let mut first = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query the first handle");
    let mut second = storage
        .query_one::<User>("dave".into())
        .await
        .expect("Failed to query the second handle");
    assert_eq!(first.row_id(), second.row_id());
    second.set_email(Some("dave@example.com"));
    second.set_age(54);
    storage
        .flush(&mut second)
        .await
        .expect("Failed to flush the second handle");
    assert!(!first.email.is_loaded());
    assert_eq!(first.email(), Some("dave@example.com".to_string()));
    assert_eq!(first.age(), 54);
}
