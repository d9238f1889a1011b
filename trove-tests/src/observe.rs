use crate::{User, UserInput, clear};
use std::time::Duration;
use trove::{Change, Entity, Storage, Store, sync::broadcast::error::TryRecvError};

pub async fn observe<S: Store>(storage: &Storage<S>) {
    clear(storage).await;
    storage
        .insert::<User>(UserInput::new("uma", "Uma", 33))
        .await
        .expect("Failed to insert Uma");
    let mut uma = storage
        .query_one::<User>("uma".into())
        .await
        .expect("Failed to query Uma");

    // Entity changes
    let mut changes = uma.base().subscribe();
    uma.set_age(33);
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));
    uma.set_age(34);
    uma.set_name("Uma Thurman");
    assert_eq!(changes.try_recv(), Ok(Change { key: "age" }));
    assert_eq!(changes.try_recv(), Ok(Change { key: "name" }));
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));

    // Field values
    let mut email = uma.watch_email();
    assert_eq!(*email.borrow_and_update(), None);
    let watcher = tokio::spawn(async move {
        email
            .wait_for(|v| v.as_deref() == Some("uma@example.com"))
            .await
            .map(|v| (*v).clone())
    });
    uma.set_email(Some("uma@example.com"));
    let seen = tokio::time::timeout(Duration::from_secs(5), watcher)
        .await
        .expect("The watcher did not see the new email")
        .expect("The watcher task failed")
        .expect("The field publisher was dropped");
    assert_eq!(seen.as_deref(), Some("uma@example.com"));

    // Lazy load is observed
    let mut fresh = storage
        .query_one::<User>("uma".into())
        .await
        .expect("Failed to query Uma again");
    assert!(!fresh.age.is_loaded());
    let age = fresh.watch_age();
    assert_eq!(*age.borrow(), 33);
    storage.flush(&mut uma).await.expect("Failed to flush Uma");
    let mut check = storage
        .query_one::<User>("uma".into())
        .await
        .expect("Failed to query Uma once more");
    let age = check.watch_age();
    assert_eq!(*age.borrow(), 34);
}
