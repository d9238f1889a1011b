use crate::{User, UserInput, clear, silent_logs};
use trove::{Entity, Error, Storage, Store, StoreError, Where};

pub async fn stage<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Staged changes wait for the next save
    let mut users = vec![
        User::from_input(UserInput::new("quinn", "Quinn", 28)).expect("Failed to build Quinn"),
        User::from_input(UserInput::new("rosa", "Rosa", 36)).expect("Failed to build Rosa"),
    ];
    storage
        .stage(&mut users)
        .await
        .expect("Failed to stage the users");
    assert!(users.iter().all(|u| u.is_attached() && !u.is_dirty()));
    storage.save().await.expect("Failed to save");
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 2);

    // A committing operation saves the staged changes as well
    users[0].set_age(29);
    storage
        .stage(&mut users[..1])
        .await
        .expect("Failed to stage Quinn");
    let mut rosa = storage
        .insert::<User>(UserInput::new("rosa", "Rosa", 37))
        .await
        .expect("Failed to upsert Rosa");
    assert_eq!(rosa.age(), 37);
    let mut quinn = storage
        .query_one::<User>("quinn".into())
        .await
        .expect("Failed to query Quinn");
    assert_eq!(quinn.age(), 29);

    // A failure discards the staged changes too
    users[1].set_name("Rosalind");
    storage
        .stage(&mut users[1..])
        .await
        .expect("Failed to stage Rosa");
    silent_logs! {
        let result = storage
            .transaction(|_| Err::<(), _>(Error::msg("Abort")))
            .await;
        assert!(result.is_err());
    }
    let mut rosa = storage
        .query_one::<User>("rosa".into())
        .await
        .expect("Failed to query Rosa");
    assert_eq!(rosa.name(), "Rosa");

    // Saving with nothing pending is fine
    storage.save().await.expect("Failed to save nothing");

    // Flushing many commits at once
    let mut more = vec![
        User::from_input(UserInput::new("sam", "Sam", 40)).expect("Failed to build Sam"),
        User::from_input(UserInput::new("tina", "Tina", 41)).expect("Failed to build Tina"),
    ];
    storage
        .flush_many(&mut more)
        .await
        .expect("Failed to flush Sam and Tina");
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 4);

    // A rolled back row identity handed to another entity is never written
    let mut ghost = vec![User::from_input(UserInput::new("vera", "Vera", 30)).expect("Failed to build Vera")];
    storage
        .stage(&mut ghost)
        .await
        .expect("Failed to stage Vera");
    let ghost_row = ghost[0].row_id().expect("Vera is attached");
    silent_logs! {
        let result = storage
            .transaction(|_| Err::<(), _>(Error::msg("Abort")))
            .await;
        assert!(result.is_err());
    }
    let walt = storage
        .insert::<User>(UserInput::new("walt", "Walt", 33))
        .await
        .expect("Failed to insert Walt");
    assert_eq!(walt.row_id(), Some(ghost_row));
    ghost[0].set_name("Clobbered");
    let result;
    silent_logs! {
        result = storage.flush(&mut ghost[0]).await;
    }
    let error = result.expect_err("The staged row was rolled back");
    assert_eq!(
        StoreError::kind_of(&error),
        Some(&StoreError::RowDeleted {
            entity: "User".into(),
            row_id: ghost_row,
        })
    );
    assert!(ghost[0].is_dirty());
    let mut walt = storage
        .query_one::<User>("walt".into())
        .await
        .expect("Failed to query Walt");
    assert_eq!(walt.name(), "Walt");
    assert_eq!(
        storage
            .count::<User>(Some(Where::id_equals("id", "vera")))
            .await
            .expect("Failed to count Vera"),
        0
    );
}
