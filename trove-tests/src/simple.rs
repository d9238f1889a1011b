use crate::{User, UserInput, clear};
use trove::{Entity, Orderby, Pager, Storage, Store, Where};

pub async fn simple<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Insert
    let mut alice = storage
        .insert::<User>(UserInput {
            tags: vec!["admin".into(), "staff".into()],
            email: Some("alice@example.com".into()),
            ..UserInput::new("alice", "Alice", 34)
        })
        .await
        .expect("Failed to insert Alice");
    assert!(alice.is_attached());
    assert!(!alice.is_dirty());
    assert_eq!(alice.name(), "Alice");
    let others = storage
        .insert_many::<User>(
            vec![
                UserInput::new("bob", "Bob", 27),
                UserInput::new("carol", "Carol", 41),
            ],
            None,
        )
        .await
        .expect("Failed to insert Bob and Carol");
    assert_eq!(others.len(), 2);
    assert!(others.iter().all(Entity::is_attached));
    assert_ne!(others[0].row_id(), others[1].row_id());
    assert_eq!(
        storage.count::<User>(None).await.expect("Failed to count"),
        3
    );

    // Query one
    let mut user = storage
        .query_one::<User>("alice".into())
        .await
        .expect("Failed to query Alice");
    assert_eq!(user.row_id(), alice.row_id());
    assert_eq!(user.name(), "Alice");
    assert_eq!(user.age(), 34);
    assert_eq!(user.tags(), ["admin", "staff"]);
    assert_eq!(user.email().as_deref(), Some("alice@example.com"));

    // Query
    let filter = Where::with("\"age\" > ?").arg(30);
    let mut older = storage
        .query::<User>(Some(filter.clone()), None, Some(Orderby::ascending("age")))
        .await
        .expect("Failed to query the users older than 30");
    let names = older.iter_mut().map(User::name).collect::<Vec<_>>();
    assert_eq!(names, ["Alice", "Carol"]);
    assert_eq!(
        storage
            .count::<User>(Some(filter))
            .await
            .expect("Failed to count the users older than 30"),
        2
    );
    let nobody = storage
        .query::<User>(Some(Where::with("\"age\" > ?").arg(100)), None, None)
        .await
        .expect("An empty result is not an error");
    assert!(nobody.is_empty());

    // Page
    let mut page = storage
        .query::<User>(
            None,
            Some(Pager::new(1, 2)),
            Some(Orderby::descending("age")),
        )
        .await
        .expect("Failed to query the second page");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name(), "Bob");

    // Modify and flush
    user.set_age(35);
    assert!(user.is_dirty());
    storage.flush(&mut user).await.expect("Failed to flush Alice");
    assert!(!user.is_dirty());
    let mut user = storage
        .query_one::<User>("alice".into())
        .await
        .expect("Failed to query Alice again");
    assert_eq!(user.id(), "alice");
    assert_eq!(user.age(), 35);
    assert_eq!(user.name(), "Alice");
    assert_eq!(
        user.describe().to_string(),
        format!(
            "User {} {{ id: \"alice\", name: \"Alice\", age: 35, tags: <unloaded>, email: <unloaded> }}",
            user.row_id().expect("Alice is attached")
        )
    );
    user.set_name("Alicia");
    assert_eq!(
        user.describe().to_string(),
        format!(
            "User {} {{ id: \"alice\", name: \"Alicia\"*, age: 35, tags: <unloaded>, email: <unloaded> }}",
            user.row_id().expect("Alice is attached")
        )
    );
}
