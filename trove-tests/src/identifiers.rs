use crate::{Book, Genre, User, UserInput, book, clear};
use trove::{Entity, Storage, Store, StoreError};

pub async fn identifiers<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Empty identifiers never reach the store
    let mut anonymous = User::from_input(UserInput {
        name: "Nobody".into(),
        ..Default::default()
    })
    .expect("Failed to build an anonymous user");
    assert!(anonymous.is_empty());
    let error = storage
        .flush(&mut anonymous)
        .await
        .expect_err("Flushing an empty identifier must fail");
    assert!(StoreError::is(&error, |e| matches!(
        e,
        StoreError::InvalidIdentifier { .. }
    )));
    assert!(!anonymous.is_attached());
    assert!(anonymous.is_dirty());
    let error = storage
        .insert::<Book>(book(0, "Untitled", Genre::Unknown, 0.0))
        .await
        .expect_err("A zero integer identifier is empty");
    assert!(StoreError::is(&error, |e| matches!(
        e,
        StoreError::InvalidIdentifier { .. }
    )));
    let error = storage
        .query_one::<User>(String::new())
        .await
        .expect_err("Querying an empty identifier must fail");
    assert!(StoreError::is(&error, |e| matches!(
        e,
        StoreError::InvalidIdentifier { .. }
    )));
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 0);
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 0);

    // Missing
    let error = storage
        .query_one::<Book>(404)
        .await
        .expect_err("The book 404 does not exist");
    assert_eq!(
        StoreError::kind_of(&error),
        Some(&StoreError::NotFound {
            entity: "Book".into(),
            id: "404".into(),
        })
    );

    // Upsert by identifier
    let first = storage
        .insert::<Book>(book(7, "Dune", Genre::Science, 4.5))
        .await
        .expect("Failed to insert Dune");
    let mut second = Book::from_input(book(7, "Dune Messiah", Genre::Science, 4.5))
        .expect("Failed to build the book 7");
    storage
        .flush(&mut second)
        .await
        .expect("Failed to flush the book 7 again");
    assert_eq!(second.row_id(), first.row_id());
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 1);
    let mut found = storage
        .query_one::<Book>(7)
        .await
        .expect("Failed to query the book 7");
    assert_eq!(found.title(), "Dune Messiah");
    assert_eq!(found.genre(), Genre::Science);
    assert_eq!(found.rating(), 4.5);

    // Same identifier inserted twice in one call is one row
    let books = storage
        .insert_many::<Book>(
            vec![
                book(8, "Foundation", Genre::Science, 4.0),
                book(8, "Foundation and Empire", Genre::Science, 4.0),
            ],
            None,
        )
        .await
        .expect("Failed to insert the book 8 twice");
    assert_eq!(books[0].row_id(), books[1].row_id());
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 2);
    let mut found = storage
        .query_one::<Book>(8)
        .await
        .expect("Failed to query the book 8");
    assert_eq!(found.title(), "Foundation and Empire");
}
