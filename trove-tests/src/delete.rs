use crate::{Book, Genre, User, UserInput, book, clear};
use trove::{Entity, Storage, Store, StoreError, Where};

pub async fn delete<S: Store>(storage: &Storage<S>) {
    clear(storage).await;
    let mut books = storage
        .insert_many::<Book>(
            vec![
                book(1, "The Hobbit", Genre::Fantasy, 4.7),
                book(2, "Cosmos", Genre::Science, 4.6),
                book(3, "SPQR", Genre::History, 4.2),
                book(4, "Mistborn", Genre::Fantasy, 4.4),
            ],
            None,
        )
        .await
        .expect("Failed to insert the books");

    // One
    let hobbit = books.remove(0);
    storage
        .delete(&hobbit)
        .await
        .expect("Failed to delete The Hobbit");
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 3);
    let error = storage
        .query_one::<Book>(1)
        .await
        .expect_err("The Hobbit was deleted");
    assert!(StoreError::is(&error, |e| matches!(e, StoreError::NotFound { .. })));

    // Idempotent
    storage
        .delete(&hobbit)
        .await
        .expect("Deleting twice is not an error");
    let detached = Book::from_input(book(5, "Never Saved", Genre::Unknown, 0.0))
        .expect("Failed to build a detached book");
    storage
        .delete(&detached)
        .await
        .expect("Deleting a detached entity is a no-op");
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 3);

    // Many, skipping the detached ones
    let mut targets = books.drain(..2).collect::<Vec<_>>();
    targets.push(detached);
    storage
        .delete_many(&targets)
        .await
        .expect("Failed to delete Cosmos and SPQR");
    let mut left = storage
        .query::<Book>(None, None, None)
        .await
        .expect("Failed to query the books left");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].title(), "Mistborn");

    // By predicate, other entities are untouched
    storage
        .insert::<User>(UserInput::new("frank", "Frank", 60))
        .await
        .expect("Failed to insert Frank");
    let row_ids = storage
        .delete_where::<Book>(Some(Where::with("\"genre\" = ?").arg(i64::from(Genre::Fantasy))))
        .await
        .expect("Failed to delete the fantasy books");
    assert_eq!(row_ids.len(), 1);
    assert_eq!(Some(row_ids[0]), left[0].row_id());
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 0);
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 1);
    let row_ids = storage
        .delete_where::<Book>(None)
        .await
        .expect("Deleting from an empty table is not an error");
    assert!(row_ids.is_empty());
}
