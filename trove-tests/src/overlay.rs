use crate::{Book, Genre, book, clear, silent_logs};
use trove::{Entity, Orderby, Storage, Store, StoreError, Where};

pub async fn overlay<S: Store>(storage: &Storage<S>) {
    clear(storage).await;
    let originals = storage
        .insert_many::<Book>(
            vec![
                book(10, "The Name of the Wind", Genre::Fantasy, 4.5),
                book(11, "The Wise Man's Fear", Genre::Fantasy, 4.4),
                book(12, "Elantris", Genre::Fantasy, 3.9),
                book(13, "A Brief History of Time", Genre::Science, 4.3),
            ],
            None,
        )
        .await
        .expect("Failed to insert the books");
    let fantasy = || Some(Where::with("\"genre\" = ?").arg(i64::from(Genre::Fantasy)));

    // Reconcile the fantasy shelf
    let mut results = storage
        .overlay::<Book>(
            vec![
                book(12, "Elantris (Tenth Anniversary)", Genre::Fantasy, 4.0),
                book(10, "The Name of the Wind", Genre::Fantasy, 4.5),
                book(14, "Warbreaker", Genre::Fantasy, 4.1),
            ],
            fantasy(),
            Some(Orderby::ascending("id")),
        )
        .await
        .expect("Failed to overlay the fantasy books");
    let ids = results.iter_mut().map(Entity::id).collect::<Vec<_>>();
    assert_eq!(ids, [10, 12, 14]);
    assert_eq!(results[0].row_id(), originals[0].row_id());
    assert_eq!(results[1].row_id(), originals[2].row_id());

    let mut shelf = storage
        .query::<Book>(fantasy(), None, Some(Orderby::ascending("id")))
        .await
        .expect("Failed to query the fantasy books");
    let titles = shelf.iter_mut().map(Book::title).collect::<Vec<_>>();
    assert_eq!(
        titles,
        [
            "The Name of the Wind",
            "Elantris (Tenth Anniversary)",
            "Warbreaker"
        ]
    );
    let error = storage.query_one::<Book>(11).await;
    assert!(error.is_err(), "The Wise Man's Fear must be removed");

    // Rows outside the predicate are untouched
    let mut science = storage
        .query_one::<Book>(13)
        .await
        .expect("Failed to query the science book");
    assert_eq!(science.title(), "A Brief History of Time");
    assert_eq!(science.row_id(), originals[3].row_id());

    // An empty input list clears the matching rows
    let results = storage
        .overlay::<Book>(Vec::new(), fantasy(), None)
        .await
        .expect("Failed to overlay an empty list");
    assert!(results.is_empty());
    assert_eq!(
        storage
            .count::<Book>(fantasy())
            .await
            .expect("Failed to count the fantasy books"),
        0
    );
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 1);

    // A failing input leaves everything as it was
    let error;
    silent_logs! {
        error = storage
            .overlay::<Book>(
                vec![
                    book(20, "Kept Out", Genre::History, 3.0),
                    book(0, "Anonymous", Genre::History, 3.0),
                ],
                None,
                None,
            )
            .await
            .expect_err("An input with an empty identifier fails the whole overlay");
    }
    assert!(StoreError::is(&error, |e| matches!(
        e,
        StoreError::InvalidIdentifier { .. }
    )));
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 1);
    let error = storage.query_one::<Book>(20).await;
    assert!(error.is_err(), "The overlay must have been rolled back");
}
