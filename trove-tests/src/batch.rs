use crate::{Book, Genre, clear};
use trove::{Entity, Record, Storage, Store, Value, Where};

fn record(id: i64, title: &str, genre: Genre) -> Record {
    Record::from([
        ("id".into(), Value::Int64(id)),
        ("title".into(), title.into()),
        ("genre".into(), Value::Int64(genre.into())),
    ])
}

pub async fn batch<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Entities
    let mut books = storage
        .insert_batch::<Book>(vec![
            record(100, "Neuromancer", Genre::Science),
            record(101, "Hyperion", Genre::Science),
        ])
        .await
        .expect("Failed to batch insert the books");
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(Entity::is_attached));
    assert!(!books[0].title.is_loaded());
    assert_eq!(books[0].title(), "Neuromancer");
    assert_eq!(books[1].genre(), Genre::Science);
    assert_eq!(books[1].rating(), 0.0);
    assert!(!books[1].rating.is_loaded());

    // Nothing
    storage
        .insert_batch_discard::<Book>(vec![
            record(102, "Gideon the Ninth", Genre::Fantasy),
            record(103, "Piranesi", Genre::Fantasy),
            record(104, "Circe", Genre::Fantasy),
        ])
        .await
        .expect("Failed to batch insert discarding the result");
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 5);

    // Row identities, records with different columns in one batch
    let mut partial = Record::new();
    partial.insert("id".into(), Value::Int64(106));
    let row_ids = storage
        .insert_batch_ids::<Book>(vec![
            record(105, "The Silmarillion", Genre::Fantasy),
            partial,
            Record::from([
                ("id".into(), Value::Int64(107)),
                ("rating".into(), Value::Float64(3.5)),
            ]),
        ])
        .await
        .expect("Failed to batch insert returning the row identities");
    assert_eq!(row_ids.len(), 3);
    assert!(row_ids[0] < row_ids[1] && row_ids[1] < row_ids[2]);
    let mut found = storage
        .query::<Book>(Some(Where::with("rowid = ?").arg(row_ids[2].0)), None, None)
        .await
        .expect("Failed to query by row identity");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), 107);
    assert_eq!(found[0].rating(), 3.5);
    assert_eq!(found[0].row_id(), Some(row_ids[2]));

    // Empty batches touch nothing
    let none = storage
        .insert_batch_ids::<Book>(Vec::new())
        .await
        .expect("An empty batch is not an error");
    assert!(none.is_empty());
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 8);

    // Batch rows behave like any other row afterwards
    let mut piranesi = storage
        .query_one::<Book>(103)
        .await
        .expect("Failed to query Piranesi");
    piranesi.set_title("Piranesi (Paperback)");
    storage
        .flush(&mut piranesi)
        .await
        .expect("Failed to flush Piranesi");
    let mut check = storage
        .query_one::<Book>(103)
        .await
        .expect("Failed to query Piranesi again");
    assert_eq!(check.title(), "Piranesi (Paperback)");
    assert_eq!(check.genre(), Genre::Fantasy);
}
