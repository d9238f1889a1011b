use crate::{Book, Genre, User, UserInput, book, clear};
use trove::{Entity, Orderby, Storage, Store, future::join_all};

pub async fn concurrency<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Many callers, one queue
    let tasks = (1..=20)
        .map(|i| {
            let storage = storage.clone();
            tokio::spawn(async move {
                storage
                    .insert::<Book>(book(i, &format!("Volume {}", i), Genre::History, 3.0))
                    .await
                    .map(|mut volume| volume.id())
            })
        })
        .collect::<Vec<_>>();
    let mut ids = join_all(tasks)
        .await
        .into_iter()
        .map(|v| {
            v.expect("The insert task panicked")
                .expect("Failed to insert a volume")
        })
        .collect::<Vec<_>>();
    ids.sort();
    assert_eq!(ids, (1..=20i64).collect::<Vec<_>>());
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 20);

    // Operations run in submission order, regardless of the await order
    let insert = storage.insert::<User>(UserInput::new("vera", "Vera", 29));
    let count = storage.count::<User>(None);
    let delete = storage.delete_where::<User>(None);
    let after = storage.count::<User>(None);
    let (after, delete, count, insert) = tokio::join!(after, delete, count, insert);
    let mut vera = insert.expect("Failed to insert Vera");
    assert_eq!(count.expect("Failed to count"), 1);
    assert_eq!(delete.expect("Failed to delete"), [vera.row_id().expect("Vera is attached")]);
    assert_eq!(after.expect("Failed to count"), 0);
    assert_eq!(vera.name(), "Vera");

    // Results of concurrent queries are independent entities
    let (first, second) = tokio::join!(
        storage.query::<Book>(None, None, Some(Orderby::ascending("id"))),
        storage.query::<Book>(None, None, Some(Orderby::descending("id"))),
    );
    let mut first = first.expect("Failed to query the volumes");
    let mut second = second.expect("Failed to query the volumes");
    assert_eq!(first.len(), 20);
    assert_eq!(first[0].row_id(), second[19].row_id());
    first[0].set_title("First Volume");
    assert!(first[0].is_dirty());
    assert!(!second[19].is_dirty());
    assert_eq!(second[19].title(), "Volume 1");
}
