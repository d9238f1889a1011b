use crate::{User, UserInput, clear, silent_logs};
use trove::{Attachment, Entity, Record, Row, RowId, Storage, Store, StoreError, StoredRow, Where};

pub async fn attach<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Detached entities attach on flush
    let mut erin = User::from_input(UserInput::new("erin", "Erin", 23))
        .expect("Failed to build Erin");
    assert!(!erin.is_attached());
    assert_eq!(erin.row_id(), None);
    storage.flush(&mut erin).await.expect("Failed to flush Erin");
    assert!(erin.is_attached());
    let row_id = erin.row_id().expect("Erin is attached");

    // Attachment happens once
    let other = Attachment::new(StoredRow {
        row_id: RowId(row_id.0 + 1000),
        row: Row::from(Record::new()),
    });
    assert!(!erin.attach(other));
    assert_eq!(erin.row_id(), Some(row_id));
    erin.set_age(24);
    storage
        .flush(&mut erin)
        .await
        .expect("Failed to flush Erin again");
    assert_eq!(erin.row_id(), Some(row_id));
    let mut check = storage
        .query_one::<User>("erin".into())
        .await
        .expect("Failed to query Erin");
    assert_eq!(check.age(), 24);

    // Flushing a deleted row fails
    let mut stale = storage
        .query_one::<User>("erin".into())
        .await
        .expect("Failed to query Erin");
    let deleted = storage
        .delete_where::<User>(Some(Where::id_equals("id", "erin")))
        .await
        .expect("Failed to delete Erin");
    assert_eq!(deleted, [row_id]);
    stale.set_name("Erin Again");
    let error;
    silent_logs! {
        error = storage
            .flush(&mut stale)
            .await
            .expect_err("Flushing a deleted row must fail");
    }
    assert_eq!(
        StoreError::kind_of(&error),
        Some(&StoreError::RowDeleted {
            entity: "User".into(),
            row_id,
        })
    );
    assert!(stale.is_dirty());
    let error = storage
        .flush(&mut erin)
        .await
        .expect_err("Flushing a clean entity whose row is gone must fail");
    assert!(StoreError::is(&error, |e| matches!(
        e,
        StoreError::RowDeleted { .. }
    )));
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 0);
}
