use crate::{Book, Genre, User, UserInput, book, clear, silent_logs};
use std::collections::BTreeMap;
use trove::{Entity, Error, Record, Storage, Store, StoreError, Value, Where};

pub async fn transaction<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // Commit
    let row_id = storage
        .transaction(|handler| {
            let mut lena = handler.insert::<User>(UserInput::new("lena", "Lena", 31))?;
            handler.insert_many::<User>(
                vec![
                    UserInput::new("mike", "Mike", 45),
                    UserInput::new("nora", "Nora", 22),
                ],
                None,
            )?;
            lena.set_age(32);
            handler.flush(&mut lena)?;
            let mut mike = handler.query_one::<User>(&"mike".to_string())?;
            assert_eq!(mike.age(), 45);
            handler.delete(&mike)?;
            assert_eq!(handler.count::<User>(None)?, 2);
            let updated = handler.update::<User>(
                &BTreeMap::from([("email".into(), "staff@example.com".into())]),
                Some(&Where::with("\"age\" < ?").arg(40)),
            )?;
            assert_eq!(updated, 2);
            handler.insert_batch_discard::<Book>(&[Record::from([(
                "id".into(),
                Value::Int64(30),
            )])])?;
            Ok(lena.row_id())
        })
        .await
        .expect("Failed to run the transaction");
    assert!(row_id.is_some());
    let mut users = storage
        .query::<User>(None, None, None)
        .await
        .expect("Failed to query the users");
    assert_eq!(users.len(), 2);
    assert!(
        users
            .iter_mut()
            .all(|u| u.email().as_deref() == Some("staff@example.com"))
    );
    let mut lena = storage
        .query_one::<User>("lena".into())
        .await
        .expect("Failed to query Lena");
    assert_eq!(lena.age(), 32);
    assert_eq!(lena.row_id(), row_id);
    assert_eq!(storage.count::<Book>(None).await.expect("Failed to count"), 1);

    // Failure discards everything
    let result;
    silent_logs! {
        result = storage
            .transaction(|handler| {
                handler.delete_where::<User>(None)?;
                handler.insert::<Book>(book(31, "Lost", Genre::History, 1.0))?;
                handler.overlay::<Book>(vec![book(32, "Also Lost", Genre::History, 1.0)], None, None)?;
                assert_eq!(handler.count::<User>(None)?, 0);
                assert_eq!(handler.count::<Book>(None)?, 1);
                Err::<(), _>(Error::msg("Changed my mind"))
            })
            .await;
    }
    let error = result.expect_err("The transaction must fail");
    assert_eq!(error.to_string(), "Changed my mind");
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 2);
    let mut books = storage
        .query::<Book>(None, None, None)
        .await
        .expect("Failed to query the books");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id(), 30);

    // Errors raised by the operations abort the transaction too
    let result;
    silent_logs! {
        result = storage
            .transaction(|handler| {
                handler.insert::<User>(UserInput::new("olga", "Olga", 50))?;
                handler.query_one::<User>(&"nobody".to_string())
            })
            .await;
    }
    let error = result.expect_err("The missing user fails the transaction");
    assert!(StoreError::is(&error, |e| matches!(e, StoreError::NotFound { .. })));
    assert!(storage.query_one::<User>("olga".into()).await.is_err());

    // Panics are reported and rolled back, the storage stays usable
    let result;
    silent_logs! {
        result = storage
            .transaction(|handler| -> trove::Result<()> {
                handler.insert::<User>(UserInput::new("pete", "Pete", 38))?;
                panic!("Something went very wrong");
            })
            .await;
    }
    let error = result.expect_err("The panic must be reported");
    assert_eq!(
        StoreError::kind_of(&error),
        Some(&StoreError::WorkerPanicked {
            message: "Something went very wrong".into(),
        })
    );
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 2);
    let mut books = storage
        .transaction(|handler| handler.query::<Book>(None, None, None))
        .await
        .expect("Failed to query inside a transaction");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id(), 30);
}
