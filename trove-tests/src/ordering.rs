use crate::{User, UserInput, clear, silent_logs};
use trove::{Orderby, Pager, Storage, Store};

pub async fn ordering<S: Store>(storage: &Storage<S>) {
    clear(storage).await;

    // In memory sort of the inserted entities
    let mut users = storage
        .insert_many::<User>(
            vec![
                UserInput::new("gina", "Gina", 30),
                UserInput::new("hank", "Hank", 25),
                UserInput::new("iris", "Iris", 30),
                UserInput::new("jack", "Jack", 19),
            ],
            Some(Orderby::descending("age").then("name", true)),
        )
        .await
        .expect("Failed to insert the users");
    let names = users.iter_mut().map(User::name).collect::<Vec<_>>();
    assert_eq!(names, ["Gina", "Iris", "Hank", "Jack"]);

    // Same criteria in the store
    let mut users = storage
        .query::<User>(
            None,
            None,
            Some(Orderby::new([("age", true), ("name", false)])),
        )
        .await
        .expect("Failed to query the users sorted");
    let names = users.iter_mut().map(User::name).collect::<Vec<_>>();
    assert_eq!(names, ["Jack", "Hank", "Iris", "Gina"]);

    // Pages cover the whole table
    let mut seen = Vec::new();
    for index in 0.. {
        let mut page = storage
            .query::<User>(None, Some(Pager::new(index, 3)), Some(Orderby::ascending("id")))
            .await
            .expect("Failed to query a page");
        if page.is_empty() {
            break;
        }
        seen.extend(page.iter_mut().map(User::name));
    }
    assert_eq!(seen, ["Gina", "Hank", "Iris", "Jack"]);

    // Sorting by a column the entity does not map
    let result;
    silent_logs! {
        result = storage
            .insert_many::<User>(
                vec![UserInput::new("kate", "Kate", 44)],
                Some(Orderby::ascending("height")),
            )
            .await;
    }
    assert!(result.is_err(), "Sorting by an unmapped field must fail");
    assert_eq!(storage.count::<User>(None).await.expect("Failed to count"), 4);
}
