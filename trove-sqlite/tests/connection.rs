#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::Mutex,
    };
    use tokio::fs;
    use trove_core::{ColumnKind, Config, Model, Recovery, Storage, StoreError};
    use trove_sqlite::SqliteStore;
    use trove_tests::{Book, Genre, User, UserInput, book, init_logs, silent_logs};

    static MUTEX: Mutex<()> = Mutex::new(());
    const DB_DIR: &'static str = "../target/debug";
    const MODEL_DIR: &'static str = "tests/models";

    async fn remove(model: &str) -> PathBuf {
        let path = Path::new(DB_DIR).join(format!("{}.db", model));
        if path.exists() {
            fs::remove_file(&path)
                .await
                .expect(format!("Failed to remove test database file {}", path.display()).as_str());
        }
        path
    }

    fn users(name: &str, email: bool, age: ColumnKind) -> Model {
        let model = Model::new(name)
            .with_entity("User")
            .with_column("id", ColumnKind::Text)
            .with_column("name", ColumnKind::Text)
            .with_column("age", age)
            .with_column("tags", ColumnKind::Blob);
        if email {
            model.with_column("email", ColumnKind::Text)
        } else {
            model
        }
    }

    #[tokio::test]
    async fn open_declared_model() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let path = remove("library").await;
        let config = Config::new("library")
            .with_model_dir(MODEL_DIR)
            .with_directory(DB_DIR);
        let storage = Storage::<SqliteStore>::open(config)
            .await
            .expect("Could not open the library");
        assert!(path.exists(), "Database file should be created after opening");
        assert_eq!(storage.model_name(), "library");
        let mut dune = storage
            .insert::<Book>(book(1, "Dune", Genre::Science, 4.5))
            .await
            .expect("Failed to insert Dune");
        assert_eq!(dune.title(), "Dune");

        // The model has no users
        let error;
        silent_logs! {
            error = storage
                .count::<User>(None)
                .await
                .expect_err("User is not declared in the library");
        }
        assert_eq!(
            StoreError::kind_of(&error),
            Some(&StoreError::EntityNotFound {
                entity: "User".into()
            })
        );
    }

    #[tokio::test]
    async fn missing_model() {
        init_logs();
        let result;
        silent_logs! {
            result = Storage::<SqliteStore>::open(
                Config::new("nowhere").with_model_dir(MODEL_DIR).in_memory(),
            )
            .await;
        }
        let error = result.err().expect("A missing model cannot be opened");
        assert_eq!(
            StoreError::kind_of(&error),
            Some(&StoreError::ModelNotFound {
                model: "nowhere".into()
            })
        );
        let result;
        silent_logs! {
            result = Storage::<SqliteStore>::open(
                Config::new("mislabeled").with_model_dir(MODEL_DIR).in_memory(),
            )
            .await;
        }
        let error = result.err().expect("A model declaring another name is rejected");
        assert!(StoreError::is(&error, |e| matches!(
            e,
            StoreError::ModelNotFound { .. }
        )));
    }

    #[tokio::test]
    async fn migrate_added_column() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        remove("migration").await;
        let config = Config::new("migration").with_directory(DB_DIR);
        {
            let storage = Storage::<SqliteStore>::open_with(
                config.clone(),
                users("migration", false, ColumnKind::Integer),
            )
            .await
            .expect("Could not open the first version");
            storage
                .insert::<User>(UserInput::new("walt", "Walt", 50))
                .await
                .expect("Failed to insert Walt");
        }
        let storage = Storage::<SqliteStore>::open_with(
            config,
            users("migration", true, ColumnKind::Integer),
        )
        .await
        .expect("Could not open the second version");
        let mut walt = storage
            .query_one::<User>("walt".into())
            .await
            .expect("Walt survives the migration");
        assert_eq!(walt.name(), "Walt");
        assert_eq!(walt.email(), None);
        walt.set_email(Some("walt@example.com"));
        storage.flush(&mut walt).await.expect("Failed to flush Walt");
        let mut check = storage
            .query_one::<User>("walt".into())
            .await
            .expect("Failed to query Walt");
        assert_eq!(check.email().as_deref(), Some("walt@example.com"));
    }

    #[tokio::test]
    async fn incompatible_schema() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        remove("incompatible").await;
        let config = Config::new("incompatible").with_directory(DB_DIR);
        {
            let storage = Storage::<SqliteStore>::open_with(
                config.clone(),
                users("incompatible", true, ColumnKind::Integer),
            )
            .await
            .expect("Could not open the first version");
            storage
                .insert::<User>(UserInput::new("xena", "Xena", 30))
                .await
                .expect("Failed to insert Xena");
        }

        // Refused unless recreating is allowed
        let result;
        silent_logs! {
            result = Storage::<SqliteStore>::open_with(
                config.clone(),
                users("incompatible", true, ColumnKind::Text),
            )
            .await;
        }
        assert!(result.is_err(), "A changed column type must be refused");
        let storage = Storage::<SqliteStore>::open_with(
            config.clone(),
            users("incompatible", true, ColumnKind::Integer),
        )
        .await
        .expect("The refusal must leave the database untouched");
        assert_eq!(
            storage.count::<User>(None).await.expect("Failed to count"),
            1
        );
        drop(storage);

        let storage;
        silent_logs! {
            storage = Storage::<SqliteStore>::open_with(
                config.with_recovery(Recovery::Recreate),
                users("incompatible", true, ColumnKind::Text),
            )
            .await
            .expect("Could not recreate the database");
        }
        assert_eq!(
            storage.count::<User>(None).await.expect("Failed to count"),
            0
        );
    }

    #[tokio::test]
    async fn corrupted_file() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let path = remove("corrupted").await;
        fs::write(&path, vec![b'x'; 4096])
            .await
            .expect("Failed to write the corrupted file");
        let config = Config::new("corrupted").with_directory(DB_DIR);
        let result;
        silent_logs! {
            result = Storage::<SqliteStore>::open_with(
                config.clone(),
                users("corrupted", true, ColumnKind::Integer),
            )
            .await;
        }
        assert!(result.is_err(), "A corrupted file must be refused");
        let storage;
        silent_logs! {
            storage = Storage::<SqliteStore>::open_with(
                config.with_recovery(Recovery::Recreate),
                users("corrupted", true, ColumnKind::Integer),
            )
            .await
            .expect("Could not recreate the corrupted database");
        }
        storage
            .insert::<User>(UserInput::new("yuri", "Yuri", 44))
            .await
            .expect("The recreated database is usable");
        assert_eq!(
            storage.count::<User>(None).await.expect("Failed to count"),
            1
        );
    }
}
