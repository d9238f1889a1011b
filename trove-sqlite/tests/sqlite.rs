#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Mutex};
    use tokio::fs;
    use trove_core::{Config, Storage};
    use trove_sqlite::SqliteStore;
    use trove_tests::{MODEL, execute_tests, init_logs, model};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        const DB_DIR: &'static str = "../target/debug";
        let db_path = Path::new(DB_DIR).join(format!("{}.db", MODEL));
        let _guard = MUTEX.lock().unwrap();
        if db_path.exists() {
            fs::remove_file(&db_path).await.expect(
                format!("Failed to remove existing test database file {}", db_path.display())
                    .as_str(),
            );
        }
        assert!(!db_path.exists(), "Database file should not exist before test");
        let storage = Storage::<SqliteStore>::open_with(Config::new(MODEL).with_directory(DB_DIR), model())
            .await
            .expect("Could not open the storage");
        assert!(
            db_path.exists(),
            "Database file should be created after opening"
        );
        execute_tests(storage).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sqlite_memory() {
        init_logs();
        let storage = Storage::<SqliteStore>::open_with(Config::new(MODEL).in_memory(), model())
            .await
            .expect("Could not open the in memory storage");
        execute_tests(storage).await;
    }
}
