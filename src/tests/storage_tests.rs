#[cfg(test)]
mod tests {
    use crate::db;
    use crate::order::{load_json, store_json, Loaded, OrderList, Role, ScopeKey};
    use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};
    use sqlx::migrate::MigrateDatabase;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::NamedTempFile;

    async fn setup_test_db() -> (sqlx::SqlitePool, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());

        if !sqlx::Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            sqlx::Sqlite::create_database(&db_url).await.unwrap();
        }

        let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

        db::init_db(&pool).await.unwrap();

        (pool, temp_db)
    }

    #[tokio::test]
    async fn test_init_db_creates_kv_store() {
        let (pool, _file) = setup_test_db().await;

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[tokio::test]
    async fn test_init_db_is_repeatable() {
        let (pool, _file) = setup_test_db().await;
        db::init_db(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_store_roundtrip_and_upsert() {
        let (pool, _file) = setup_test_db().await;
        let store = SqliteStore::new(pool.clone());

        assert_eq!(store.read("user:serversOrder:1").await.unwrap(), None);

        store.write("user:serversOrder:1", r#"["a"]"#).await.unwrap();
        store.write("user:serversOrder:1", r#"["a","b"]"#).await.unwrap();
        assert_eq!(store.read("user:serversOrder:1").await.unwrap().as_deref(), Some(r#"["a","b"]"#));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 1);

        store.remove("user:serversOrder:1").await.unwrap();
        assert_eq!(store.read("user:serversOrder:1").await.unwrap(), None);
        // Removing a missing key is fine
        store.remove("user:serversOrder:1").await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_store_purges_malformed_order() {
        let (pool, _file) = setup_test_db().await;
        let store = SqliteStore::new(pool);
        let key = ScopeKey::server_order(Role::User, "42");
        store.write(key.as_str(), "{not json").await.unwrap();

        let loaded = load_json::<OrderList>(&store, &key).await;
        assert_eq!(loaded, Loaded::Purged);
        assert_eq!(loaded.into_option().unwrap_or_default(), Vec::<String>::new());
        assert_eq!(store.read(key.as_str()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_json_writes_string_array() {
        let (pool, _file) = setup_test_db().await;
        let store = SqliteStore::new(pool);
        let key = ScopeKey::server_order(Role::Admin, "1");
        let order: OrderList = vec!["x".to_string(), "y".to_string()];

        store_json(&store, &key, &order).await.unwrap();
        assert_eq!(store.read(key.as_str()).await.unwrap().as_deref(), Some(r#"["x","y"]"#));
        assert_eq!(load_json::<OrderList>(&store, &key).await, Loaded::Value(order));
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.write("k", "v").await.unwrap();
        assert_eq!(other.read("k").await.unwrap().as_deref(), Some("v"));
        other.remove("k").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), None);
    }
}
