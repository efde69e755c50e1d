#[cfg(test)]
mod tests {
    use crate::order::{load_json, reconcile, reorder, Loaded, OrderBook, OrderList, Role, ScopeKey};
    use crate::storage::{KeyValueStore, MemoryStore};

    fn ids(v: &[&str]) -> OrderList {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scope_keys() {
        assert_eq!(ScopeKey::server_order(Role::User, "7").as_str(), "user:serversOrder:7");
        assert_eq!(ScopeKey::server_order(Role::Admin, "7").as_str(), "admin:serversOrder:7");
        assert_eq!(ScopeKey::server_folders(Role::User, "7").as_str(), "user:serversFolders:7");
        assert_eq!(ScopeKey::show_all_servers("7").to_string(), "7:show_all_servers");
    }

    #[test]
    fn test_reconcile_drops_missing_and_appends_new() {
        let next = reconcile(&ids(&["a", "b", "c"]), &ids(&["b", "c", "d"]));
        assert_eq!(next, ids(&["b", "c", "d"]));
    }

    #[test]
    fn test_reconcile_keeps_user_order() {
        let next = reconcile(&ids(&["c", "a", "b"]), &ids(&["a", "b", "c", "e", "d"]));
        assert_eq!(next, ids(&["c", "a", "b", "e", "d"]));
    }

    #[test]
    fn test_reconcile_adopts_fetched_when_empty() {
        assert_eq!(reconcile(&[], &ids(&["x", "y"])), ids(&["x", "y"]));
        assert!(reconcile(&ids(&["x"]), &[]).is_empty());
    }

    #[test]
    fn test_reconcile_collapses_duplicates() {
        let next = reconcile(&ids(&["a", "a", "b"]), &ids(&["b", "a", "b", "c"]));
        assert_eq!(next, ids(&["a", "b", "c"]));
        assert_eq!(reconcile(&[], &ids(&["z", "z"])), ids(&["z"]));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let cases = [
            (ids(&["a", "b", "c"]), ids(&["b", "c", "d"])),
            (ids(&[]), ids(&["q", "q", "r"])),
            (ids(&["d", "c", "b", "a"]), ids(&["a", "e", "c"])),
        ];
        for (current, fetched) in cases {
            let once = reconcile(&current, &fetched);
            assert_eq!(reconcile(&once, &fetched), once);
        }
    }

    #[test]
    fn test_reorder_moves_item() {
        assert_eq!(reorder(&ids(&["a", "b", "c"]), 0, Some(2)), ids(&["b", "c", "a"]));
        assert_eq!(reorder(&ids(&["a", "b", "c"]), 2, Some(0)), ids(&["c", "a", "b"]));
    }

    #[test]
    fn test_reorder_noop_cases() {
        let order = ids(&["a", "b", "c"]);
        assert_eq!(reorder(&order, 0, None), order);
        assert_eq!(reorder(&order, 1, Some(1)), order);
        assert_eq!(reorder(&order, 3, Some(0)), order);
        assert_eq!(reorder(&order, 0, Some(3)), order);
        assert!(reorder(&[], 0, Some(0)).is_empty());
    }

    #[test]
    fn test_reorder_is_permutation() {
        let order = ids(&["a", "b", "c", "d", "e"]);
        for s in 0..order.len() {
            for d in 0..order.len() {
                let mut moved = reorder(&order, s, Some(d));
                assert_eq!(moved.len(), order.len());
                moved.sort();
                assert_eq!(moved, order);
            }
        }
    }

    #[tokio::test]
    async fn test_load_json_purges_malformed_entry() {
        let key = ScopeKey::server_order(Role::User, "1");
        let store = MemoryStore::with_entries([(key.as_str(), "{not json")]);

        let loaded = load_json::<OrderList>(&store, &key).await;
        assert_eq!(loaded, Loaded::Purged);
        assert_eq!(store.read(key.as_str()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_json_missing_and_present() {
        let key = ScopeKey::server_order(Role::User, "1");
        let store = MemoryStore::new();
        assert_eq!(load_json::<OrderList>(&store, &key).await, Loaded::Missing);

        store.write(key.as_str(), r#"["a","b"]"#).await.unwrap();
        assert_eq!(load_json::<OrderList>(&store, &key).await, Loaded::Value(ids(&["a", "b"])));
    }

    #[tokio::test]
    async fn test_order_book_malformed_value_loads_empty() {
        let key = ScopeKey::server_order(Role::Admin, "9");
        let store = MemoryStore::with_entries([(key.as_str(), "{not json")]);
        let mut book = OrderBook::new(key.clone());

        assert!(book.load(&store).await);
        assert!(book.is_loaded());
        assert!(book.order().is_empty());
        assert_eq!(store.read(key.as_str()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_order_book_reconcile_waits_for_load() {
        let key = ScopeKey::server_order(Role::User, "1");
        let store = MemoryStore::with_entries([(key.as_str(), r#"["c","a"]"#)]);
        let mut book = OrderBook::new(key.clone());

        assert!(!book.reconcile(&store, &ids(&["a", "b", "c"])).await.unwrap());
        assert!(book.order().is_empty());

        book.load(&store).await;
        assert!(book.reconcile(&store, &ids(&["a", "b", "c"])).await.unwrap());
        assert_eq!(book.order(), ids(&["c", "a", "b"]).as_slice());
        assert_eq!(store.read(key.as_str()).await.unwrap().as_deref(), Some(r#"["c","a","b"]"#));
    }

    #[tokio::test]
    async fn test_order_book_skips_unchanged_write() {
        let key = ScopeKey::server_order(Role::User, "1");
        let store = MemoryStore::with_entries([(key.as_str(), r#"["a","b"]"#)]);
        let mut book = OrderBook::new(key.clone());
        book.load(&store).await;

        assert!(!book.reconcile(&store, &ids(&["b", "a"])).await.unwrap());
        assert_eq!(book.order(), ids(&["a", "b"]).as_slice());
    }

    #[tokio::test]
    async fn test_order_book_reorder_persists_immediately() {
        let key = ScopeKey::server_order(Role::User, "1");
        let store = MemoryStore::with_entries([(key.as_str(), r#"["a","b","c"]"#)]);
        let mut book = OrderBook::new(key.clone());
        book.load(&store).await;

        assert!(book.reorder(&store, 0, Some(2)).await.unwrap());
        assert_eq!(store.read(key.as_str()).await.unwrap().as_deref(), Some(r#"["b","c","a"]"#));

        assert!(!book.reorder(&store, 0, None).await.unwrap());
        assert_eq!(book.order(), ids(&["b", "c", "a"]).as_slice());
    }
}
