//! Migrations apply cleanly to a fresh database and are idempotent

#[tokio::test]
async fn migrations_apply_twice() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("state.sqlite");

    let pool = keg_state::create_pool(&db_path).await.unwrap();
    keg_state::run_migrations(&pool).await.unwrap();
    keg_state::run_migrations(&pool).await.unwrap();

    let tables: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
    let names: Vec<_> = tables.into_iter().map(|(name,)| name).collect();
    assert!(names.contains(&"installed".to_string()));
    assert!(names.contains(&"history".to_string()));
}
