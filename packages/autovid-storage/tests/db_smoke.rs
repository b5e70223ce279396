use time::{Duration, OffsetDateTime, macros::datetime};

use autovid_config::Postgres;
use autovid_storage::{
	catalog,
	db::Db,
	models::{UpsertOutcome, VideoRefresh, VideoUpsert},
	queries, selection,
};
use autovid_testkit::TestDatabase;

const NOW: OffsetDateTime = datetime!(2025-06-01 12:00 UTC);

async fn open(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_catalog_fixture().await.expect("Failed to create catalog tables.");

	db
}

async fn insert_auto(db: &Db, id_auto: i64, tech_code: Option<&str>) {
	sqlx::query(
		"INSERT INTO autos (id_auto, tech_code, registration_year, owner_id) VALUES ($1, $2, 2021, 'dealer-1')",
	)
	.bind(id_auto)
	.bind(tech_code)
	.execute(&db.pool)
	.await
	.expect("Failed to insert auto.");
}

fn upsert(id_auto: i64, video_id: &str, rank_score: f64, checked_at: OffsetDateTime) -> VideoUpsert {
	VideoUpsert {
		id_auto,
		video_id: video_id.to_string(),
		title: format!("Video {video_id}"),
		channel_title: "Quattroruote".to_string(),
		channel_id: "UCq".to_string(),
		published_at: Some(NOW - Duration::days(7)),
		duration_sec: 600,
		embeddable: true,
		view_count: 1_000,
		rank_score,
		source_query: "fiat panda".to_string(),
		audio_lang: Some("it".to_string()),
		checked_at,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set AUTOVID_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;

	db.ensure_schema().await.expect("Schema bootstrap must be repeatable.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'auto_videos'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn upsert_reports_insert_then_update_and_keeps_curation() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping upsert_reports_insert_then_update_and_keeps_curation; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;
	let first = upsert(1, "abc", 5.0, NOW);

	assert_eq!(
		queries::upsert_video(&db.pool, &first).await.expect("Upsert failed."),
		UpsertOutcome::Inserted
	);
	assert!(
		queries::set_curation(&db.pool, 1, "abc", true, true).await.expect("Curation failed.")
	);

	let mut second = upsert(1, "abc", 6.5, NOW + Duration::hours(1));

	second.published_at = None;
	second.view_count = 2_000;

	assert_eq!(
		queries::upsert_video(&db.pool, &second).await.expect("Upsert failed."),
		UpsertOutcome::Updated
	);

	let rows = queries::list_videos(&db.pool, 1).await.expect("List failed.");

	assert_eq!(rows.len(), 1);
	assert!(rows[0].is_pinned);
	assert!(rows[0].is_blacklisted);
	assert_eq!(rows[0].view_count, 2_000);
	assert_eq!(rows[0].rank_score, 6.5);
	assert_eq!(rows[0].published_at, first.published_at);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn metrics_refresh_leaves_score_and_queries_alone() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping metrics_refresh_leaves_score_and_queries_alone; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;

	queries::upsert_video(&db.pool, &upsert(1, "abc", 5.0, NOW)).await.expect("Upsert failed.");

	let refresh = VideoRefresh {
		id_auto: 1,
		video_id: "abc".to_string(),
		title: "Renamed".to_string(),
		channel_title: "Quattroruote".to_string(),
		channel_id: "UCq".to_string(),
		published_at: None,
		duration_sec: 610,
		embeddable: false,
		view_count: 9_999,
		audio_lang: None,
		checked_at: NOW + Duration::days(1),
	};

	assert!(queries::refresh_video_metrics(&db.pool, &refresh).await.expect("Refresh failed."));

	let missing = VideoRefresh { video_id: "gone".to_string(), ..refresh.clone() };

	assert!(!queries::refresh_video_metrics(&db.pool, &missing).await.expect("Refresh failed."));

	let rows = queries::list_videos(&db.pool, 1).await.expect("List failed.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].title, "Renamed");
	assert_eq!(rows[0].rank_score, 5.0);
	assert_eq!(rows[0].source_query, "fiat panda");
	assert!(rows[0].published_at.is_some());
	assert!(!rows[0].embeddable);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn trim_keeps_top_rows_and_every_pinned_row() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping trim_keeps_top_rows_and_every_pinned_row; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;

	for (idx, score) in [9.0, 8.0, 7.0, 1.0, 0.5].into_iter().enumerate() {
		queries::upsert_video(&db.pool, &upsert(1, &format!("v{idx}"), score, NOW))
			.await
			.expect("Upsert failed.");
	}

	queries::set_curation(&db.pool, 1, "v3", true, false).await.expect("Curation failed.");
	queries::set_curation(&db.pool, 1, "v4", true, false).await.expect("Curation failed.");

	let deleted = queries::trim_videos(&db.pool, 1, 3).await.expect("Trim failed.");
	let ids = queries::stored_video_ids(&db.pool, 1).await.expect("List failed.");

	// Two pinned rows take positions 1-2, so only the best unpinned row fits under the cap.
	assert_eq!(deleted, 2);
	assert_eq!(ids.len(), 3);
	assert!(ids.contains(&"v0".to_string()));
	assert!(ids.contains(&"v3".to_string()));
	assert!(ids.contains(&"v4".to_string()));

	let deleted = queries::trim_videos(&db.pool, 1, 1).await.expect("Trim failed.");

	assert_eq!(deleted, 1);
	assert_eq!(queries::stored_video_ids(&db.pool, 1).await.expect("List failed.").len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn public_candidates_skip_blacklisted_and_hidden_rows() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping public_candidates_skip_blacklisted_and_hidden_rows; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;
	let mut hidden = upsert(1, "hidden", 9.0, NOW);

	hidden.embeddable = false;

	queries::upsert_video(&db.pool, &hidden).await.expect("Upsert failed.");
	queries::upsert_video(&db.pool, &upsert(1, "banned", 8.0, NOW)).await.expect("Upsert failed.");
	queries::upsert_video(&db.pool, &upsert(1, "low", 1.0, NOW)).await.expect("Upsert failed.");
	queries::upsert_video(&db.pool, &upsert(1, "mid", 4.0, NOW)).await.expect("Upsert failed.");
	queries::set_curation(&db.pool, 1, "banned", false, true).await.expect("Curation failed.");
	queries::set_curation(&db.pool, 1, "low", true, false).await.expect("Curation failed.");

	let rows = queries::list_public_candidates(&db.pool, 1, 30).await.expect("List failed.");
	let ids = rows.iter().map(|row| row.video_id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["low", "mid"]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn selection_modes_follow_their_staleness_keys() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping selection_modes_follow_their_staleness_keys; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;

	for id_auto in 1..=4 {
		insert_auto(&db, id_auto, None).await;
	}

	// 1: no rows. 2: one old row and one fresh row. 3: three fresh rows. 4: one fresh row.
	queries::upsert_video(&db.pool, &upsert(2, "old", 1.0, NOW - Duration::days(40)))
		.await
		.expect("Upsert failed.");
	queries::upsert_video(&db.pool, &upsert(2, "new", 1.0, NOW - Duration::hours(1)))
		.await
		.expect("Upsert failed.");

	for video_id in ["a", "b", "c"] {
		queries::upsert_video(&db.pool, &upsert(3, video_id, 1.0, NOW - Duration::hours(2)))
			.await
			.expect("Upsert failed.");
	}

	queries::upsert_video(&db.pool, &upsert(4, "x", 1.0, NOW - Duration::hours(3)))
		.await
		.expect("Upsert failed.");

	let daily = selection::select_discovery_batch(&db.pool, 8).await.expect("Selection failed.");

	assert_eq!(daily, vec![1, 2, 4, 3]);

	let revalidate = selection::select_revalidation_batch(&db.pool, NOW, 72, 8)
		.await
		.expect("Selection failed.");

	// Oldest row decides: vehicle 2 qualifies through its 40-day-old row.
	assert_eq!(revalidate, vec![1, 2]);

	let sweep =
		selection::select_sweep_batch(&db.pool, NOW, 30, 50).await.expect("Selection failed.");

	// Newest row decides: vehicle 2 was touched an hour ago.
	assert_eq!(sweep, vec![1]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn vehicle_lock_is_exclusive_per_transaction() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping vehicle_lock_is_exclusive_per_transaction; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;
	let mut first = db.pool.begin().await.expect("Failed to begin transaction.");
	let mut second = db.pool.begin().await.expect("Failed to begin transaction.");

	assert!(queries::try_lock_auto(&mut first, 7).await.expect("Lock failed."));
	assert!(!queries::try_lock_auto(&mut second, 7).await.expect("Lock failed."));
	assert!(queries::try_lock_auto(&mut second, 8).await.expect("Lock failed."));

	first.rollback().await.expect("Rollback failed.");

	second.rollback().await.expect("Rollback failed.");

	let mut third = db.pool.begin().await.expect("Failed to begin transaction.");

	assert!(queries::try_lock_auto(&mut third, 7).await.expect("Lock failed."));

	third.rollback().await.expect("Rollback failed.");
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOVID_PG_DSN to run."]
async fn catalog_lookups_join_trim_to_model() {
	let Some(base_dsn) = autovid_testkit::env_dsn() else {
		eprintln!("Skipping catalog_lookups_join_trim_to_model; set AUTOVID_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = open(&test_db).await;

	insert_auto(&db, 5, Some("T-100")).await;

	sqlx::query(
		"INSERT INTO spec_trims (tech_code, brand_acronym, model_code, trim_description) VALUES ('T-100', 'FIAT', 'PND', 'Cross 1.0 Hybrid')",
	)
	.execute(&db.pool)
	.await
	.expect("Failed to insert trim.");
	sqlx::query(
		"INSERT INTO spec_models (brand_acronym, model_code, model_description) VALUES ('FIAT', 'PND', 'Panda')",
	)
	.execute(&db.pool)
	.await
	.expect("Failed to insert model.");

	let auto = catalog::fetch_auto(&db.pool, 5).await.expect("Lookup failed.").expect("Missing auto.");

	assert_eq!(auto.registration_year, Some(2021));
	assert_eq!(auto.owner_id.as_deref(), Some("dealer-1"));
	assert!(catalog::fetch_spec_detail(&db.pool, "T-100").await.expect("Lookup failed.").is_none());

	let trim =
		catalog::fetch_spec_trim(&db.pool, "T-100").await.expect("Lookup failed.").expect("Missing trim.");

	assert_eq!(trim.model_description.as_deref(), Some("Panda"));
	assert!(catalog::fetch_auto(&db.pool, 404).await.expect("Lookup failed.").is_none());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
