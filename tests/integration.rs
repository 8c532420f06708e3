//! Integration tests: verify generated-data invariants and cross-variant
//! query agreement against a small in-memory dataset.

use join_bench::populate::{generate_test_data, random_distinct};
use join_bench::queries::{
    all_variants, NestedInclude, QueryVariant, RawMappingShapedSql, RawOrderedJoinSql, SplitLoad,
};
use join_bench::schema::{configure_connection, create_tables, test_data_exists, GenParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;

fn small_params() -> GenParams {
    // 200 images -> 4 tags, 10 folders; baskets stay at the fixed 5/15.
    GenParams {
        image_count: 200,
        seed: 0x7E57_DA7A,
    }
}

fn setup_and_populate(params: &GenParams) -> Connection {
    let mut conn = Connection::open_in_memory().expect("open");
    configure_connection(&conn).expect("configure");
    create_tables(&conn).expect("create_tables");
    generate_test_data(&mut conn, params).expect("generate");
    conn
}

fn count(conn: &Connection, sql: &str) -> u32 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

// ── Generation invariants ───────────────────────────────────────────

#[test]
fn row_counts_match_parameters() {
    let params = small_params();
    let conn = setup_and_populate(&params);

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM Folders"), params.folder_count());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM Images"), params.image_count);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM ImageMetaData"),
        params.image_count
    );
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM Tags"), params.tag_count());
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM ImageTags"),
        params.image_count * GenParams::TAGS_PER_IMAGE as u32
    );
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM Baskets"), params.basket_count());
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM BasketEntries"),
        params.basket_entry_count()
    );
}

#[test]
fn image_tag_pairs_are_unique() {
    let conn = setup_and_populate(&small_params());
    let duplicates = count(
        &conn,
        "SELECT COUNT(*) FROM (
            SELECT ImageId, TagId FROM ImageTags
            GROUP BY ImageId, TagId HAVING COUNT(*) > 1
        )",
    );
    assert_eq!(duplicates, 0);
}

#[test]
fn basket_entry_pairs_are_unique() {
    let conn = setup_and_populate(&small_params());
    let duplicates = count(
        &conn,
        "SELECT COUNT(*) FROM (
            SELECT ImageId, BasketId FROM BasketEntries
            GROUP BY ImageId, BasketId HAVING COUNT(*) > 1
        )",
    );
    assert_eq!(duplicates, 0);
}

#[test]
fn every_image_has_exactly_three_tags() {
    let conn = setup_and_populate(&small_params());
    let off_count = count(
        &conn,
        "SELECT COUNT(*) FROM (
            SELECT ImageId FROM ImageTags
            GROUP BY ImageId HAVING COUNT(*) != 3
        )",
    );
    assert_eq!(off_count, 0);

    let tagged_images = count(&conn, "SELECT COUNT(DISTINCT ImageId) FROM ImageTags");
    assert_eq!(tagged_images, small_params().image_count);
}

#[test]
fn generated_rows_reference_existing_parents() {
    let conn = setup_and_populate(&small_params());

    let orphan_tags = count(
        &conn,
        "SELECT COUNT(*) FROM ImageTags it
         WHERE it.ImageId NOT IN (SELECT ImageId FROM Images)
            OR it.TagId NOT IN (SELECT TagId FROM Tags)",
    );
    assert_eq!(orphan_tags, 0);

    let orphan_entries = count(
        &conn,
        "SELECT COUNT(*) FROM BasketEntries be
         WHERE be.ImageId NOT IN (SELECT ImageId FROM Images)
            OR be.BasketId NOT IN (SELECT BasketId FROM Baskets)",
    );
    assert_eq!(orphan_entries, 0);

    let orphan_meta = count(
        &conn,
        "SELECT COUNT(*) FROM ImageMetaData m
         WHERE m.ImageId NOT IN (SELECT ImageId FROM Images)",
    );
    assert_eq!(orphan_meta, 0);
}

#[test]
fn seeded_check_detects_existing_data() {
    let params = small_params();

    let populated = setup_and_populate(&params);
    assert!(test_data_exists(&populated, &params).unwrap());

    // Schema present but empty
    let empty = Connection::open_in_memory().unwrap();
    create_tables(&empty).unwrap();
    assert!(!test_data_exists(&empty, &params).unwrap());

    // No schema at all
    let fresh = Connection::open_in_memory().unwrap();
    assert!(!test_data_exists(&fresh, &params).unwrap());
}

#[test]
fn generation_is_deterministic_for_a_fixed_seed() {
    let params = small_params();
    let a = setup_and_populate(&params);
    let b = setup_and_populate(&params);

    let dump = |conn: &Connection| -> Vec<(u32, u32)> {
        let mut stmt = conn
            .prepare("SELECT ImageId, TagId FROM ImageTags ORDER BY ImageId, TagId")
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(dump(&a), dump(&b));

    let entries = |conn: &Connection| -> Vec<(u32, u32)> {
        let mut stmt = conn
            .prepare("SELECT ImageId, BasketId FROM BasketEntries ORDER BY BasketEntryId")
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(entries(&a), entries(&b));
}

#[test]
fn random_distinct_returns_unique_values_in_range() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let picked = random_distinct(&mut rng, 1, 10, 3).unwrap();
        assert_eq!(picked.len(), 3);
        for &v in &picked {
            assert!((1..10).contains(&v));
        }
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3, "duplicate value in {picked:?}");
    }
}

#[test]
fn random_distinct_rejects_too_small_pool() {
    let mut rng = StdRng::seed_from_u64(42);
    // [1, 3) holds only two values; asking for three must fail, not hang.
    assert!(random_distinct(&mut rng, 1, 3, 3).is_err());
    // Exactly as many values as picks is the boundary case and must succeed.
    let picked = random_distinct(&mut rng, 1, 4, 3).unwrap();
    assert_eq!(picked.len(), 3);
}

// ── Query variants ──────────────────────────────────────────────────

#[test]
fn nested_include_loads_one_image_per_basket_entry() {
    let params = small_params();
    let conn = setup_and_populate(&params);

    let stats = NestedInclude.run(&conn).unwrap();
    assert_eq!(stats.images_loaded, params.basket_entry_count() as usize);
    assert_eq!(
        stats.tags_loaded,
        params.basket_entry_count() as usize * GenParams::TAGS_PER_IMAGE
    );
    assert!(stats.deduplicated);

    for img in NestedInclude.fetch(&conn).unwrap() {
        assert_eq!(img.tag_ids.len(), GenParams::TAGS_PER_IMAGE);
    }
}

#[test]
fn split_load_matches_nested_include() {
    let conn = setup_and_populate(&small_params());

    let nested = NestedInclude.fetch(&conn).unwrap();
    let split = SplitLoad.fetch(&conn).unwrap();

    assert_eq!(nested.len(), split.len());
    for (a, b) in nested.iter().zip(split.iter()) {
        assert_eq!(a.basket_entry_id, b.basket_entry_id);
        assert_eq!(a.image_id, b.image_id);
        assert_eq!(a.basket_id, b.basket_id);
        assert_eq!(a.tag_ids, b.tag_ids);
    }
}

#[test]
fn raw_variants_overcount_by_the_fan_out() {
    let params = small_params();
    let conn = setup_and_populate(&params);

    // Every image carries exactly 3 tags, so the flat join yields 3 rows
    // per basket entry and the naive materialization keeps all of them.
    let expected_rows =
        params.basket_entry_count() as usize * GenParams::TAGS_PER_IMAGE;

    for stats in [
        RawMappingShapedSql.run(&conn).unwrap(),
        RawOrderedJoinSql.run(&conn).unwrap(),
    ] {
        assert_eq!(stats.images_loaded, expected_rows);
        assert_eq!(stats.tags_loaded, expected_rows);
        assert!(!stats.deduplicated);
    }
}

#[test]
fn all_variants_agree_on_distinct_images() {
    let conn = setup_and_populate(&small_params());

    let expected = count(&conn, "SELECT COUNT(DISTINCT ImageId) FROM BasketEntries") as usize;
    assert!(expected > 0);

    for variant in all_variants() {
        let stats = variant.run(&conn).unwrap();
        assert_eq!(
            stats.distinct_images,
            expected,
            "variant {} disagrees on distinct image count",
            variant.name()
        );
    }
}
