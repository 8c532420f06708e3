//! Query variants: four logically equivalent ways to load "every image
//! referenced by any basket entry, with its tags".
//!
//! The comparison is the whole point of the harness:
//!
//! 1. [`NestedInclude`] — one composed query joining through both nested
//!    collections, object graph reassembled client-side. The join fans out
//!    to one row per (basket entry × tag), so the row volume is a cartesian
//!    product and the client does the deduplication work.
//! 2. [`SplitLoad`] — parents first, then one follow-up tag query per image.
//!    No fan-out, at the cost of N extra round trips.
//! 3. [`RawMappingShapedSql`] — hand-written SQL structurally identical to
//!    what a mapping layer generates for variant 1 (decorrelated LEFT JOIN
//!    subquery), materialized row-by-row.
//! 4. [`RawOrderedJoinSql`] — hand-written SQL with plain INNER JOINs and an
//!    ORDER BY over all join keys, the fast baseline.
//!
//! The raw variants deliberately do NOT deduplicate repeated parent rows
//! arising from the fan-out, so their image counts overcount (3 tags per
//! image → 3 rows per entry). That matches the behavior under investigation
//! and is labeled as a known issue in the report rather than fixed.

use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashSet;

/// SQL shape a mapping layer emits for a two-level eager load: the nested
/// many-to-many is flattened into a decorrelated LEFT JOIN subquery, ordered
/// by the join keys so the client can reassemble the graph in one pass.
pub const MAPPING_SHAPED_SQL: &str = "\
SELECT be.BasketEntryId, be.BasketId, i.ImageId, i.FolderId, t0.TagId
FROM BasketEntries AS be
INNER JOIN Images AS i ON be.ImageId = i.ImageId
LEFT JOIN (
    SELECT it.ImageId, t.TagId
    FROM ImageTags AS it
    INNER JOIN Tags AS t ON it.TagId = t.TagId
) AS t0 ON i.ImageId = t0.ImageId
ORDER BY be.BasketEntryId, i.ImageId, t0.TagId";

/// Straight INNER JOIN chain with an explicit ORDER BY on every join key,
/// relying on sort-merge locality instead of the decorrelated subquery.
pub const ORDERED_JOIN_SQL: &str = "\
SELECT be.BasketEntryId, be.BasketId, i.ImageId, i.FolderId, t.TagId
FROM BasketEntries AS be
INNER JOIN Images AS i ON i.ImageId = be.ImageId
INNER JOIN ImageTags AS it ON it.ImageId = i.ImageId
INNER JOIN Tags AS t ON t.TagId = it.TagId
ORDER BY be.BasketEntryId, i.ImageId, it.TagId";

/// Parent-only fetch used by the split strategy.
const PARENT_ONLY_SQL: &str = "\
SELECT be.BasketEntryId, be.BasketId, i.ImageId, i.FolderId
FROM BasketEntries AS be
INNER JOIN Images AS i ON be.ImageId = i.ImageId
ORDER BY be.BasketEntryId";

/// Follow-up tag fetch for one image (split strategy).
const TAGS_FOR_IMAGE_SQL: &str = "\
SELECT t.TagId
FROM ImageTags AS it
INNER JOIN Tags AS t ON t.TagId = it.TagId
WHERE it.ImageId = ?1
ORDER BY t.TagId";

/// An image materialized by a query variant, one per basket entry (or per
/// flat row for the non-deduplicating raw variants).
#[derive(Debug, Clone, Default)]
pub struct LoadedImage {
    pub basket_entry_id: u32,
    pub basket_id: u32,
    pub image_id: u32,
    pub folder_id: Option<u32>,
    pub tag_ids: Vec<u32>,
}

/// Counts reported by one execution of a variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchStats {
    /// Image records materialized. For the raw variants this is the raw
    /// join row count, which overcounts by the tag fan-out.
    pub images_loaded: usize,
    /// Total tags attached across all materialized images.
    pub tags_loaded: usize,
    /// Distinct image ids seen, for cross-variant agreement checks.
    pub distinct_images: usize,
    /// Whether `images_loaded` deduplicates the join fan-out.
    pub deduplicated: bool,
}

/// Trait implemented by each query strategy.
pub trait QueryVariant {
    /// Human-readable name for reports.
    fn name(&self) -> &'static str;

    /// Execute the query and materialize the image records.
    fn fetch(&self, conn: &Connection) -> Result<Vec<LoadedImage>>;

    /// Whether materialization collapses the join fan-out.
    fn deduplicates(&self) -> bool;

    /// Execute once and summarize the result counts.
    fn run(&self, conn: &Connection) -> Result<FetchStats> {
        let images = self.fetch(conn)?;
        let distinct: HashSet<u32> = images.iter().map(|img| img.image_id).collect();
        Ok(FetchStats {
            images_loaded: images.len(),
            tags_loaded: images.iter().map(|img| img.tag_ids.len()).sum(),
            distinct_images: distinct.len(),
            deduplicated: self.deduplicates(),
        })
    }
}

/// All four strategies in benchmark order.
pub fn all_variants() -> Vec<Box<dyn QueryVariant>> {
    vec![
        Box::new(NestedInclude),
        Box::new(SplitLoad),
        Box::new(RawMappingShapedSql),
        Box::new(RawOrderedJoinSql),
    ]
}

/// One flat row of the joined result set.
struct FlatRow {
    basket_entry_id: u32,
    basket_id: u32,
    image_id: u32,
    folder_id: Option<u32>,
    tag_id: Option<u32>,
}

fn query_flat_rows(conn: &Connection, sql: &str) -> Result<Vec<FlatRow>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(FlatRow {
            basket_entry_id: row.get(0)?,
            basket_id: row.get(1)?,
            image_id: row.get(2)?,
            folder_id: row.get(3)?,
            tag_id: row.get(4)?,
        })
    })?;
    let mut result = Vec::new();
    for r in rows {
        result.push(r?);
    }
    Ok(result)
}

// ── Variant 1: nested include ─────────────────────────────────────────

/// Single composed query with client-side graph reassembly.
pub struct NestedInclude;

impl QueryVariant for NestedInclude {
    fn name(&self) -> &'static str {
        "nested-include"
    }

    fn deduplicates(&self) -> bool {
        true
    }

    fn fetch(&self, conn: &Connection) -> Result<Vec<LoadedImage>> {
        let rows = query_flat_rows(conn, MAPPING_SHAPED_SQL)?;

        // Rows arrive ordered by BasketEntryId, so the graph folds in one
        // pass: new entry id starts a new image, repeated ids accumulate
        // tags. This is the client-side work the fan-out forces on the
        // mapping layer.
        let mut images: Vec<LoadedImage> = Vec::new();
        for row in rows {
            let same_entry = images
                .last()
                .is_some_and(|img| img.basket_entry_id == row.basket_entry_id);
            if !same_entry {
                images.push(LoadedImage {
                    basket_entry_id: row.basket_entry_id,
                    basket_id: row.basket_id,
                    image_id: row.image_id,
                    folder_id: row.folder_id,
                    tag_ids: Vec::new(),
                });
            }
            if let (Some(img), Some(tag_id)) = (images.last_mut(), row.tag_id) {
                if !img.tag_ids.contains(&tag_id) {
                    img.tag_ids.push(tag_id);
                }
            }
        }
        Ok(images)
    }
}

// ── Variant 2: split load ─────────────────────────────────────────────

/// Two-step fetch: parents in one query, then tags per image.
pub struct SplitLoad;

impl QueryVariant for SplitLoad {
    fn name(&self) -> &'static str {
        "split-load"
    }

    fn deduplicates(&self) -> bool {
        true
    }

    fn fetch(&self, conn: &Connection) -> Result<Vec<LoadedImage>> {
        let mut images: Vec<LoadedImage> = {
            let mut stmt = conn.prepare_cached(PARENT_ONLY_SQL)?;
            let rows = stmt.query_map([], |row| {
                Ok(LoadedImage {
                    basket_entry_id: row.get(0)?,
                    basket_id: row.get(1)?,
                    image_id: row.get(2)?,
                    folder_id: row.get(3)?,
                    tag_ids: Vec::new(),
                })
            })?;
            let mut result = Vec::new();
            for r in rows {
                result.push(r?);
            }
            result
        };

        // One follow-up query per image — the N+1 cost this strategy trades
        // for avoiding the fan-out.
        let mut tag_stmt = conn.prepare_cached(TAGS_FOR_IMAGE_SQL)?;
        for img in &mut images {
            let tags = tag_stmt.query_map([img.image_id], |row| row.get::<_, u32>(0))?;
            for t in tags {
                img.tag_ids.push(t?);
            }
        }
        Ok(images)
    }
}

// ── Variant 3: raw SQL, mapping-shaped ────────────────────────────────

/// The mapping layer's generated SQL, materialized directly: shows the cost
/// is the row volume itself, not query-planning overhead.
pub struct RawMappingShapedSql;

impl QueryVariant for RawMappingShapedSql {
    fn name(&self) -> &'static str {
        "raw-sql-mapping-shaped"
    }

    fn deduplicates(&self) -> bool {
        false
    }

    fn fetch(&self, conn: &Connection) -> Result<Vec<LoadedImage>> {
        let rows = query_flat_rows(conn, MAPPING_SHAPED_SQL)?;
        Ok(rows.into_iter().map(flat_row_to_image).collect())
    }
}

// ── Variant 4: raw SQL, ordered joins ─────────────────────────────────

/// Plain inner joins ordered on the join keys, the fast baseline.
pub struct RawOrderedJoinSql;

impl QueryVariant for RawOrderedJoinSql {
    fn name(&self) -> &'static str {
        "raw-sql-ordered-joins"
    }

    fn deduplicates(&self) -> bool {
        false
    }

    fn fetch(&self, conn: &Connection) -> Result<Vec<LoadedImage>> {
        let rows = query_flat_rows(conn, ORDERED_JOIN_SQL)?;
        Ok(rows.into_iter().map(flat_row_to_image).collect())
    }
}

/// Naive row-to-record materialization: every flat row becomes its own
/// image record, so repeated parents from the fan-out are kept. This is the
/// documented overcount the raw variants preserve.
fn flat_row_to_image(row: FlatRow) -> LoadedImage {
    LoadedImage {
        basket_entry_id: row.basket_entry_id,
        basket_id: row.basket_id,
        image_id: row.image_id,
        folder_id: row.folder_id,
        tag_ids: row.tag_id.into_iter().collect(),
    }
}
