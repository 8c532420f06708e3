//! Data generation: seeds the database with a deterministic-shape dataset.
//!
//! Phases run in dependency order and each is fully committed before the
//! next begins, because later phases reference row ids assigned by earlier
//! ones. The ImageTags phase is by far the largest (3 rows per image) and
//! commits in batches to bound transaction size.

use crate::schema::GenParams;
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use std::io::Write;

/// Populate an empty schema with synthetic data.
///
/// Uses the seed from `params` for deterministic, reproducible datasets.
pub fn generate_test_data(conn: &mut Connection, params: &GenParams) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(params.seed);

    let image_count = params.image_count;
    let tag_count = params.tag_count();
    let folder_count = params.folder_count();
    let basket_count = params.basket_count();
    let basket_entry_count = params.basket_entry_count();

    ensure!(
        folder_count >= 2,
        "folder range [1, {folder_count}) is empty; image_count is too small"
    );
    ensure!(
        range_size(1, tag_count) >= GenParams::TAGS_PER_IMAGE,
        "tag range [1, {tag_count}) is too small to pick {} distinct tags per image",
        GenParams::TAGS_PER_IMAGE
    );
    ensure!(
        range_size(1, image_count) * range_size(1, basket_count)
            >= basket_entry_count as usize,
        "image/basket space is too small for {basket_entry_count} distinct basket entries"
    );

    // ── Folders ─────────────────────────────────────────────────────
    println!("Creating {folder_count} folders.");
    {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO Folders DEFAULT VALUES")?;
            for _ in 0..folder_count {
                stmt.execute([])?;
            }
        }
        tx.commit()?;
    }

    // ── Images + metadata ───────────────────────────────────────────
    println!("Creating {image_count} images + metadata.");
    {
        let tx = conn.transaction()?;
        {
            let mut img_stmt = tx.prepare("INSERT INTO Images (FolderId) VALUES (?1)")?;
            let mut meta_stmt = tx.prepare("INSERT INTO ImageMetaData (ImageId) VALUES (?1)")?;
            for image_id in 1..=image_count {
                let folder_id = rng.gen_range(1..folder_count);
                img_stmt.execute(params![folder_id])?;
                meta_stmt.execute(params![image_id])?;
            }
        }
        tx.commit()?;
    }

    // ── Tags ────────────────────────────────────────────────────────
    println!("Creating {tag_count} Tags.");
    {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO Tags DEFAULT VALUES")?;
            for _ in 0..tag_count {
                stmt.execute([])?;
            }
        }
        tx.commit()?;
    }

    // ── ImageTags ───────────────────────────────────────────────────
    println!(
        "Creating {} ImageTags for every image.",
        GenParams::TAGS_PER_IMAGE
    );
    {
        let mut tx = conn.transaction()?;
        for image_id in 1..=image_count {
            let tag_ids = random_distinct(&mut rng, 1, tag_count, GenParams::TAGS_PER_IMAGE)?;
            {
                let mut stmt = tx
                    .prepare_cached("INSERT INTO ImageTags (ImageId, TagId) VALUES (?1, ?2)")?;
                for tag_id in tag_ids {
                    stmt.execute(params![image_id, tag_id])?;
                }
            }

            if image_id % GenParams::FLUSH_INTERVAL == 0 {
                tx.commit()?;
                print!(".");
                std::io::stdout().flush().ok();
                tx = conn.transaction()?;
            }
        }
        tx.commit()?;
        println!();
    }

    // ── Baskets ─────────────────────────────────────────────────────
    println!("Creating {basket_count} Baskets.");
    {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO Baskets DEFAULT VALUES")?;
            for _ in 0..basket_count {
                stmt.execute([])?;
            }
        }
        tx.commit()?;
    }

    // ── Basket entries ──────────────────────────────────────────────
    // (ImageId, BasketId) carries a unique index, so pairs are drawn with
    // rejection sampling rather than risking a constraint violation on a
    // random collision.
    println!("Creating {basket_entry_count} Basket Entries.");
    {
        let mut pairs: Vec<(u32, u32)> = Vec::with_capacity(basket_entry_count as usize);
        while pairs.len() < basket_entry_count as usize {
            let pair = (rng.gen_range(1..image_count), rng.gen_range(1..basket_count));
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }

        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO BasketEntries (ImageId, BasketId) VALUES (?1, ?2)")?;
            for (image_id, basket_id) in pairs {
                stmt.execute(params![image_id, basket_id])?;
            }
        }
        tx.commit()?;
    }

    println!("Test Data created.");
    Ok(())
}

/// Pick `count` distinct random values from the half-open range `[min, max)`.
///
/// Rejection sampling: draw, discard already-chosen values, repeat. With 3
/// picks from a pool of thousands the retry rate is negligible. The range
/// size is validated up front so a degenerate pool cannot loop forever.
pub fn random_distinct(rng: &mut StdRng, min: u32, max: u32, count: usize) -> Result<Vec<u32>> {
    ensure!(
        range_size(min, max) >= count,
        "cannot pick {count} distinct values from [{min}, {max})"
    );

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let next = rng.gen_range(min..max);
        if !picked.contains(&next) {
            picked.push(next);
        }
    }
    Ok(picked)
}

fn range_size(min: u32, max: u32) -> usize {
    max.saturating_sub(min) as usize
}
