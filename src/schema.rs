//! Schema definition and generation parameters.
//!
//! Table and column names match the relational model the raw SQL strings in
//! [`crate::queries`] are written against, so the DDL here and those strings
//! must stay in sync.

use anyhow::Result;
use rusqlite::Connection;

/// Path of the on-disk database the binary works against.
pub const DB_PATH: &str = "./TestDB.db";

/// Parameters describing the dataset to generate.
///
/// Everything is derived from `image_count` except the basket side, which is
/// deliberately tiny: the benchmark query only touches images referenced by
/// a basket entry, so the working set stays small while the tables are large.
#[derive(Debug, Clone, Copy)]
pub struct GenParams {
    /// Number of Image rows (and ImageMetaData rows) to create.
    pub image_count: u32,
    /// RNG seed, carried explicitly so runs are reproducible.
    pub seed: u64,
}

impl GenParams {
    /// Reference dataset: 500k images, large enough to show the fan-out cost.
    pub fn standard() -> Self {
        Self {
            image_count: 500_000,
            seed: 0xBA5E_BA11_CAFE_5EED,
        }
    }

    /// Distinct tags assigned to every image.
    pub const TAGS_PER_IMAGE: usize = 3;

    /// Images per ImageTag transaction commit during generation.
    pub const FLUSH_INTERVAL: u32 = 10_000;

    pub fn tag_count(&self) -> u32 {
        self.image_count / 50
    }

    pub fn folder_count(&self) -> u32 {
        self.image_count / 20
    }

    pub fn basket_count(&self) -> u32 {
        5
    }

    pub fn basket_entry_count(&self) -> u32 {
        15
    }
}

/// Create all tables and indexes.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE Folders (
            FolderId    INTEGER PRIMARY KEY AUTOINCREMENT
        );

        CREATE TABLE Images (
            ImageId     INTEGER PRIMARY KEY AUTOINCREMENT,
            FolderId    INTEGER,
            FOREIGN KEY (FolderId) REFERENCES Folders (FolderId)
        );

        CREATE INDEX IX_Images_FolderId ON Images (FolderId);

        -- 1:1 with Images, one row per image
        CREATE TABLE ImageMetaData (
            MetaDataId  INTEGER PRIMARY KEY AUTOINCREMENT,
            ImageId     INTEGER NOT NULL,
            FOREIGN KEY (ImageId) REFERENCES Images (ImageId) ON DELETE CASCADE
        );

        CREATE INDEX IX_ImageMetaData_ImageId ON ImageMetaData (ImageId);

        CREATE TABLE Tags (
            TagId       INTEGER PRIMARY KEY AUTOINCREMENT
        );

        -- Join table for the Images <-> Tags many-to-many
        CREATE TABLE ImageTags (
            ImageId     INTEGER NOT NULL,
            TagId       INTEGER NOT NULL,
            PRIMARY KEY (ImageId, TagId),
            FOREIGN KEY (ImageId) REFERENCES Images (ImageId) ON DELETE CASCADE,
            FOREIGN KEY (TagId)   REFERENCES Tags (TagId)     ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IX_ImageTags_ImageId_TagId ON ImageTags (ImageId, TagId);

        CREATE TABLE Baskets (
            BasketId    INTEGER PRIMARY KEY AUTOINCREMENT
        );

        CREATE TABLE BasketEntries (
            BasketEntryId   INTEGER PRIMARY KEY AUTOINCREMENT,
            ImageId         INTEGER NOT NULL,
            BasketId        INTEGER NOT NULL,
            FOREIGN KEY (ImageId)  REFERENCES Images (ImageId)   ON DELETE CASCADE,
            FOREIGN KEY (BasketId) REFERENCES Baskets (BasketId) ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IX_BasketEntries_ImageId_BasketId
            ON BasketEntries (ImageId, BasketId);
        ",
    )?;
    Ok(())
}

/// Configure a connection for bulk-insert and scan performance.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = OFF;
         PRAGMA cache_size = -131072;
         PRAGMA temp_store = MEMORY;
         PRAGMA foreign_keys = ON;",
    )?;
    Ok(())
}

/// Whether the expected seeded dataset is already present.
///
/// The BasketEntries row count is the sentinel for a complete dataset.
/// A missing table (fresh or partially-created database) counts as absent.
pub fn test_data_exists(conn: &Connection, params: &GenParams) -> Result<bool> {
    let table_present: u32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'BasketEntries'",
        [],
        |row| row.get(0),
    )?;
    if table_present == 0 {
        return Ok(false);
    }

    let entries: u32 = conn.query_row("SELECT COUNT(*) FROM BasketEntries", [], |row| row.get(0))?;
    Ok(entries == params.basket_entry_count())
}
