//! SQLite annotation store
//!
//! A database file with two tables:
//!
//! * `Reference`: one row per reference sequence (accession, version,
//!   length, sequence checksum, organism). Several rows may share an
//!   accession and version; the lowest `id` is used.
//! * `TranscriptMapping`: one row per transcript with its outer extent,
//!   comma-separated exon starts and stops, optional CDS and protein link.
//!
//! The connection is read-only once opened. Each thread should open its own
//! store.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};

use crate::error::RetrieverError;
use crate::reference::mock::compare_versions;
use crate::reference::provider::{expect_unique, AnnotationStore};
use crate::reference::row::{
    format_positions, parse_positions, Reference, Strand, TranscriptRow,
};

//-----------------------------------------------------------------------------

/// A database connection to an annotation database.
///
/// # Examples
///
/// ```
/// use ferro_retriever::reference::{AnnotationStore, Reference, SqliteStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let db_file = dir.path().join("annotation.db");
/// let mut store = SqliteStore::create(&db_file).unwrap();
/// let id = store.insert_reference(&Reference {
///     id: 0,
///     accession: "NC_000001".to_string(),
///     version: "11".to_string(),
///     length: 1000,
///     sequence_checksum: "abc".to_string(),
///     organism: None,
/// }).unwrap();
/// drop(store);
///
/// let store = SqliteStore::open(&db_file).unwrap();
/// let reference = store.find_reference("NC_000001", Some("11")).unwrap().unwrap();
/// assert_eq!(reference.id, id);
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

const TRANSCRIPT_COLUMNS: &str = "gene, strand, start, stop, exons_start, exons_stop, \
     cds_start, cds_stop, transcript_accession, transcript_version, \
     protein_accession, protein_version, transcript_product, protein_product";

/// Using the database.
impl SqliteStore {
    /// Opens a read-only connection to the database in the given file.
    ///
    /// Passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P) -> Result<Self, RetrieverError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(filename, flags)?;
        Ok(SqliteStore { connection })
    }

    /// Returns the filename of the database, if any.
    pub fn filename(&self) -> Option<&str> {
        self.connection.path()
    }

    fn transcripts_where(
        &self,
        condition: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        let sql = format!(
            "SELECT {} FROM TranscriptMapping WHERE {} ORDER BY id",
            TRANSCRIPT_COLUMNS, condition
        );
        let mut statement = self.connection.prepare_cached(&sql)?;
        let rows = statement.query_map(params, transcript_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row??);
        }
        Ok(result)
    }
}

//-----------------------------------------------------------------------------

/// Creating the database.
impl SqliteStore {
    /// Creates a new empty database with the annotation tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the database already exists.
    /// Passes through any database errors.
    pub fn create<P: AsRef<Path>>(filename: P) -> Result<Self, RetrieverError> {
        let filename = filename.as_ref();
        if filename.exists() {
            return Err(RetrieverError::Store {
                msg: format!("Database {} already exists", filename.display()),
            });
        }

        let connection = Connection::open(filename)?;
        connection.execute_batch(
            "CREATE TABLE Reference (
                id INTEGER PRIMARY KEY,
                accession TEXT NOT NULL,
                version TEXT NOT NULL,
                length INTEGER NOT NULL,
                checksum TEXT NOT NULL,
                organism TEXT
            ) STRICT;
            CREATE INDEX ReferenceAccession ON Reference(accession, version);
            CREATE TABLE TranscriptMapping (
                id INTEGER PRIMARY KEY,
                reference_id INTEGER NOT NULL REFERENCES Reference(id),
                gene TEXT NOT NULL,
                strand TEXT NOT NULL,
                start INTEGER NOT NULL,
                stop INTEGER NOT NULL,
                exons_start TEXT,
                exons_stop TEXT,
                cds_start INTEGER,
                cds_stop INTEGER,
                transcript_accession TEXT NOT NULL,
                transcript_version TEXT NOT NULL,
                protein_accession TEXT,
                protein_version TEXT,
                transcript_product TEXT,
                protein_product TEXT
            ) STRICT;
            CREATE INDEX TranscriptRange ON TranscriptMapping(reference_id, start, stop);
            CREATE INDEX TranscriptGene ON TranscriptMapping(reference_id, gene);",
        )?;

        Ok(SqliteStore { connection })
    }

    /// Inserts a reference and returns its store identifier.
    ///
    /// The `id` field of the argument is ignored.
    pub fn insert_reference(&mut self, reference: &Reference) -> Result<i64, RetrieverError> {
        self.connection.execute(
            "INSERT INTO Reference(accession, version, length, checksum, organism)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &reference.accession,
                &reference.version,
                reference.length as i64,
                &reference.sequence_checksum,
                &reference.organism,
            ),
        )?;
        Ok(self.connection.last_insert_rowid())
    }

    /// Inserts a transcript row for the given reference.
    pub fn insert_transcript(
        &mut self,
        reference_id: i64,
        row: &TranscriptRow,
    ) -> Result<(), RetrieverError> {
        let transaction = self.connection.transaction()?;
        {
            let mut insert = transaction.prepare_cached(&format!(
                "INSERT INTO TranscriptMapping(reference_id, {})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                TRANSCRIPT_COLUMNS
            ))?;
            insert.execute(rusqlite::params![
                reference_id,
                &row.gene,
                row.strand.as_str(),
                row.transcript_start as i64,
                row.transcript_stop as i64,
                row.exons_start.as_deref().map(format_positions),
                row.exons_stop.as_deref().map(format_positions),
                row.cds_start.map(|p| p as i64),
                row.cds_stop.map(|p| p as i64),
                &row.transcript_accession,
                &row.transcript_version,
                &row.protein_accession,
                &row.protein_version,
                &row.transcript_product,
                &row.protein_product,
            ])?;
        }
        transaction.commit()?;
        Ok(())
    }
}

//-----------------------------------------------------------------------------

impl AnnotationStore for SqliteStore {
    fn find_reference(
        &self,
        accession: &str,
        version: Option<&str>,
    ) -> Result<Option<Reference>, RetrieverError> {
        let mut statement = self.connection.prepare_cached(
            "SELECT id, accession, version, length, checksum, organism FROM Reference
             WHERE accession = ?1 AND (?2 IS NULL OR version = ?2)
             ORDER BY id LIMIT 1",
        )?;
        let reference = statement
            .query_row((accession, version), |row| {
                let length: i64 = row.get(3)?;
                Ok(Reference {
                    id: row.get(0)?,
                    accession: row.get(1)?,
                    version: row.get(2)?,
                    length: length.max(0) as u64,
                    sequence_checksum: row.get(4)?,
                    organism: row.get(5)?,
                })
            })
            .optional()?;
        Ok(reference)
    }

    fn list_versions(&self, accession: &str) -> Result<Vec<String>, RetrieverError> {
        let mut statement = self
            .connection
            .prepare_cached("SELECT DISTINCT version FROM Reference WHERE accession = ?1")?;
        let rows = statement.query_map((accession,), |row| row.get::<_, String>(0))?;
        let mut versions = Vec::new();
        for version in rows {
            versions.push(version?);
        }
        versions.sort_by(|a, b| compare_versions(a, b));
        Ok(versions)
    }

    fn find_transcripts_overlapping(
        &self,
        reference_id: i64,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        self.transcripts_where(
            "reference_id = ?1 AND start <= ?3 AND stop >= ?2",
            (reference_id, start as i64, end as i64),
        )
    }

    fn find_transcripts_by_gene(
        &self,
        reference_id: i64,
        gene: &str,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        self.transcripts_where("reference_id = ?1 AND gene = ?2", (reference_id, gene))
    }

    fn find_transcript(
        &self,
        reference_id: i64,
        accession: &str,
        version: &str,
    ) -> Result<Option<TranscriptRow>, RetrieverError> {
        let rows = self.transcripts_where(
            "reference_id = ?1 AND transcript_accession = ?2 AND transcript_version = ?3",
            (reference_id, accession, version),
        )?;
        expect_unique(rows, || format!("{}.{}", accession, version))
    }
}

//-----------------------------------------------------------------------------

// Converts a result row into a transcript row. The outer result carries
// SQLite errors, the inner one data errors.
fn transcript_from_row(row: &Row) -> rusqlite::Result<Result<TranscriptRow, RetrieverError>> {
    let strand: String = row.get(1)?;
    let start: i64 = row.get(2)?;
    let stop: i64 = row.get(3)?;
    let exons_start: Option<String> = row.get(4)?;
    let exons_stop: Option<String> = row.get(5)?;
    let cds_start: Option<i64> = row.get(6)?;
    let cds_stop: Option<i64> = row.get(7)?;
    let transcript_accession: String = row.get(8)?;
    let transcript_version: String = row.get(9)?;

    let (transcript_start, transcript_stop) = match (position(start), position(stop)) {
        (Some(start), Some(stop)) => (start, stop),
        _ => {
            return Ok(Err(RetrieverError::Store {
                msg: format!(
                    "Invalid extent {}-{} for {}.{}",
                    start, stop, transcript_accession, transcript_version
                ),
            }))
        }
    };

    let transcript_id = format!("{}.{}", transcript_accession, transcript_version);
    Ok(Ok(TranscriptRow {
        gene: row.get(0)?,
        strand: Strand::parse(&strand),
        transcript_start,
        transcript_stop,
        exons_start: decode_exons(exons_start.as_deref(), &transcript_id),
        exons_stop: decode_exons(exons_stop.as_deref(), &transcript_id),
        cds_start: cds_start.and_then(position),
        cds_stop: cds_stop.and_then(position),
        transcript_accession,
        transcript_version,
        protein_accession: row.get(10)?,
        protein_version: row.get(11)?,
        transcript_product: row.get(12)?,
        protein_product: row.get(13)?,
    }))
}

// 1-based positions are positive.
fn position(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|&p| p > 0)
}

fn decode_exons(csv: Option<&str>, transcript_id: &str) -> Option<Vec<u64>> {
    let csv = csv?;
    let positions = parse_positions(csv);
    if positions.is_none() && !csv.trim().is_empty() {
        log::warn!("Ignoring malformed exon list '{}' for {}", csv, transcript_id);
    }
    positions
}

//-----------------------------------------------------------------------------
