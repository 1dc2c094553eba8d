use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use actix_web::web;

use crate::{errors::StorageError, models::note::Note, schema::notes::dsl::*};

pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Source of "now" for every timestamp the store writes or compares against.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the server's local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// How long notes survive in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Grace window after the first read.
    pub opened_ttl: Duration,
    /// Lifetime of a note nobody has read.
    pub unopened_ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        ExpiryPolicy {
            opened_ttl: Duration::minutes(5),
            unopened_ttl: Duration::days(7),
        }
    }
}

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a pool for `database_url` and brings the schema up to date.
pub fn connect(database_url: &str, pool_size: u32) -> Result<Pool, StorageError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    let mut connection = pool.get()?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StorageError::MigrationError(e.to_string()))?;
    if !applied.is_empty() {
        log::info!("applied {} migration(s)", applied.len());
    }

    Ok(pool)
}

fn delete_expired(
    connection: &mut SqliteConnection,
    now: NaiveDateTime,
    policy: ExpiryPolicy,
) -> QueryResult<usize> {
    // a window reaching past the calendar's start never expires anything
    let opened_cutoff = now
        .checked_sub_signed(policy.opened_ttl)
        .unwrap_or(NaiveDateTime::MIN);
    let unopened_cutoff = now
        .checked_sub_signed(policy.unopened_ttl)
        .unwrap_or(NaiveDateTime::MIN);

    diesel::delete(
        notes.filter(
            opened_at
                .is_not_null()
                .and(opened_at.lt(opened_cutoff))
                .or(opened_at.is_null().and(created_at.lt(unopened_cutoff))),
        ),
    )
    .execute(connection)
}

fn set_opened(
    connection: &mut SqliteConnection,
    note_id: &str,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    // opened_at is written once; later calls must not restart the grace window
    diesel::update(notes.filter(id.eq(note_id)).filter(opened_at.is_null()))
        .set(opened_at.eq(now))
        .execute(connection)
}

/// Owns the notes table. Every operation runs on actix's blocking pool.
#[derive(Clone)]
pub struct NoteStore {
    pool: Pool,
    policy: ExpiryPolicy,
    clock: Arc<dyn Clock>,
}

impl NoteStore {
    pub fn new(pool: Pool, policy: ExpiryPolicy) -> Self {
        Self::with_clock(pool, policy, Arc::new(LocalClock))
    }

    pub fn with_clock(pool: Pool, policy: ExpiryPolicy, clock: Arc<dyn Clock>) -> Self {
        NoteStore {
            pool,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    pub async fn create(&self, note_id: &str, note_content: &str) -> Result<(), StorageError> {
        let pool = self.pool.clone();
        let note_id = note_id.to_owned();
        let note_content = note_content.to_owned();
        let now = self.clock.now();

        web::block(move || -> Result<(), StorageError> {
            let mut connection = pool.get()?;
            diesel::insert_into(notes)
                .values((
                    id.eq(note_id),
                    content.eq(note_content),
                    created_at.eq(now),
                ))
                .execute(&mut connection)?;
            Ok(())
        })
        .await?
    }

    pub async fn read(&self, note_id: &str) -> Result<Option<Note>, StorageError> {
        let pool = self.pool.clone();
        let note_id = note_id.to_owned();

        web::block(move || -> Result<Option<Note>, StorageError> {
            let mut connection = pool.get()?;
            let note = notes
                .find(note_id)
                .first::<Note>(&mut connection)
                .optional()?;
            Ok(note)
        })
        .await?
    }

    /// Stamps `opened_at` on a note that has never been opened. No-op otherwise.
    pub async fn mark_opened(&self, note_id: &str) -> Result<(), StorageError> {
        let pool = self.pool.clone();
        let note_id = note_id.to_owned();
        let now = self.clock.now();

        web::block(move || -> Result<(), StorageError> {
            let mut connection = pool.get()?;
            if set_opened(&mut connection, &note_id, now)? == 0 {
                log::debug!("note {note_id} is missing or already opened");
            }
            Ok(())
        })
        .await?
    }

    pub async fn purge_expired(&self) -> Result<(), StorageError> {
        let pool = self.pool.clone();
        let policy = self.policy;
        let now = self.clock.now();

        web::block(move || -> Result<(), StorageError> {
            let mut connection = pool.get()?;
            let purged = delete_expired(&mut connection, now, policy)?;
            if purged > 0 {
                log::debug!("purged {purged} expired note(s)");
            }
            Ok(())
        })
        .await?
    }

    /// Share-link flow: purge, read and mark the note opened in one transaction,
    /// so a concurrent sweep cannot delete the note between the steps.
    pub async fn open(&self, note_id: &str) -> Result<Option<Note>, StorageError> {
        let pool = self.pool.clone();
        let policy = self.policy;
        let note_id = note_id.to_owned();
        let now = self.clock.now();

        web::block(move || -> Result<Option<Note>, StorageError> {
            let mut connection = pool.get()?;
            let note = connection.immediate_transaction::<_, diesel::result::Error, _>(
                |connection| {
                    let purged = delete_expired(connection, now, policy)?;
                    if purged > 0 {
                        log::debug!("purged {purged} expired note(s)");
                    }

                    let mut note = match notes
                        .find(note_id.as_str())
                        .first::<Note>(connection)
                        .optional()?
                    {
                        Some(note) => note,
                        None => return Ok(None),
                    };

                    if !note.is_opened() {
                        set_opened(connection, &note_id, now)?;
                        note.opened_at = Some(now);
                    }

                    Ok(Some(note))
                },
            )?;
            Ok(note)
        })
        .await?
    }
}
