use std::time::Duration;

use anyhow::Result;
use diesel::{
    PgConnection, RunQueryDsl,
    connection::{CacheSize, Connection, SimpleConnection},
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

/// Applied to every pooled connection: no prepared statement cache (the
/// pool may sit behind pgbouncer) and a server-side statement timeout.
#[derive(Debug)]
struct SessionSettings {
    statement_timeout: Duration,
}

impl CustomizeConnection<PgConnection, R2d2Error> for SessionSettings {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        conn.batch_execute(&format!(
            "SET statement_timeout = {}",
            self.statement_timeout.as_millis()
        ))
        .map_err(R2d2Error::QueryError)?;
        Ok(())
    }
}

pub fn establish_connection(
    database_url: &str,
    max_size: u32,
    statement_timeout: Duration,
) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SessionSettings { statement_timeout }))
        .build(manager)?;
    Ok(pool)
}

/// Liveness check run at startup.
pub fn ping(pool: &PgPoolSquad) -> Result<()> {
    let mut conn = pool.get()?;
    diesel::sql_query("SELECT 1").execute(&mut conn)?;
    Ok(())
}
