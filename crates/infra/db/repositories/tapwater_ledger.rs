use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    PgConnection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    insert_into, update,
};
use std::sync::Arc;
use tokio::task;
use tracing::warn;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{accounts, customers, transactions},
};
use domain::{
    entities::transactions::TransactionEntity,
    repositories::tapwater_ledger::{LedgerError, TapWaterLedgerRepository},
    value_objects::tapwater_ledger::{LedgerEntry, LedgerOutcome},
};

/// Serializable transactions that lose a read/write race are re-run this many
/// times. Only the local write is repeated; the billing backend is never
/// called again from here.
const SERIALIZATION_ATTEMPTS: usize = 3;

/// Postgres' name for the `UNIQUE` on `transactions.external_number`.
const EXTERNAL_ID_CONSTRAINT: &str = "transactions_external_number_key";

pub struct TapWaterLedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TapWaterLedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TapWaterLedgerRepository for TapWaterLedgerPostgres {
    async fn record_transaction(
        &self,
        entry: LedgerEntry,
    ) -> Result<TransactionEntity, LedgerError> {
        // Diesel is synchronous; keep the transaction on the blocking pool.
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<TransactionEntity, LedgerError> {
            let mut conn = db_pool.get().map_err(|err| LedgerError::Storage(err.into()))?;

            run_serializable(entry.external_id(), || {
                conn.build_transaction()
                    .serializable()
                    .run(|tx| write_entry(tx, &entry))
            })
        })
        .await
        .map_err(|err| LedgerError::Storage(anyhow!("ledger write task failed: {err}")))?
    }
}

/// Runs `attempt_tx` until it commits, re-running it after a serialization
/// failure at most `SERIALIZATION_ATTEMPTS` times in total.
fn run_serializable<T>(
    external_id: &str,
    mut attempt_tx: impl FnMut() -> QueryResult<T>,
) -> Result<T, LedgerError> {
    let mut attempt = 1;
    loop {
        match attempt_tx() {
            Ok(value) => return Ok(value),
            Err(DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info))
                if attempt < SERIALIZATION_ATTEMPTS =>
            {
                warn!(
                    external_id,
                    attempt,
                    db_error = %info.message(),
                    "tapwater_ledger: serialization failure, re-running local transaction"
                );
                attempt += 1;
            }
            Err(err) => return Err(classify(err, external_id)),
        }
    }
}

fn write_entry(tx: &mut PgConnection, entry: &LedgerEntry) -> QueryResult<TransactionEntity> {
    insert_into(accounts::table)
        .values(&entry.account)
        .on_conflict(accounts::ban)
        .do_nothing()
        .execute(tx)?;

    insert_into(customers::table)
        .values(&entry.customer)
        .on_conflict(customers::id)
        .do_nothing()
        .execute(tx)?;

    insert_into(transactions::table)
        .values(&entry.transaction)
        .execute(tx)?;

    let now = Utc::now();
    let row = transactions::table.filter(transactions::id.eq(entry.transaction.id));

    match &entry.outcome {
        LedgerOutcome::Accepted {
            reference_number,
            lcy_fee,
            customer_display_name,
        } => {
            if let Some(display_name) = customer_display_name {
                update(customers::table.filter(customers::id.eq(&entry.customer.id)))
                    .set((
                        customers::display_name.eq(display_name),
                        customers::updated_at.eq(now),
                    ))
                    .execute(tx)?;
            }

            update(row)
                .set((
                    transactions::reference_number.eq(reference_number),
                    transactions::lcy_fee.eq(*lcy_fee),
                    transactions::success.eq(true),
                    transactions::updated_at.eq(now),
                ))
                .returning(TransactionEntity::as_returning())
                .get_result(tx)
        }
        LedgerOutcome::Rejected { reason } => update(row)
            .set((
                transactions::success.eq(false),
                transactions::error.eq(reason),
                transactions::updated_at.eq(now),
            ))
            .returning(TransactionEntity::as_returning())
            .get_result(tx),
    }
}

fn classify(err: DieselError, external_id: &str) -> LedgerError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(EXTERNAL_ID_CONSTRAINT) =>
        {
            LedgerError::DuplicateExternalId(external_id.to_string())
        }
        other => LedgerError::Storage(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Info {
        message: &'static str,
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.message
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(
        kind: DatabaseErrorKind,
        message: &'static str,
        constraint: Option<&'static str>,
    ) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(Info {
                message,
                constraint,
            }),
        )
    }

    fn serialization_failure() -> DieselError {
        db_error(
            DatabaseErrorKind::SerializationFailure,
            "could not serialize access due to read/write dependencies among transactions",
            None,
        )
    }

    #[test]
    fn external_id_violation_is_a_duplicate() {
        let err = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint",
            Some(EXTERNAL_ID_CONSTRAINT),
        );

        assert!(matches!(
            classify(err, "ext-1"),
            LedgerError::DuplicateExternalId(id) if id == "ext-1"
        ));
    }

    #[test]
    fn other_unique_violations_are_storage_failures() {
        let err = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint",
            Some("transactions_pkey"),
        );
        assert!(matches!(classify(err, "ext-1"), LedgerError::Storage(_)));

        let unnamed = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint",
            None,
        );
        assert!(matches!(classify(unnamed, "ext-1"), LedgerError::Storage(_)));
    }

    #[test]
    fn other_database_errors_are_storage_failures() {
        let err = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "violates foreign key constraint",
            Some("transactions_account_ban_fkey"),
        );
        assert!(matches!(classify(err, "ext-1"), LedgerError::Storage(_)));

        assert!(matches!(
            classify(DieselError::NotFound, "ext-1"),
            LedgerError::Storage(_)
        ));
    }

    #[test]
    fn serialization_failures_are_retried_until_commit() {
        let calls = Cell::new(0);

        let result = run_serializable("ext-1", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(serialization_failure())
            } else {
                Ok("committed")
            }
        });

        assert!(matches!(result, Ok("committed")));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn serialization_retries_are_bounded() {
        let calls = Cell::new(0);

        let result: Result<(), LedgerError> = run_serializable("ext-1", || {
            calls.set(calls.get() + 1);
            Err(serialization_failure())
        });

        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert_eq!(calls.get(), SERIALIZATION_ATTEMPTS);
    }

    #[test]
    fn duplicates_are_not_retried() {
        let calls = Cell::new(0);

        let result: Result<(), LedgerError> = run_serializable("ext-1", || {
            calls.set(calls.get() + 1);
            Err(db_error(
                DatabaseErrorKind::UniqueViolation,
                "duplicate key value violates unique constraint",
                Some(EXTERNAL_ID_CONSTRAINT),
            ))
        });

        assert!(matches!(result, Err(LedgerError::DuplicateExternalId(_))));
        assert_eq!(calls.get(), 1);
    }
}
