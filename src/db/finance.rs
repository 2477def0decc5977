use super::*;

impl FleetDb {
    // =========================================================================
    // Finance transactions
    // =========================================================================

    pub(crate) fn map_finance_row(
        row: &rusqlite::Row<'_>,
    ) -> rusqlite::Result<DbFinanceTransaction> {
        Ok(DbFinanceTransaction {
            id: row.get(0)?,
            job_id: row.get(1)?,
            source_module: row.get(2)?,
            kind: row.get(3)?,
            amount: row.get(4)?,
            currency: row.get(5)?,
            description: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    /// Insert a new finance transaction. Fails on duplicate id.
    pub fn insert_finance_transaction(
        &self,
        transaction: &DbFinanceTransaction,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO finance_transactions (
                id, job_id, source_module, kind, amount, currency, description, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                transaction.id,
                transaction.job_id,
                transaction.source_module,
                transaction.kind,
                transaction.amount,
                transaction.currency,
                transaction.description,
                transaction.created_at,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a finance transaction. Sync steps use this with
    /// deterministic ids so re-runs land on the same row.
    pub fn upsert_finance_transaction(
        &self,
        transaction: &DbFinanceTransaction,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO finance_transactions (
                id, job_id, source_module, kind, amount, currency, description, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                job_id = excluded.job_id,
                source_module = excluded.source_module,
                kind = excluded.kind,
                amount = excluded.amount,
                currency = excluded.currency,
                description = excluded.description",
            params![
                transaction.id,
                transaction.job_id,
                transaction.source_module,
                transaction.kind,
                transaction.amount,
                transaction.currency,
                transaction.description,
                transaction.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get finance transactions booked against a job.
    pub fn get_finance_for_job(&self, job_id: &str) -> Result<Vec<DbFinanceTransaction>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, job_id, source_module, kind, amount, currency, description, created_at
             FROM finance_transactions WHERE job_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![job_id], Self::map_finance_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
