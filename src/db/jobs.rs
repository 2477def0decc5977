use super::*;

impl FleetDb {
    // =========================================================================
    // Jobs
    // =========================================================================

    /// Helper: map a row to `DbJob`.
    pub(crate) fn map_job_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbJob> {
        Ok(DbJob {
            id: row.get(0)?,
            name: row.get(1)?,
            status: row
                .get::<_, Option<String>>(2)?
                .unwrap_or_else(|| "open".to_string()),
            estimated_cost: row.get(3)?,
            actual_cost: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Insert or update a job.
    pub fn upsert_job(&self, job: &DbJob) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO jobs (
                id, name, status, estimated_cost, actual_cost, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                estimated_cost = excluded.estimated_cost,
                actual_cost = excluded.actual_cost,
                updated_at = excluded.updated_at",
            params![
                job.id,
                job.name,
                job.status,
                job.estimated_cost,
                job.actual_cost,
                job.created_at,
                job.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a job by ID.
    pub fn get_job(&self, id: &str) -> Result<Option<DbJob>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, status, estimated_cost, actual_cost, created_at, updated_at
             FROM jobs WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_job_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get the most recently touched jobs.
    pub fn get_recent_jobs(&self, limit: i64) -> Result<Vec<DbJob>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, status, estimated_cost, actual_cost, created_at, updated_at
             FROM jobs ORDER BY updated_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], Self::map_job_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
