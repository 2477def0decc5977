use super::*;

impl FleetDb {
    // =========================================================================
    // User actions (behavior tracking)
    // =========================================================================

    /// Helper: map a row to `DbUserAction`. Reduces repetition across queries.
    pub(crate) fn map_user_action_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbUserAction> {
        Ok(DbUserAction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            session_id: row.get(2)?,
            module: row.get(3)?,
            action_type: row.get(4)?,
            context: row.get(5)?,
            page_url: row.get(6)?,
            metadata: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Append one user action to the log.
    pub fn insert_user_action(&self, action: &DbUserAction) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO user_actions (
                id, user_id, session_id, module, action_type,
                context, page_url, metadata, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                action.id,
                action.user_id,
                action.session_id,
                action.module,
                action.action_type,
                action.context,
                action.page_url,
                action.metadata,
                action.created_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent actions for a user, newest first.
    pub fn get_recent_actions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<DbUserAction>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, session_id, module, action_type,
                    context, page_url, metadata, created_at
             FROM user_actions
             WHERE user_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], Self::map_user_action_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Actions for a user at or after `since` (RFC3339), oldest first.
    pub fn get_actions_since(
        &self,
        user_id: &str,
        since: &str,
    ) -> Result<Vec<DbUserAction>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, session_id, module, action_type,
                    context, page_url, metadata, created_at
             FROM user_actions
             WHERE user_id = ?1 AND created_at >= ?2
             ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![user_id, since], Self::map_user_action_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
