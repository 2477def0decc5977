use super::*;

impl FleetDb {
    // =========================================================================
    // Behavior patterns
    // =========================================================================

    pub(crate) fn map_pattern_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbBehaviorPattern> {
        Ok(DbBehaviorPattern {
            id: row.get(0)?,
            user_id: row.get(1)?,
            module: row.get(2)?,
            pattern_type: row.get(3)?,
            pattern_data: row.get(4)?,
            frequency: row.get(5)?,
            confidence: row.get(6)?,
            last_occurrence: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// Insert or update a behavior pattern. One row per
    /// (user, module, pattern_type); re-analysis overwrites the stats in
    /// place and the original row id survives.
    pub fn upsert_behavior_pattern(&self, pattern: &DbBehaviorPattern) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO behavior_patterns (
                id, user_id, module, pattern_type, pattern_data,
                frequency, confidence, last_occurrence, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, module, pattern_type) DO UPDATE SET
                pattern_data = excluded.pattern_data,
                frequency = excluded.frequency,
                confidence = excluded.confidence,
                last_occurrence = excluded.last_occurrence,
                updated_at = excluded.updated_at",
            params![
                pattern.id,
                pattern.user_id,
                pattern.module,
                pattern.pattern_type,
                pattern.pattern_data,
                pattern.frequency,
                pattern.confidence,
                pattern.last_occurrence,
                pattern.updated_at,
            ],
        )?;
        Ok(())
    }

    /// All patterns recorded for a user, strongest first.
    pub fn get_patterns_for_user(&self, user_id: &str) -> Result<Vec<DbBehaviorPattern>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, module, pattern_type, pattern_data,
                    frequency, confidence, last_occurrence, updated_at
             FROM behavior_patterns
             WHERE user_id = ?1
             ORDER BY frequency DESC, module",
        )?;
        let rows = stmt.query_map(params![user_id], Self::map_pattern_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Frequent-action patterns whose frequency is strictly above the floor.
    pub fn get_frequent_patterns(
        &self,
        user_id: &str,
        min_frequency: i32,
    ) -> Result<Vec<DbBehaviorPattern>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, module, pattern_type, pattern_data,
                    frequency, confidence, last_occurrence, updated_at
             FROM behavior_patterns
             WHERE user_id = ?1
               AND pattern_type = 'frequent_action'
               AND frequency > ?2
             ORDER BY frequency DESC, module",
        )?;
        let rows = stmt.query_map(params![user_id, min_frequency], Self::map_pattern_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Suggestions
    // =========================================================================

    pub(crate) fn map_suggestion_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbSuggestion> {
        Ok(DbSuggestion {
            id: row.get(0)?,
            user_id: row.get(1)?,
            module: row.get(2)?,
            suggestion_type: row.get(3)?,
            priority: row.get(4)?,
            title: row.get(5)?,
            description: row.get(6)?,
            suggested_action: row.get(7)?,
            trigger_pattern_id: row.get(8)?,
            status: row.get(9)?,
            created_at: row.get(10)?,
            expires_at: row.get(11)?,
            dismissed_at: row.get(12)?,
            acted_at: row.get(13)?,
        })
    }

    const SUGGESTION_COLUMNS: &'static str = "id, user_id, module, suggestion_type, priority, \
         title, description, suggested_action, trigger_pattern_id, status, \
         created_at, expires_at, dismissed_at, acted_at";

    /// Insert a new suggestion. Fails on duplicate id.
    pub fn insert_suggestion(&self, suggestion: &DbSuggestion) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO suggestions (
                id, user_id, module, suggestion_type, priority,
                title, description, suggested_action, trigger_pattern_id, status,
                created_at, expires_at, dismissed_at, acted_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                suggestion.id,
                suggestion.user_id,
                suggestion.module,
                suggestion.suggestion_type,
                suggestion.priority,
                suggestion.title,
                suggestion.description,
                suggestion.suggested_action,
                suggestion.trigger_pattern_id,
                suggestion.status,
                suggestion.created_at,
                suggestion.expires_at,
                suggestion.dismissed_at,
                suggestion.acted_at,
            ],
        )?;
        Ok(())
    }

    /// Whether the user already has a live suggestion of this type for the
    /// module. Live means active and not yet past its expiry.
    pub fn has_live_suggestion(
        &self,
        user_id: &str,
        module: &str,
        suggestion_type: &str,
    ) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.query_row(
            "SELECT 1 FROM suggestions
             WHERE user_id = ?1 AND module = ?2 AND suggestion_type = ?3
               AND status = 'active'
               AND (expires_at IS NULL OR expires_at > ?4)
             LIMIT 1",
            params![user_id, module, suggestion_type, now],
            |_row| Ok(()),
        );
        match result {
            Ok(()) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(DbError::Sqlite(e)),
        }
    }

    /// Active, unexpired suggestions for a user, newest first.
    pub fn get_active_suggestions(&self, user_id: &str) -> Result<Vec<DbSuggestion>, DbError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM suggestions
             WHERE user_id = ?1
               AND status = 'active'
               AND (expires_at IS NULL OR expires_at > ?2)
             ORDER BY created_at DESC",
            Self::SUGGESTION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id, now], Self::map_suggestion_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Look up one suggestion, scoped to its owner.
    pub fn get_suggestion_for_user(
        &self,
        user_id: &str,
        suggestion_id: &str,
    ) -> Result<Option<DbSuggestion>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM suggestions WHERE id = ?1 AND user_id = ?2",
            Self::SUGGESTION_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![suggestion_id, user_id], Self::map_suggestion_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Move an active suggestion to dismissed. Returns false when the row was
    /// already off the active status, so callers can stay idempotent.
    pub fn mark_suggestion_dismissed(
        &self,
        user_id: &str,
        suggestion_id: &str,
        now: &str,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE suggestions SET status = 'dismissed', dismissed_at = ?3
             WHERE id = ?1 AND user_id = ?2 AND status = 'active'",
            params![suggestion_id, user_id, now],
        )?;
        Ok(changed > 0)
    }

    /// Move an active suggestion to acted_upon. Returns false when the row was
    /// already off the active status.
    pub fn mark_suggestion_acted(
        &self,
        user_id: &str,
        suggestion_id: &str,
        now: &str,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE suggestions SET status = 'acted_upon', acted_at = ?3
             WHERE id = ?1 AND user_id = ?2 AND status = 'active'",
            params![suggestion_id, user_id, now],
        )?;
        Ok(changed > 0)
    }
}
