use super::*;

impl FleetDb {
    // =========================================================================
    // Equipment
    // =========================================================================

    pub(crate) fn map_equipment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbEquipment> {
        Ok(DbEquipment {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            status: row
                .get::<_, Option<String>>(3)?
                .unwrap_or_else(|| "in_service".to_string()),
            job_id: row.get(4)?,
            next_maintenance_date: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Insert or update an equipment record.
    pub fn upsert_equipment(&self, equipment: &DbEquipment) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO equipment (
                id, name, category, status, job_id, next_maintenance_date, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                status = excluded.status,
                job_id = excluded.job_id,
                next_maintenance_date = excluded.next_maintenance_date,
                updated_at = excluded.updated_at",
            params![
                equipment.id,
                equipment.name,
                equipment.category,
                equipment.status,
                equipment.job_id,
                equipment.next_maintenance_date,
                equipment.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get equipment attached to a job.
    pub fn get_equipment_for_job(&self, job_id: &str) -> Result<Vec<DbEquipment>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, status, job_id, next_maintenance_date, updated_at
             FROM equipment WHERE job_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![job_id], Self::map_equipment_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub(crate) fn map_inventory_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbInventoryItem> {
        Ok(DbInventoryItem {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            min_stock: row.get(3)?,
            unit: row.get(4)?,
            job_id: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Insert or update an inventory item.
    pub fn upsert_inventory_item(&self, item: &DbInventoryItem) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO inventory_items (
                id, name, quantity, min_stock, unit, job_id, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                quantity = excluded.quantity,
                min_stock = excluded.min_stock,
                unit = excluded.unit,
                job_id = excluded.job_id,
                updated_at = excluded.updated_at",
            params![
                item.id,
                item.name,
                item.quantity,
                item.min_stock,
                item.unit,
                item.job_id,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get inventory items reserved for a job.
    pub fn get_inventory_for_job(&self, job_id: &str) -> Result<Vec<DbInventoryItem>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, min_stock, unit, job_id, updated_at
             FROM inventory_items WHERE job_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![job_id], Self::map_inventory_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Crew assignments
    // =========================================================================

    pub(crate) fn map_crew_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCrewAssignment> {
        Ok(DbCrewAssignment {
            id: row.get(0)?,
            job_id: row.get(1)?,
            member_name: row.get(2)?,
            role: row.get(3)?,
            assigned_at: row.get(4)?,
        })
    }

    /// Insert or update a crew assignment.
    pub fn upsert_crew_assignment(&self, assignment: &DbCrewAssignment) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO crew_assignments (id, job_id, member_name, role, assigned_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                job_id = excluded.job_id,
                member_name = excluded.member_name,
                role = excluded.role,
                assigned_at = excluded.assigned_at",
            params![
                assignment.id,
                assignment.job_id,
                assignment.member_name,
                assignment.role,
                assignment.assigned_at,
            ],
        )?;
        Ok(())
    }

    /// Get crew assigned to a job.
    pub fn get_crew_for_job(&self, job_id: &str) -> Result<Vec<DbCrewAssignment>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, job_id, member_name, role, assigned_at
             FROM crew_assignments WHERE job_id = ?1 ORDER BY member_name",
        )?;
        let rows = stmt.query_map(params![job_id], Self::map_crew_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Compliance requirements
    // =========================================================================

    pub(crate) fn map_compliance_row(
        row: &rusqlite::Row<'_>,
    ) -> rusqlite::Result<DbComplianceRequirement> {
        Ok(DbComplianceRequirement {
            id: row.get(0)?,
            title: row.get(1)?,
            severity: row
                .get::<_, Option<String>>(2)?
                .unwrap_or_else(|| "medium".to_string()),
            status: row
                .get::<_, Option<String>>(3)?
                .unwrap_or_else(|| "open".to_string()),
            due_date: row.get(4)?,
            job_id: row.get(5)?,
            equipment_id: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    /// Insert or update a compliance requirement.
    pub fn upsert_compliance_requirement(
        &self,
        requirement: &DbComplianceRequirement,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO compliance_requirements (
                id, title, severity, status, due_date, job_id, equipment_id, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                severity = excluded.severity,
                status = excluded.status,
                due_date = excluded.due_date,
                job_id = excluded.job_id,
                equipment_id = excluded.equipment_id,
                updated_at = excluded.updated_at",
            params![
                requirement.id,
                requirement.title,
                requirement.severity,
                requirement.status,
                requirement.due_date,
                requirement.job_id,
                requirement.equipment_id,
                requirement.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get compliance requirements attached to a job.
    pub fn get_compliance_for_job(
        &self,
        job_id: &str,
    ) -> Result<Vec<DbComplianceRequirement>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, severity, status, due_date, job_id, equipment_id, updated_at
             FROM compliance_requirements WHERE job_id = ?1 ORDER BY due_date, title",
        )?;
        let rows = stmt.query_map(params![job_id], Self::map_compliance_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
