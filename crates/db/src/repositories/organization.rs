//! Organization repository for database operations.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{organizations, sea_orm_active_enums::OrgStatus};

/// Organization repository (read-only collaborator lookups plus the active
/// listing the close job iterates).
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an organization by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Code.eq(code))
            .one(&self.db)
            .await
    }

    /// Finds the platform (base) organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_platform(&self) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::IsPlatform.eq(true))
            .one(&self.db)
            .await
    }

    /// Lists ACTIVE partner organizations (excluding the platform itself).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Status.eq(OrgStatus::Active))
            .filter(organizations::Column::IsPlatform.eq(false))
            .all(&self.db)
            .await
    }
}
