//! The `users` entity and its store operations.
//!
//! A user is an auto-assigned integer identifier plus a mutable name. The
//! identifier is unique and immutable; uniqueness is enforced by the backing
//! store's primary key, not by this code.
//!
//! Absence of a row is reported as `None`, never as an error. Database
//! failures surface as [`StoreError`].

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A row of the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Server-assigned identifier, unique and immutable
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name, mutable
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// =============================================================================
// Store Operations
// =============================================================================

/// Insert a new user with the given name and return the stored row.
pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, StoreError> {
    let user = ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Fetch a user by identifier, or `None` if no row matches.
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, StoreError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Fetch all users whose name contains the given substring.
///
/// Matching is case-insensitive (SQL `LIKE`). The empty substring matches
/// every user. Result order is store-defined.
pub async fn search(db: &DatabaseConnection, query: &str) -> Result<Vec<Model>, StoreError> {
    Ok(Entity::find()
        .filter(Column::Name.contains(query))
        .all(db)
        .await?)
}

/// Rename an existing user and return the updated row, or `None` if no row
/// matches. Only the name is mutable; the identifier is stable.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    new_name: &str,
) -> Result<Option<Model>, StoreError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut user: ActiveModel = found.into();
    user.name = Set(new_name.to_owned());
    Ok(Some(user.update(db).await?))
}

/// Remove a user and return its prior state, or `None` if no row matches.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, StoreError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    found.clone().delete(db).await?;
    Ok(Some(found))
}

// =============================================================================
// Tests
// =============================================================================
