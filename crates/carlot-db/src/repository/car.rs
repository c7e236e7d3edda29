//! # Car Repository
//!
//! Database operations for car listings.
//!
//! ## Key Operations
//! - Insert with store-assigned identifier
//! - Windowed listing in stable insertion order
//! - Partial updates that set exactly the delta's fields
//!
//! ## Partial Update Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Delta Application                                    │
//! │                                                                         │
//! │  CarDelta { km: Some(90000), price: Some(8000), .. }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE cars SET km = ?, price = ? WHERE id = ?                        │
//! │       │                                                                 │
//! │       ├── 0 rows matched → NotFound                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Re-fetch the row → fully-normalized Car back to the caller            │
//! │                                                                         │
//! │  Applying the same delta twice is a no-op in effect: field-level       │
//! │  overwrites are idempotent.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, parse_id};
use carlot_core::{Car, CarDelta, NewCar};

/// Column list shared by every car SELECT.
const CAR_COLUMNS: &str = "id, brand, make, year, cm3, km, price, user_id, picture_url, created_at";

/// Repository for car listing database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CarRepository::new(pool);
///
/// let car = repo.insert(&new_car).await?;
/// let page = repo.list_page(0, 10).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Inserts a validated car and returns the persisted document.
    ///
    /// The store assigns the identifier; the returned Car is re-fetched so
    /// the caller sees exactly what was persisted.
    pub async fn insert(&self, new_car: &NewCar) -> DbResult<Car> {
        let id = generate_id();
        let created_at = Utc::now();

        debug!(id = %id, brand = %new_car.brand, "Inserting car");

        sqlx::query(
            r#"
            INSERT INTO cars (
                id, brand, make, year, cm3, km, price, user_id, picture_url, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(&new_car.brand)
        .bind(&new_car.make)
        .bind(new_car.year)
        .bind(new_car.cm3)
        .bind(new_car.km)
        .bind(new_car.price)
        .bind(&new_car.user_id)
        .bind(&new_car.picture_url)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Car", &id))
    }

    /// Fetches a car by its identifier.
    ///
    /// ## Returns
    /// * `Ok(Some(Car))` - Car found
    /// * `Ok(None)` - No car at that identifier
    /// * `Err(DbError::InvalidId)` - Identifier is not a well-formed key
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let key = parse_id(id)?;

        let car = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE id = ?1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    /// Lists a window of cars in stable insertion order.
    ///
    /// ## Arguments
    /// * `skip` - Offset of the first item
    /// * `limit` - Maximum items to return
    pub async fn list_page(&self, skip: u64, limit: u64) -> DbResult<Vec<Car>> {
        debug!(skip, limit, "Listing cars");

        // SQLite takes signed bind values; a negative LIMIT means unbounded,
        // so values past i64::MAX clamp instead of wrapping negative
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);

        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars ORDER BY rowid LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    /// Counts all cars.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Sets exactly the delta's fields on the car matching `id`.
    ///
    /// ## Returns
    /// The re-fetched, fully-normalized car after the update.
    ///
    /// ## Errors
    /// * `DbError::InvalidId` - Identifier is not a well-formed key
    /// * `DbError::NotFound` - No car matched the identifier
    pub async fn apply_update(&self, id: &str, delta: &CarDelta) -> DbResult<Car> {
        // Deltas are non-empty by construction (core rejects empty patches)
        debug_assert!(!delta.is_empty());

        let key = parse_id(id)?;

        debug!(id = %key, fields = delta.field_count(), "Updating car");

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE cars SET ");
        let mut assignments = builder.separated(", ");

        if let Some(brand) = &delta.brand {
            assignments.push("brand = ").push_bind_unseparated(brand);
        }
        if let Some(make) = &delta.make {
            assignments.push("make = ").push_bind_unseparated(make);
        }
        if let Some(year) = delta.year {
            assignments.push("year = ").push_bind_unseparated(year);
        }
        if let Some(cm3) = delta.cm3 {
            assignments.push("cm3 = ").push_bind_unseparated(cm3);
        }
        if let Some(km) = delta.km {
            assignments.push("km = ").push_bind_unseparated(km);
        }
        if let Some(price) = delta.price {
            assignments.push("price = ").push_bind_unseparated(price);
        }

        builder.push(" WHERE id = ").push_bind(&key);

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Car", &key));
        }

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| DbError::not_found("Car", &key))
    }

    /// Deletes a car by its identifier.
    ///
    /// ## Errors
    /// * `DbError::InvalidId` - Identifier is not a well-formed key
    /// * `DbError::NotFound` - No car matched (including an already-deleted one)
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let key = parse_id(id)?;

        debug!(id = %key, "Deleting car");

        let result = sqlx::query("DELETE FROM cars WHERE id = ?1")
            .bind(&key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Car", &key));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
