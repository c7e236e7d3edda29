//! Car listing endpoints.
//!
//! The handlers stay thin: they collect input, call the validation engine,
//! and hand deltas/drafts to the repository. All business rules live in
//! carlot-core.
//!
//! ## Endpoints
//! ```text
//! POST   /cars       multipart create (auth required, picture uploaded first-class)
//! GET    /cars       paginated listing
//! GET    /cars/:id   single car
//! PUT    /cars/:id   partial update (auth required)
//! DELETE /cars/:id   delete
//! ```

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use carlot_core::pagination::DEFAULT_PAGE;
use carlot_core::types::{Car, CarDraft, CarPatch};
use carlot_core::validation::{build_update, validate_new_car};
use carlot_core::{PageRequest, ValidationErrors, CARS_PER_PAGE};

/// Car routes, nested under `/cars`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
}

// =============================================================================
// Listing
// =============================================================================

/// Pagination query parameters; both optional.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

/// One page of cars plus the has-more flag.
#[derive(Debug, Serialize)]
struct CarPage {
    cars: Vec<Car>,
    page: u64,
    has_more: bool,
}

/// GET /cars - list cars, paginated in stable insertion order.
async fn list_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CarPage>, ApiError> {
    let request = PageRequest::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.limit.unwrap_or(CARS_PER_PAGE),
    )?;

    let repo = state.db.cars();
    let total = repo.count().await?;
    let window = request.window(total);
    let cars = repo.list_page(window.skip, window.limit).await?;

    Ok(Json(CarPage {
        cars,
        page: window.page,
        has_more: window.has_more,
    }))
}

// =============================================================================
// Creation
// =============================================================================

/// Raw multipart parts of a create request, as received.
#[derive(Debug, Default)]
struct CreateCarForm {
    brand: Option<String>,
    make: Option<String>,
    year: Option<String>,
    cm3: Option<String>,
    km: Option<String>,
    price: Option<String>,
    picture: Option<(String, Vec<u8>)>,
}

/// Drains a multipart stream into a [`CreateCarForm`].
///
/// Unknown parts are ignored; unreadable framing is a 400, not a 422.
async fn read_create_form(multipart: &mut Multipart) -> Result<CreateCarForm, ApiError> {
    let mut form = CreateCarForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "picture" {
            let filename = field.file_name().unwrap_or("picture").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            form.picture = Some((filename, bytes.to_vec()));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "brand" => form.brand = Some(value),
            "make" => form.make = Some(value),
            "year" => form.year = Some(value),
            "cm3" => form.cm3 = Some(value),
            "km" => form.km = Some(value),
            "price" => form.price = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

/// Pulls a required text part, recording its absence.
fn required_text(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        errors.add(field, "is required");
        String::new()
    })
}

/// Pulls a required integer part, recording absence or a parse failure.
fn required_int(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> i64 {
    match value {
        None => {
            errors.add(field, "is required");
            0
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            errors.add(field, "must be an integer");
            0
        }),
    }
}

/// POST /cars - create a listing with picture.
///
/// The field set is validated and normalized first; only then do the picture
/// bytes go to the media host, whose failure is fatal to the operation.
async fn create_car(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let form = read_create_form(&mut multipart).await?;

    let mut errors = ValidationErrors::new();
    let brand = required_text(&mut errors, "brand", form.brand);
    let make = required_text(&mut errors, "make", form.make);
    let year = required_int(&mut errors, "year", form.year);
    let cm3 = required_int(&mut errors, "cm3", form.cm3);
    let km = required_int(&mut errors, "km", form.km);
    let price = required_int(&mut errors, "price", form.price);
    let Some((filename, bytes)) = form.picture else {
        // A missing picture is reported alongside the other field failures
        errors.add("picture", "is required");
        return Err(errors.into());
    };
    errors.into_result()?;

    let mut new_car = validate_new_car(CarDraft {
        brand,
        make,
        year,
        cm3,
        km,
        price,
        user_id: user.user_id,
        picture_url: None,
    })?;

    let url = state.media.upload(bytes, &filename).await?;
    new_car.picture_url = Some(url);

    let car = state.db.cars().insert(&new_car).await?;

    info!(id = %car.id, brand = %car.brand, "Car created");
    Ok((StatusCode::CREATED, Json(car)))
}

// =============================================================================
// Single-Car Operations
// =============================================================================

/// GET /cars/:id - fetch one car.
async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let car = state
        .db
        .cars()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Car {id} not found")))?;

    Ok(Json(car))
}

/// PUT /cars/:id - apply a partial update.
async fn update_car(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<CarPatch>,
) -> Result<Json<Car>, ApiError> {
    let delta = build_update(patch)?;
    let car = state.db.cars().apply_update(&id, &delta).await?;

    info!(id = %car.id, "Car updated");
    Ok(Json(car))
}

/// DELETE /cars/:id - delete a car.
async fn delete_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.cars().delete(&id).await?;

    info!(id = %id, "Car deleted");
    Ok(StatusCode::NO_CONTENT)
}
