use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{artist, attraction};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::artist::ArtistResponse;
use crate::models::shared::{trimmed, validate_optional_text, validate_text};
use crate::state::AppState;
use crate::utils::lookup;
use crate::utils::upload::{
    UploadedFile, binary_response, multipart_error, read_file_field, read_text_field,
};

/// Fields of an artist form. Every field is optional at this level.
#[derive(Default)]
struct ArtistForm {
    name: Option<String>,
    genre: Option<String>,
    banner: Option<UploadedFile>,
}

async fn read_artist_form(mut multipart: Multipart, limit: u64) -> Result<ArtistForm, AppError> {
    let mut form = ArtistForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name() {
            Some("name") => form.name = Some(read_text_field(field, "name").await?),
            Some("genre") => form.genre = Some(read_text_field(field, "genre").await?),
            Some("banner") => form.banner = read_file_field(field, limit).await?,
            _ => {} // Ignore unknown fields.
        }
    }

    if let Some(name) = &form.name {
        validate_text(name, "Name", 255)?;
    }
    validate_optional_text(form.genre.as_deref(), "Genre", 100)?;
    if let Some(banner) = &form.banner
        && !banner.content_type.starts_with("image/")
    {
        return Err(AppError::Validation("Banner must be an image".into()));
    }
    Ok(form)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Artists",
    operation_id = "listArtists",
    summary = "List artists",
    responses(
        (status = 200, description = "Artists ordered by name", body = Vec<ArtistResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_artists(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArtistResponse>>, AppError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(artists.into_iter().map(ArtistResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Artists",
    operation_id = "createArtist",
    summary = "Create an artist",
    description = "Multipart form with a required `name`, an optional `genre` and an optional \
        `banner` image.",
    request_body(content_type = "multipart/form-data", description = "`name`, `genre`, `banner`"),
    responses(
        (status = 201, description = "Artist created", body = ArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 413, description = "Banner too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let form = read_artist_form(multipart, state.config.storage.max_upload_size).await?;
    let name = trimmed(form.name)
        .ok_or_else(|| AppError::Validation("Name must not be empty".into()))?;

    let (banner, banner_content_type) = match form.banner {
        Some(f) => (Some(f.data), Some(f.content_type)),
        None => (None, None),
    };
    let now = Utc::now();
    let model = artist::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
        genre: Set(trimmed(form.genre)),
        banner: Set(banner),
        banner_content_type: Set(banner_content_type),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ArtistResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Artists",
    operation_id = "updateArtist",
    summary = "Update an artist",
    description = "Multipart form. Only the fields sent are changed; a blank `genre` clears it and \
        a new `banner` replaces the old one.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    request_body(content_type = "multipart/form-data", description = "`name`, `genre`, `banner`"),
    responses(
        (status = 200, description = "Artist updated", body = ArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Banner too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id = %id))]
pub async fn update_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ArtistResponse>, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_artist(&state.db, id).await?;
    let form = read_artist_form(multipart, state.config.storage.max_upload_size).await?;

    let mut active: artist::ActiveModel = existing.into();
    if let Some(name) = form.name {
        active.name = Set(name.trim().to_string());
    }
    if form.genre.is_some() {
        active.genre = Set(trimmed(form.genre));
    }
    if let Some(banner) = form.banner {
        active.banner = Set(Some(banner.data));
        active.banner_content_type = Set(Some(banner.content_type));
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Artists",
    operation_id = "deleteArtist",
    summary = "Delete an artist",
    description = "Artists still scheduled in attractions cannot be deleted.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    responses(
        (status = 204, description = "Artist deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Artist has attractions (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let existing = lookup::find_artist(&txn, id).await?;
    let scheduled = attraction::Entity::find()
        .filter(attraction::Column::ArtistId.eq(id))
        .count(&txn)
        .await?;
    if scheduled > 0 {
        return Err(AppError::Conflict(format!(
            "Artist is scheduled in {scheduled} attraction(s)"
        )));
    }
    existing.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/banner",
    tag = "Artists",
    operation_id = "getArtistBanner",
    summary = "Get an artist's banner image",
    params(("id" = Uuid, Path, description = "Artist ID")),
    responses(
        (status = 200, description = "Banner image", content_type = "image/*"),
        (status = 404, description = "Artist or banner not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let found = lookup::find_artist(&state.db, id).await?;
    let data = found
        .banner
        .ok_or_else(|| AppError::NotFound("Artist has no banner".into()))?;
    let content_type = found
        .banner_content_type
        .unwrap_or_else(|| "application/octet-stream".into());
    binary_response(data, &content_type, None)
}
