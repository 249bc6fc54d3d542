use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::*;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the file size limit.
const MULTIPART_SLACK: u64 = 64 * 1024;

/// Body limit layer for upload routes: the configured file size plus the
/// text fields and boundaries around it.
fn upload_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let limit = config.storage.max_upload_size.saturating_add(MULTIPART_SLACK);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/public", public_routes())
        .nest("/addresses", address_routes())
        .nest("/attendance", attendance_routes(config))
        .nest("/sale-points", sale_point_routes())
        .nest("/fairs", fair_routes())
        .nest("/attractions", attraction_routes())
        .nest("/artists", artist_routes(config))
        .nest("/courses", course_routes())
        .nest("/statements", statement_routes())
        .nest("/notifications", notification_routes())
        .nest("/documents", document_routes(config))
        .nest("/dashboard", dashboard_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::refresh))
        .routes(routes!(auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users, user::create_user))
        .routes(routes!(user::list_pending_users))
        .routes(routes!(user::get_profile, user::update_profile))
        .routes(routes!(user::change_password))
        .routes(routes!(user::request_termination))
        .routes(routes!(user::get_user, user::update_user, user::delete_user))
        .routes(routes!(user::update_user_status))
}

fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(public::list_merchants))
        .routes(routes!(public::get_merchant))
}

fn address_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(address::list_addresses, address::create_address))
        .routes(routes!(
            address::get_address,
            address::update_address,
            address::delete_address
        ))
}

fn attendance_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let json = OpenApiRouter::new()
        .routes(routes!(attendance::register_absences))
        .routes(routes!(attendance::list_my_absences))
        .routes(routes!(attendance::list_user_absences))
        .routes(routes!(attendance::notify_absence))
        .routes(routes!(attendance::list_pending_justifications))
        .routes(routes!(attendance::review_justification))
        .routes(routes!(attendance::download_annex))
        .routes(routes!(attendance::get_summary));

    let upload = OpenApiRouter::new()
        .routes(routes!(attendance::submit_justification))
        .layer(upload_body_limit(config));

    json.merge(upload)
}

fn sale_point_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            sale_point::list_sale_points,
            sale_point::create_sale_point
        ))
        .routes(routes!(
            sale_point::get_sale_point,
            sale_point::update_sale_point,
            sale_point::delete_sale_point
        ))
        .routes(routes!(sale_point::allocate, sale_point::deallocate))
}

fn fair_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(fair::list_fairs, fair::create_fair))
        .routes(routes!(fair::get_next_fair))
        .routes(routes!(fair::get_fair, fair::update_fair, fair::delete_fair))
        .routes(routes!(fair::list_fair_attractions))
}

fn attraction_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            attraction::list_attractions,
            attraction::create_attraction
        ))
        .routes(routes!(attraction::list_upcoming_attractions))
        .routes(routes!(
            attraction::update_attraction,
            attraction::delete_attraction
        ))
}

fn artist_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(artist::list_artists, artist::create_artist))
        .routes(routes!(artist::update_artist, artist::delete_artist))
        .routes(routes!(artist::get_banner))
        .layer(upload_body_limit(config))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(course::list_courses, course::create_course))
        .routes(routes!(course::list_upcoming_courses))
        .routes(routes!(course::search_courses))
        .routes(routes!(course::list_my_enrollments))
        .routes(routes!(
            course::get_course,
            course::update_course,
            course::delete_course
        ))
        .routes(routes!(course::enroll, course::cancel_enrollment))
}

fn statement_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            statement::list_statements,
            statement::create_statement
        ))
        .routes(routes!(
            statement::get_statement,
            statement::update_statement,
            statement::delete_statement
        ))
}

fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(notification::list_notifications))
        .routes(routes!(notification::unread_count))
        .routes(routes!(notification::mark_read))
        .routes(routes!(notification::mark_all_read))
}

fn document_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let json = OpenApiRouter::new()
        .routes(routes!(document::list_my_documents))
        .routes(routes!(document::list_user_documents))
        .routes(routes!(document::get_document, document::delete_document))
        .routes(routes!(document::download_document))
        .routes(routes!(document::review_document));

    let upload = OpenApiRouter::new()
        .routes(routes!(document::upload_document))
        .layer(upload_body_limit(config));

    json.merge(upload)
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(dashboard::get_stats))
}
