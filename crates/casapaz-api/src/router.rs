//! Router assembly.

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{middleware as axum_middleware, Extension, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    analytics, auth, follow_ups, groups, members, networks, reports, users,
};
use crate::middleware::{auth_middleware, TokenSettings};
use crate::Engine;

/// Build the full API router.
///
/// Everything except the login endpoint sits behind the bearer-token
/// middleware; authorization proper happens per-handler through the
/// engine.
pub fn router(pool: PgPool, engine: Arc<Engine>, settings: Arc<TokenSettings>) -> Router {
    let public = Router::new().route("/api/auth/login", post(auth::login_handler));

    let protected = Router::new()
        // User administration (reserved set)
        .route(
            "/api/admin/usuarios",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/api/admin/usuarios/{id}",
            put(users::update_user_handler).delete(users::deactivate_user_handler),
        )
        // Network management (reserved set)
        .route(
            "/api/admin/redes",
            get(networks::list_networks_handler).post(networks::create_network_handler),
        )
        .route(
            "/api/admin/redes/{id}",
            put(networks::update_network_handler).delete(networks::delete_network_handler),
        )
        // Home group management
        .route("/api/admin/cdp", post(groups::create_group_handler))
        .route(
            "/api/admin/cdp/{id}",
            put(groups::update_group_handler).delete(groups::delete_group_handler),
        )
        .route(
            "/api/admin/cdp/{id}/asignar-lider",
            put(groups::assign_leader_handler),
        )
        .route("/api/cdp", get(groups::list_groups_handler))
        .route("/api/cdp/{id}", get(groups::get_group_handler))
        .route(
            "/api/cdp/{id}/miembros",
            get(members::list_group_members_handler),
        )
        .route("/api/lider/mi-cdp", get(groups::my_group_handler))
        // Members
        .route(
            "/api/miembros",
            get(members::list_members_handler).post(members::create_member_handler),
        )
        .route(
            "/api/miembros/{id}",
            get(members::get_member_handler)
                .put(members::update_member_handler)
                .delete(members::deactivate_member_handler),
        )
        .route(
            "/api/miembros/{id}/reasignar",
            put(members::reassign_member_handler),
        )
        .route(
            "/api/admin/miembros/{id}",
            delete(members::hard_delete_member_handler),
        )
        .route(
            "/api/admin/miembros/fase",
            post(members::update_member_phase_handler),
        )
        .route("/api/catalogos/fases", get(members::list_phases_handler))
        // Weekly reports
        .route(
            "/api/reportes/cdp",
            get(reports::list_reports_handler).post(reports::create_full_report_handler),
        )
        .route("/api/reportes/cdp/{id}", get(reports::report_detail_handler))
        .route(
            "/api/reportes/servicio",
            post(reports::create_service_report_handler),
        )
        // Follow-ups
        .route(
            "/api/seguimientos",
            post(follow_ups::start_follow_up_handler),
        )
        .route(
            "/api/seguimientos/pendientes",
            get(follow_ups::pending_follow_ups_handler),
        )
        .route(
            "/api/seguimientos/{id}",
            get(follow_ups::follow_up_detail_handler),
        )
        .route(
            "/api/seguimientos/{id}/notas",
            post(follow_ups::add_note_handler),
        )
        .route(
            "/api/seguimientos/{id}/estado",
            put(follow_ups::set_estado_handler),
        )
        // Analytics
        .route(
            "/api/reportes/metricas-lsr",
            get(analytics::lsr_metrics_handler),
        )
        .route(
            "/api/reportes/red/{id}/status",
            get(analytics::network_status_handler),
        )
        .route(
            "/api/reportes/ofrendas/resumen",
            get(analytics::offerings_summary_handler),
        )
        .route(
            "/api/reportes/asistencia/global",
            get(analytics::attendance_summary_handler),
        )
        .route(
            "/api/reportes/vision/resumen",
            get(analytics::vision_summary_handler),
        )
        .route(
            "/api/lsr/vision/resumen",
            get(analytics::subnet_vision_summary_handler),
        )
        .layer(axum_middleware::from_fn(auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(Extension(pool))
        .layer(Extension(engine))
        .layer(Extension(settings))
        .layer(TraceLayer::new_for_http())
}
