//! Weekly-report operations, including the one composite transaction in
//! the system.

use casapaz_authz::{
    scope, Action, Actor, AuthzError, HierarchyStore, ResourceKind, Scope, Target,
};
use casapaz_core::{ReportId, Role, UserId};
use casapaz_db::models::{
    NewAttendanceEntry, NewReport, NewVisit, Report, ReportSummary,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{CreateFullReportRequest, CreatedReportResponse, ReportDetailResponse};
use crate::Engine;

/// Create the full weekly report atomically: parent row, attendance,
/// visits and seeded follow-ups all commit together or not at all.
///
/// A group leader files for themselves; a subnet leader may file for a
/// leader inside their subnet; global roles for anyone.
pub async fn create_full_report(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    req: CreateFullReportRequest,
) -> Result<CreatedReportResponse, ApiError> {
    let id_lider = match req.id_lider {
        Some(id) => id,
        None if actor.role == Role::GroupLeader => actor.id.as_i64(),
        None => {
            return Err(ApiError::Validation("id_lider is required".to_string()));
        }
    };

    let group = engine
        .store()
        .group_led_by(UserId::from_i64(id_lider))
        .await
        .map_err(AuthzError::from)?
        .ok_or_else(|| {
            ApiError::NotFoundMessage(format!(
                "El Líder {id_lider} no está asignado a ninguna Casa de Paz."
            ))
        })?;

    // Resolve the chain once and authorize against that snapshot; the
    // transaction below writes against the same group.
    let chain = engine
        .store()
        .group_chain(group.group_id)
        .await
        .map_err(AuthzError::from)?
        .ok_or(AuthzError::NotFound {
            resource: "Casa de Paz",
            id: group.group_id.as_i64(),
        })?;
    engine
        .authorize(actor, Action::ReportCreate, &Target::Chain(chain))
        .await?;

    for visit in &req.visitas {
        if visit.nombre.trim().is_empty()
            || visit.tipo.trim().is_empty()
            || visit.decision.trim().is_empty()
        {
            return Err(ApiError::Validation(
                "every visit requires nombre, tipo and decision".to_string(),
            ));
        }
    }

    let report = NewReport {
        id_lider,
        fecha_reporte: req.fecha_reporte,
        latitud: req.latitud,
        longitud: req.longitud,
        ofrendas: req.ofrendas.unwrap_or(Decimal::ZERO),
        diezmos: req.diezmos.unwrap_or(Decimal::ZERO),
        pactos: req.pactos.unwrap_or(Decimal::ZERO),
        primicias: req.primicias.unwrap_or(Decimal::ZERO),
        comentarios: req.comentarios,
    };
    let asistencia: Vec<NewAttendanceEntry> = req
        .asistencia
        .iter()
        .map(|a| NewAttendanceEntry {
            id_miembro: a.id_miembro,
            asistio: a.asistio,
        })
        .collect();
    let visitas: Vec<NewVisit> = req
        .visitas
        .into_iter()
        .map(|v| NewVisit {
            nombre: v.nombre,
            telefono: v.telefono,
            direccion: v.direccion,
            referencia: v.referencia,
            nombre_invitador: v.nombre_invitador,
            asiste_otra_iglesia: v.asiste_otra_iglesia,
            nombre_otra_iglesia: v.nombre_otra_iglesia,
            tipo: v.tipo,
            decision: v.decision,
            iniciar_seguimiento: v.iniciar_seguimiento,
        })
        .collect();

    let created =
        Report::create_full(pool, group.group_id.as_i64(), &report, &asistencia, &visitas)
            .await?;

    Ok(CreatedReportResponse {
        mensaje: format!(
            "Reporte de Casa de Paz '{}' creado exitosamente.",
            group.nombre
        ),
        id_reporte_cdp: created.id_reporte_cdp,
        asistentes_registrados: created.asistentes,
        visitas_ids: created.visitas,
        seguimientos_ids: created.seguimientos,
    })
}

/// Report history, scoped to the actor.
pub async fn list_reports(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
) -> Result<Vec<ReportSummary>, ApiError> {
    engine
        .authorize(actor, Action::ReportList, &Target::Global)
        .await?;

    let rows = match scope(actor, ResourceKind::Report) {
        Scope::All => Report::list_all(pool).await?,
        Scope::SubnetOf(user) => Report::list_by_subnet_leader(pool, user.as_i64()).await?,
        Scope::GroupLedBy(user) => Report::list_by_leader(pool, user.as_i64()).await?,
        Scope::SelfOnly(_) | Scope::Nothing => Vec::new(),
    };
    Ok(rows)
}

/// Full detail of one report, scope-checked through its chain.
pub async fn report_detail(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<ReportDetailResponse, ApiError> {
    engine
        .authorize(actor, Action::ReportRead, &Target::Report(ReportId::from_i64(id)))
        .await?;

    let report = Report::find_by_id(pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Reporte",
            id,
        })?;
    let asistencia = Report::attendance_detail(pool, id, report.id_lider).await?;
    let visitas = Report::visit_detail(pool, id).await?;

    Ok(ReportDetailResponse::assemble(report, asistencia, visitas))
}
