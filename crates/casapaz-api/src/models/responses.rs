//! Response payloads.

use casapaz_db::models::{
    AttendanceRow, FollowUpDetail, Member, NoteWithAuthor, Report, VisitRow,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Outcome message plus the affected id, the original API's envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub mensaje: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    /// A message with an affected id.
    #[must_use]
    pub fn with_id(mensaje: String, id: i64) -> Self {
        Self {
            mensaje,
            id: Some(id),
        }
    }

    /// A bare message.
    #[must_use]
    pub fn new(mensaje: String) -> Self {
        Self { mensaje, id: None }
    }
}

/// A successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub mensaje: String,
    pub token: String,
    pub usuario: UserInfo,
}

/// The authenticated user, as returned at login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfo {
    pub id_usuario: i64,
    pub nombre: String,
    pub id_rol: i16,
    pub nombre_rol: String,
}

/// A member with the age derived from their birth date.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id_miembro: i64,
    pub id_cdp: Option<i64>,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub sexo: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub fecha_conversion: Option<NaiveDate>,
    pub fecha_bautizo: Option<NaiveDate>,
    pub fecha_boda: Option<NaiveDate>,
    pub estado: String,
    pub edad: i32,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        let edad = member.edad();
        Self {
            id_miembro: member.id_miembro,
            id_cdp: member.id_cdp,
            nombre: member.nombre,
            telefono: member.telefono,
            direccion: member.direccion,
            referencia: member.referencia,
            sexo: member.sexo,
            fecha_nacimiento: member.fecha_nacimiento,
            fecha_conversion: member.fecha_conversion,
            fecha_bautizo: member.fecha_bautizo,
            fecha_boda: member.fecha_boda,
            estado: member.estado,
            edad,
        }
    }
}

/// What a committed full report produced.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedReportResponse {
    pub mensaje: String,
    pub id_reporte_cdp: i64,
    pub asistentes_registrados: usize,
    pub visitas_ids: Vec<i64>,
    pub seguimientos_ids: Vec<i64>,
}

/// A full report with its attendance and visit details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportDetailResponse {
    pub id_reporte_cdp: i64,
    pub id_lider: i64,
    pub fecha_reporte: NaiveDate,
    pub ofrendas: rust_decimal::Decimal,
    pub diezmos: rust_decimal::Decimal,
    pub pactos: rust_decimal::Decimal,
    pub primicias: rust_decimal::Decimal,
    pub comentarios: Option<String>,
    pub estado_revision: String,
    pub detalle_asistencia: Vec<AttendanceEntry>,
    pub visitas_registradas: Vec<VisitEntry>,
}

/// One member's attendance in a report detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceEntry {
    pub id_miembro: i64,
    pub nombre: String,
    pub asistio: Option<bool>,
    pub registrado_asistencia: bool,
}

impl From<AttendanceRow> for AttendanceEntry {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id_miembro: row.id_miembro,
            nombre: row.nombre,
            asistio: row.asistio,
            registrado_asistencia: row.registrado,
        }
    }
}

/// One visit in a report detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitEntry {
    pub id_visita: i64,
    pub nombre: String,
    pub telefono: Option<String>,
    pub decision: String,
    pub tipo: String,
    pub id_seguimiento: Option<i64>,
    pub estado_seguimiento: Option<String>,
    pub total_notas: i64,
}

impl From<VisitRow> for VisitEntry {
    fn from(row: VisitRow) -> Self {
        Self {
            id_visita: row.id_visita,
            nombre: row.nombre,
            telefono: row.telefono,
            decision: row.decision,
            tipo: row.tipo,
            id_seguimiento: row.id_seguimiento,
            estado_seguimiento: row.estado_seguimiento,
            total_notas: row.total_notas,
        }
    }
}

impl ReportDetailResponse {
    /// Assemble the detail from its parts.
    #[must_use]
    pub fn assemble(
        report: Report,
        asistencia: Vec<AttendanceRow>,
        visitas: Vec<VisitRow>,
    ) -> Self {
        Self {
            id_reporte_cdp: report.id_reporte_cdp,
            id_lider: report.id_lider,
            fecha_reporte: report.fecha_reporte,
            ofrendas: report.ofrendas,
            diezmos: report.diezmos,
            pactos: report.pactos,
            primicias: report.primicias,
            comentarios: report.comentarios,
            estado_revision: report.estado_revision,
            detalle_asistencia: asistencia.into_iter().map(Into::into).collect(),
            visitas_registradas: visitas.into_iter().map(Into::into).collect(),
        }
    }
}

/// A follow-up with its note history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FollowUpDetailResponse {
    pub id_seguimiento: i64,
    pub estado: String,
    pub nombre_visita: String,
    pub telefono: Option<String>,
    pub decision: String,
    pub id_reporte_cdp: i64,
    pub historial_notas: Vec<NoteEntry>,
}

/// One note with its author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoteEntry {
    pub id_nota: i64,
    pub contenido: String,
    pub fecha_nota: chrono::DateTime<chrono::Utc>,
    pub nombre_usuario_creador: String,
}

impl FollowUpDetailResponse {
    /// Assemble the detail from its parts.
    #[must_use]
    pub fn assemble(detail: FollowUpDetail, notas: Vec<NoteWithAuthor>) -> Self {
        Self {
            id_seguimiento: detail.id_seguimiento,
            estado: detail.estado,
            nombre_visita: detail.nombre_visita,
            telefono: detail.telefono,
            decision: detail.decision,
            id_reporte_cdp: detail.id_reporte_cdp,
            historial_notas: notas
                .into_iter()
                .map(|n| NoteEntry {
                    id_nota: n.id_nota,
                    contenido: n.contenido,
                    fecha_nota: n.fecha_nota,
                    nombre_usuario_creador: n.nombre_usuario,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_skips_absent_id() {
        let json = serde_json::to_string(&MessageResponse::new("ok".to_string())).unwrap();
        assert!(!json.contains("\"id\""));

        let json =
            serde_json::to_string(&MessageResponse::with_id("ok".to_string(), 7)).unwrap();
        assert!(json.contains("\"id\":7"));
    }
}
