//! Request payloads.
//!
//! Every update payload is an explicit struct of optional fields;
//! unknown keys are ignored by deserialization and never reach SQL.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

/// Login credentials.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub nombre: String,
    pub contrasena: String,
}

/// Create a user account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub nombre: String,
    pub contrasena: String,
    pub id_rol: i16,
}

/// Partial user update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub contrasena: Option<String>,
    #[serde(default)]
    pub id_rol: Option<i16>,
    #[serde(default)]
    pub estado: Option<bool>,
}

/// Create or rename a network.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NetworkRequest {
    pub nombre_red: String,
}

/// Create a home group.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    /// Display name; defaults to "CdP {leader}" when omitted.
    #[serde(default)]
    pub nombre_lider_cdp: Option<String>,
    pub id_lider: i64,
    pub id_lsr: i64,
    pub id_red: i64,
    pub direccion: String,
    #[serde(default)]
    pub referencia: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    #[serde(default)]
    pub dia_reunion: Option<String>,
    #[serde(default)]
    pub hora_reunion: Option<NaiveTime>,
}

/// Partial group update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub nombre_lider_cdp: Option<String>,
    #[serde(default)]
    pub id_lider: Option<i64>,
    #[serde(default)]
    pub id_lsr: Option<i64>,
    #[serde(default)]
    pub id_red: Option<i64>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub latitud: Option<f64>,
    #[serde(default)]
    pub longitud: Option<f64>,
    #[serde(default)]
    pub dia_reunion: Option<String>,
    #[serde(default)]
    pub hora_reunion: Option<NaiveTime>,
}

/// Assign a leader to a group.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignLeaderRequest {
    pub id_lider: i64,
}

/// Register a member.
///
/// A group leader may omit `id_cdp`: the member lands in the group they
/// lead. Higher roles must name the destination group (or none, for an
/// unassigned member created by administration).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    pub nombre: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub sexo: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    #[serde(default)]
    pub fecha_conversion: Option<NaiveDate>,
    #[serde(default)]
    pub fecha_bautizo: Option<NaiveDate>,
    #[serde(default)]
    pub fecha_boda: Option<NaiveDate>,
    #[serde(default)]
    pub id_cdp: Option<i64>,
}

/// Partial member update. Group reassignment has its own endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub sexo: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default)]
    pub fecha_conversion: Option<NaiveDate>,
    #[serde(default)]
    pub fecha_bautizo: Option<NaiveDate>,
    #[serde(default)]
    pub fecha_boda: Option<NaiveDate>,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Move a member to another group.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReassignMemberRequest {
    pub id_cdp: i64,
}

/// Record a member's vision-phase approval.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MemberPhaseRequest {
    pub id_miembro: i64,
    pub id_fase: i64,
    #[serde(default)]
    pub fecha_aprobacion: Option<NaiveDate>,
}

/// One attendance entry in a full report.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceEntryRequest {
    pub id_miembro: i64,
    pub asistio: bool,
}

/// One guest visit in a full report.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VisitRequest {
    pub nombre: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub nombre_invitador: Option<String>,
    #[serde(default)]
    pub asiste_otra_iglesia: bool,
    #[serde(default)]
    pub nombre_otra_iglesia: Option<String>,
    pub tipo: String,
    pub decision: String,
    /// Seed a follow-up for this visit in the same transaction.
    #[serde(default)]
    pub iniciar_seguimiento: bool,
}

/// The composite weekly report: parent row plus all children, created
/// atomically.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFullReportRequest {
    /// The reporting leader. A group leader may omit it (themselves);
    /// higher roles name the leader they are filing for.
    #[serde(default)]
    pub id_lider: Option<i64>,
    pub fecha_reporte: NaiveDate,
    pub latitud: f64,
    pub longitud: f64,
    #[serde(default)]
    pub ofrendas: Option<Decimal>,
    #[serde(default)]
    pub diezmos: Option<Decimal>,
    #[serde(default)]
    pub pactos: Option<Decimal>,
    #[serde(default)]
    pub primicias: Option<Decimal>,
    #[serde(default)]
    pub comentarios: Option<String>,
    #[serde(default)]
    pub asistencia: Vec<AttendanceEntryRequest>,
    #[serde(default)]
    pub visitas: Vec<VisitRequest>,
}

/// Start a follow-up for a visit.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartFollowUpRequest {
    pub id_visita: i64,
}

/// Append a note to a follow-up.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddNoteRequest {
    pub contenido: String,
}

/// Record a central service report.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceReportRequest {
    pub fecha_reporte: NaiveDate,
    pub total: i32,
    #[serde(default)]
    pub convertidos: Option<i32>,
    #[serde(default)]
    pub reconciliados: Option<i32>,
    pub datos_areas_json: serde_json::Value,
}

/// Date-range query for financial and attendance summaries.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct DateRangeQuery {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    /// Grouping bucket for attendance summaries: week, month or year.
    #[serde(default)]
    pub periodo: Option<String>,
}
