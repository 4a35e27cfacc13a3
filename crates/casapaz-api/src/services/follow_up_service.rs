//! Follow-up operations.

use casapaz_authz::{scope, Action, Actor, AuthzError, ResourceKind, Scope, Target};
use casapaz_core::{FollowUpId, VisitId};
use casapaz_db::models::{FollowUp, PendingFollowUp};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{AddNoteRequest, FollowUpDetailResponse, MessageResponse};
use crate::Engine;

/// Start a follow-up for a visit.
///
/// At most one follow-up exists per visit; a duplicate start is a
/// conflict resolved by the store's unique constraint.
pub async fn start_follow_up(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id_visita: i64,
) -> Result<MessageResponse, ApiError> {
    engine
        .authorize(
            actor,
            Action::FollowUpStart,
            &Target::Visit(VisitId::from_i64(id_visita)),
        )
        .await?;

    let follow_up = FollowUp::start(pool, id_visita).await.map_err(|err| {
        if err.is_unique_violation() {
            ApiError::Authz(AuthzError::Conflict(
                "El seguimiento para esta visita ya ha sido iniciado.".to_string(),
            ))
        } else {
            err.into()
        }
    })?;

    tracing::info!(
        actor_id = %actor.id,
        id_visita,
        id_seguimiento = follow_up.id_seguimiento,
        "Follow-up started"
    );
    Ok(MessageResponse::with_id(
        format!("Seguimiento iniciado exitosamente para la Visita {id_visita}."),
        follow_up.id_seguimiento,
    ))
}

/// Append a note to a follow-up.
pub async fn add_note(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id_seguimiento: i64,
    req: AddNoteRequest,
) -> Result<MessageResponse, ApiError> {
    if req.contenido.trim().is_empty() {
        return Err(ApiError::Validation("contenido is required".to_string()));
    }

    engine
        .authorize(
            actor,
            Action::FollowUpAddNote,
            &Target::FollowUp(FollowUpId::from_i64(id_seguimiento)),
        )
        .await?;

    let note = FollowUp::add_note(pool, id_seguimiento, actor.id.as_i64(), &req.contenido).await?;
    Ok(MessageResponse::with_id(
        format!("Nota de seguimiento agregada exitosamente al ID {id_seguimiento}."),
        note.id_nota,
    ))
}

/// Close (or reopen) a follow-up.
pub async fn set_follow_up_estado(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id_seguimiento: i64,
    estado: &str,
) -> Result<MessageResponse, ApiError> {
    if estado != "Activo" && estado != "Finalizado" {
        return Err(ApiError::Validation(
            "estado must be 'Activo' or 'Finalizado'".to_string(),
        ));
    }

    engine
        .authorize(
            actor,
            Action::FollowUpClose,
            &Target::FollowUp(FollowUpId::from_i64(id_seguimiento)),
        )
        .await?;

    FollowUp::set_estado(pool, id_seguimiento, estado)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Seguimiento",
            id: id_seguimiento,
        })?;

    Ok(MessageResponse::with_id(
        format!("Seguimiento {id_seguimiento} marcado como '{estado}'."),
        id_seguimiento,
    ))
}

/// Follow-up detail with the full note history.
pub async fn follow_up_detail(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<FollowUpDetailResponse, ApiError> {
    engine
        .authorize(
            actor,
            Action::FollowUpRead,
            &Target::FollowUp(FollowUpId::from_i64(id)),
        )
        .await?;

    let detail = FollowUp::detail(pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Seguimiento",
            id,
        })?;
    let notas = FollowUp::notes(pool, id).await?;

    Ok(FollowUpDetailResponse::assemble(detail, notas))
}

/// Visits pending follow-up (or with one still active), scoped.
pub async fn pending_follow_ups(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
) -> Result<Vec<PendingFollowUp>, ApiError> {
    engine
        .authorize(actor, Action::FollowUpList, &Target::Global)
        .await?;

    let rows = match scope(actor, ResourceKind::FollowUp) {
        Scope::All => FollowUp::pending_all(pool).await?,
        Scope::SubnetOf(user) => {
            FollowUp::pending_by_subnet_leader(pool, user.as_i64()).await?
        }
        Scope::GroupLedBy(user) => FollowUp::pending_by_leader(pool, user.as_i64()).await?,
        Scope::SelfOnly(_) | Scope::Nothing => Vec::new(),
    };
    Ok(rows)
}
