//! Member operations: the mutation guard around `Miembros`.
//!
//! Every write runs check-then-act: the engine decision and the state
//! invariants are evaluated before any row is touched, and the store's
//! own constraints remain the authority for races.

use casapaz_authz::{
    ensure_no_dependents, plan_deactivation, scope, Action, Actor, AuthzError, Deactivation,
    HierarchyStore, MemberLifecycle, ResourceKind, Scope, Target,
};
use casapaz_core::{GroupId, MemberId, Role};
use casapaz_db::models::{Member, MemberPhase, MemberSummary, NewMember, UpdateMember};
use casapaz_db::DbError;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{
    CreateMemberRequest, MemberPhaseRequest, MemberResponse, MessageResponse,
    ReassignMemberRequest, UpdateMemberRequest,
};
use crate::Engine;

/// Register a member.
///
/// A group leader registers into the group they lead (the destination is
/// inferred, never taken from the caller); higher roles name the group,
/// and global roles may create an unassigned member.
pub async fn create_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    req: CreateMemberRequest,
) -> Result<MemberResponse, ApiError> {
    if req.nombre.trim().is_empty() {
        return Err(ApiError::Validation("nombre is required".to_string()));
    }

    let id_cdp = match req.id_cdp {
        Some(id) => Some(id),
        None if actor.role == Role::GroupLeader => {
            let group = engine
                .store()
                .group_led_by(actor.id)
                .await
                .map_err(AuthzError::from)?
                .ok_or_else(|| {
                    ApiError::NotFoundMessage(
                        "El usuario no tiene una Casa de Paz asignada".to_string(),
                    )
                })?;
            Some(group.group_id.as_i64())
        }
        None if actor.role.is_global() => None,
        None => {
            return Err(ApiError::Validation("id_cdp is required".to_string()));
        }
    };

    let target = match id_cdp {
        Some(id) => Target::Group(GroupId::from_i64(id)),
        None => Target::Global,
    };
    engine.authorize(actor, Action::MemberCreate, &target).await?;

    let member = Member::create(
        pool,
        &NewMember {
            id_cdp,
            nombre: req.nombre,
            telefono: req.telefono,
            direccion: req.direccion,
            referencia: req.referencia,
            sexo: req.sexo,
            fecha_nacimiento: req.fecha_nacimiento,
            fecha_conversion: req.fecha_conversion,
            fecha_bautizo: req.fecha_bautizo,
            fecha_boda: req.fecha_boda,
        },
    )
    .await?;

    tracing::info!(
        actor_id = %actor.id,
        id_miembro = member.id_miembro,
        id_cdp = ?member.id_cdp,
        "Member created"
    );

    Ok(member.into())
}

/// Fetch one member, scope-checked.
///
/// An existing member outside the actor's scope is a denial, never a
/// 404.
pub async fn get_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<MemberResponse, ApiError> {
    engine
        .authorize(actor, Action::MemberRead, &Target::Member(MemberId::from_i64(id)))
        .await?;

    let member = Member::find_by_id(pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Miembro",
            id,
        })?;
    Ok(member.into())
}

/// List the members the actor may see.
pub async fn list_members(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
) -> Result<Vec<MemberSummary>, ApiError> {
    engine
        .authorize(actor, Action::MemberList, &Target::Global)
        .await?;

    let rows = match scope(actor, ResourceKind::Member) {
        Scope::All => Member::list_all(pool).await?,
        Scope::SubnetOf(user) => Member::list_by_subnet_leader(pool, user.as_i64()).await?,
        Scope::GroupLedBy(user) => Member::list_by_leader(pool, user.as_i64()).await?,
        Scope::SelfOnly(_) | Scope::Nothing => Vec::new(),
    };
    Ok(rows)
}

/// Apply an allow-listed partial update.
pub async fn update_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
    req: UpdateMemberRequest,
) -> Result<MemberResponse, ApiError> {
    let changes = UpdateMember {
        nombre: req.nombre,
        telefono: req.telefono,
        direccion: req.direccion,
        referencia: req.referencia,
        sexo: req.sexo,
        fecha_nacimiento: req.fecha_nacimiento,
        fecha_conversion: req.fecha_conversion,
        fecha_bautizo: req.fecha_bautizo,
        fecha_boda: req.fecha_boda,
        estado: req.estado,
    };
    if changes.is_empty() {
        return Err(ApiError::Validation(
            "at least one field must be provided".to_string(),
        ));
    }
    if let Some(estado) = &changes.estado {
        if MemberLifecycle::from_estado(estado).is_none() {
            return Err(ApiError::Validation(
                "estado must be 'Activo' or 'Inactivo'".to_string(),
            ));
        }
    }

    engine
        .authorize(actor, Action::MemberUpdate, &Target::Member(MemberId::from_i64(id)))
        .await?;

    let member = Member::update(pool, id, &changes)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Miembro",
            id,
        })?;
    Ok(member.into())
}

/// Soft delete: set the member inactive. Repeatable — deactivating an
/// already-inactive member succeeds without a write.
pub async fn deactivate_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<MessageResponse, ApiError> {
    engine
        .authorize(
            actor,
            Action::MemberDeactivate,
            &Target::Member(MemberId::from_i64(id)),
        )
        .await?;

    let member = Member::find_by_id(pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Miembro",
            id,
        })?;
    let current = MemberLifecycle::from_estado(&member.estado)
        .ok_or_else(|| ApiError::Internal(format!("member {id} carries estado '{}'", member.estado)))?;

    match plan_deactivation(current) {
        Deactivation::AlreadyInactive => Ok(MessageResponse::with_id(
            format!("El miembro {} ya está inactivo.", member.nombre),
            id,
        )),
        Deactivation::Apply => {
            Member::set_estado(pool, id, MemberLifecycle::Inactive.as_estado()).await?;
            tracing::info!(actor_id = %actor.id, id_miembro = id, "Member deactivated");
            Ok(MessageResponse::with_id(
                format!("Miembro {} marcado como 'Inactivo'.", member.nombre),
                id,
            ))
        }
    }
}

/// Hard delete, reserved to global roles and blocked by dependents.
pub async fn hard_delete_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<MessageResponse, ApiError> {
    engine
        .authorize(
            actor,
            Action::MemberHardDelete,
            &Target::Member(MemberId::from_i64(id)),
        )
        .await?;

    let attendance = Member::count_attendance(pool, id).await?;
    ensure_no_dependents("Miembro", id, "registros de asistencia", attendance)?;

    Member::hard_delete(pool, id).await?;
    tracing::info!(actor_id = %actor.id, id_miembro = id, "Member hard-deleted");
    Ok(MessageResponse::with_id(
        format!("Miembro {id} eliminado permanentemente."),
        id,
    ))
}

/// Move a member to another group.
pub async fn reassign_member(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
    req: ReassignMemberRequest,
) -> Result<MemberResponse, ApiError> {
    engine
        .authorize_reassignment(
            actor,
            MemberId::from_i64(id),
            GroupId::from_i64(req.id_cdp),
        )
        .await?;

    let member = Member::reassign(pool, id, req.id_cdp)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Miembro",
            id,
        })?;

    tracing::info!(
        actor_id = %actor.id,
        id_miembro = id,
        id_cdp = req.id_cdp,
        "Member reassigned"
    );
    Ok(member.into())
}

/// Record (or re-date) a vision-phase approval.
pub async fn update_member_phase(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    req: MemberPhaseRequest,
) -> Result<MessageResponse, ApiError> {
    engine
        .authorize(
            actor,
            Action::MemberPhaseUpdate,
            &Target::Member(MemberId::from_i64(req.id_miembro)),
        )
        .await?;

    let row = MemberPhase::upsert(pool, req.id_miembro, req.id_fase, req.fecha_aprobacion)
        .await
        .map_err(|err| match err {
            DbError::ForeignKeyViolation(_) => ApiError::NotFoundMessage(
                "El Miembro o la Fase de Visión especificada no existe.".to_string(),
            ),
            other => other.into(),
        })?;

    Ok(MessageResponse::with_id(
        format!(
            "Fase {} registrada para el Miembro {} con fecha {}.",
            row.id_fase, row.id_miembro, row.fecha_aprobacion
        ),
        row.id_miembro,
    ))
}

/// The group a leader's self-service endpoints operate on.
pub async fn own_group_id(engine: &Engine, actor: &Actor) -> Result<(i64, String), ApiError> {
    let group = engine
        .store()
        .group_led_by(actor.id)
        .await
        .map_err(AuthzError::from)?
        .ok_or_else(|| {
            ApiError::NotFoundMessage(
                "No se encontró una Casa de Paz asociada a este Líder.".to_string(),
            )
        })?;
    Ok((group.group_id.as_i64(), group.nombre))
}
