//! Home-group operations: the mutation guard around `CasasDePaz`.

use casapaz_authz::{
    ensure_no_dependents, scope, Action, Actor, AuthzError, HierarchyStore, ResourceKind, Scope,
    Target,
};
use casapaz_core::{GroupId, UserId};
use casapaz_db::models::{Group, GroupSummary, Network, NewGroup, UpdateGroup};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{AssignLeaderRequest, CreateGroupRequest, MessageResponse, UpdateGroupRequest};
use crate::Engine;

/// Create a group, validating every referenced assignment first.
///
/// The structural checks (leader holds the GroupLeader role and leads
/// nothing else, supervisor holds the SubnetLeader role, network exists)
/// run before the rank check and fail regardless of the caller's rank.
pub async fn create_group(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    req: CreateGroupRequest,
) -> Result<MessageResponse, ApiError> {
    if req.direccion.trim().is_empty() {
        return Err(ApiError::Validation("direccion is required".to_string()));
    }

    engine
        .check_leader_assignable(UserId::from_i64(req.id_lider), None)
        .await?;
    engine
        .check_subnet_leader_assignable(UserId::from_i64(req.id_lsr))
        .await?;
    if Network::find_by_id(pool, req.id_red).await?.is_none() {
        return Err(AuthzError::NotFound {
            resource: "Red",
            id: req.id_red,
        }
        .into());
    }

    engine
        .authorize(actor, Action::GroupCreate, &Target::Global)
        .await?;

    let nombre = match req.nombre_lider_cdp {
        Some(nombre) if !nombre.trim().is_empty() => nombre,
        _ => {
            let leader = engine
                .store()
                .user_account(UserId::from_i64(req.id_lider))
                .await
                .map_err(AuthzError::from)?
                .ok_or(AuthzError::NotFound {
                    resource: "Usuario",
                    id: req.id_lider,
                })?;
            format!("CdP {}", leader.nombre)
        }
    };

    let group = Group::create(
        pool,
        &NewGroup {
            nombre_lider_cdp: nombre,
            id_lider: Some(req.id_lider),
            id_lsr: Some(req.id_lsr),
            id_red: req.id_red,
            direccion: req.direccion,
            referencia: req.referencia,
            latitud: req.latitud,
            longitud: req.longitud,
            dia_reunion: req.dia_reunion,
            hora_reunion: req.hora_reunion,
        },
    )
    .await?;

    tracing::info!(
        actor_id = %actor.id,
        id_cdp = group.id_cdp,
        id_lider = req.id_lider,
        "Group created"
    );
    Ok(MessageResponse::with_id(
        format!("Casa de Paz '{}' creada exitosamente.", group.nombre_lider_cdp),
        group.id_cdp,
    ))
}

/// List the groups the actor may see.
pub async fn list_groups(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
) -> Result<Vec<GroupSummary>, ApiError> {
    engine
        .authorize(actor, Action::GroupList, &Target::Global)
        .await?;

    let rows = match scope(actor, ResourceKind::Group) {
        Scope::All => Group::list_all(pool).await?,
        Scope::SubnetOf(user) => Group::list_by_subnet_leader(pool, user.as_i64()).await?,
        // A group leader's listing endpoint is the self-service lookup.
        Scope::GroupLedBy(_) | Scope::SelfOnly(_) | Scope::Nothing => Vec::new(),
    };
    Ok(rows)
}

/// Apply an allow-listed partial update, re-validating any assignment
/// changes.
pub async fn update_group(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
    req: UpdateGroupRequest,
) -> Result<MessageResponse, ApiError> {
    let changes = UpdateGroup {
        nombre_lider_cdp: req.nombre_lider_cdp,
        id_lider: req.id_lider,
        id_lsr: req.id_lsr,
        id_red: req.id_red,
        direccion: req.direccion,
        referencia: req.referencia,
        latitud: req.latitud,
        longitud: req.longitud,
        dia_reunion: req.dia_reunion,
        hora_reunion: req.hora_reunion,
    };
    if changes.is_empty() {
        return Err(ApiError::Validation(
            "at least one field must be provided".to_string(),
        ));
    }

    if let Some(id_lider) = changes.id_lider {
        engine
            .check_leader_assignable(UserId::from_i64(id_lider), Some(GroupId::from_i64(id)))
            .await?;
    }
    if let Some(id_lsr) = changes.id_lsr {
        engine
            .check_subnet_leader_assignable(UserId::from_i64(id_lsr))
            .await?;
    }
    if let Some(id_red) = changes.id_red {
        if Network::find_by_id(pool, id_red).await?.is_none() {
            return Err(AuthzError::NotFound {
                resource: "Red",
                id: id_red,
            }
            .into());
        }
    }

    engine
        .authorize(actor, Action::GroupUpdate, &Target::Group(GroupId::from_i64(id)))
        .await?;

    let group = Group::update(pool, id, &changes)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Casa de Paz",
            id,
        })?;

    tracing::info!(actor_id = %actor.id, id_cdp = id, "Group updated");
    Ok(MessageResponse::with_id(
        format!(
            "Casa de Paz '{}' (ID {id}) actualizada exitosamente.",
            group.nombre_lider_cdp
        ),
        id,
    ))
}

/// Assign (or replace) the leader of a group.
pub async fn assign_leader(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
    req: AssignLeaderRequest,
) -> Result<MessageResponse, ApiError> {
    engine
        .check_leader_assignable(UserId::from_i64(req.id_lider), Some(GroupId::from_i64(id)))
        .await?;
    engine
        .authorize(
            actor,
            Action::GroupAssignLeader,
            &Target::Group(GroupId::from_i64(id)),
        )
        .await?;

    let group = Group::assign_leader(pool, id, req.id_lider)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Casa de Paz",
            id,
        })?;

    tracing::info!(
        actor_id = %actor.id,
        id_cdp = id,
        id_lider = req.id_lider,
        "Group leader assigned"
    );
    Ok(MessageResponse::with_id(
        format!(
            "El usuario {} ha sido asignado como líder de la Casa de Paz '{}'.",
            req.id_lider, group.nombre_lider_cdp
        ),
        id,
    ))
}

/// Delete a group, blocked while members or reports reference it.
pub async fn delete_group(
    pool: &PgPool,
    engine: &Engine,
    actor: &Actor,
    id: i64,
) -> Result<MessageResponse, ApiError> {
    engine
        .authorize(actor, Action::GroupDelete, &Target::Group(GroupId::from_i64(id)))
        .await?;

    let members = Group::count_members(pool, id).await?;
    ensure_no_dependents("Casa de Paz", id, "Miembros", members)?;
    let reports = Group::count_reports(pool, id).await?;
    ensure_no_dependents("Casa de Paz", id, "Reportes de CdP", reports)?;

    Group::delete(pool, id).await?;
    tracing::info!(actor_id = %actor.id, id_cdp = id, "Group deleted");
    Ok(MessageResponse::with_id(
        format!("Casa de Paz (ID {id}) eliminada permanentemente."),
        id,
    ))
}
