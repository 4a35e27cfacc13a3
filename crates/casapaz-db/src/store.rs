//! Postgres-backed implementation of the hierarchy resolver seam.
//!
//! Every method is a single snapshot query; nothing is cached. Query
//! failures map to `StoreError::Unavailable`, which aborts the request
//! as an infrastructure failure rather than a denial.

use async_trait::async_trait;
use casapaz_authz::{Chain, GroupRef, HierarchyStore, MemberChain, StoreError, UserAccount};
use casapaz_core::{FollowUpId, GroupId, MemberId, NetworkId, ReportId, Role, UserId, VisitId};
use sqlx::PgPool;

/// The production hierarchy store.
#[derive(Debug, Clone)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    /// Wrap a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

type ChainRow = (i64, Option<i64>, Option<i64>, i64);

fn chain_from_row((id_cdp, id_lider, id_lsr, id_red): ChainRow) -> Chain {
    Chain {
        group_id: GroupId::from_i64(id_cdp),
        leader_id: id_lider.map(UserId::from_i64),
        subnet_leader_id: id_lsr.map(UserId::from_i64),
        network_id: NetworkId::from_i64(id_red),
    }
}

#[async_trait]
impl HierarchyStore for PgHierarchyStore {
    async fn group_led_by(&self, user_id: UserId) -> Result<Option<GroupRef>, StoreError> {
        let row: Option<(i64, String)> = sqlx::query_as(
            r#"SELECT id_cdp, nombre_lider_cdp FROM "CasasDePaz" WHERE id_lider = $1"#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(|(id_cdp, nombre)| GroupRef {
            group_id: GroupId::from_i64(id_cdp),
            nombre,
        }))
    }

    async fn groups_supervised_by(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as(r#"SELECT id_cdp FROM "CasasDePaz" WHERE id_lsr = $1 ORDER BY id_cdp"#)
                .bind(user_id.as_i64())
                .fetch_all(&self.pool)
                .await
                .map_err(unavailable)?;

        Ok(rows.into_iter().map(|(id,)| GroupId::from_i64(id)).collect())
    }

    async fn group_chain(&self, group_id: GroupId) -> Result<Option<Chain>, StoreError> {
        let row: Option<ChainRow> = sqlx::query_as(
            r#"SELECT id_cdp, id_lider, id_lsr, id_red FROM "CasasDePaz" WHERE id_cdp = $1"#,
        )
        .bind(group_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(chain_from_row))
    }

    async fn member_chain(&self, member_id: MemberId) -> Result<Option<MemberChain>, StoreError> {
        let row: Option<(Option<i64>, Option<i64>, Option<i64>, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT m.id_cdp, c.id_lider, c.id_lsr, c.id_red
            FROM "Miembros" m
            LEFT JOIN "CasasDePaz" c ON m.id_cdp = c.id_cdp
            WHERE m.id_miembro = $1
            "#,
        )
        .bind(member_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(|(id_cdp, id_lider, id_lsr, id_red)| MemberChain {
            member_id,
            group: match (id_cdp, id_red) {
                (Some(id_cdp), Some(id_red)) => {
                    Some(chain_from_row((id_cdp, id_lider, id_lsr, id_red)))
                }
                _ => None,
            },
        }))
    }

    async fn report_chain(&self, report_id: ReportId) -> Result<Option<Chain>, StoreError> {
        let row: Option<ChainRow> = sqlx::query_as(
            r#"
            SELECT c.id_cdp, c.id_lider, c.id_lsr, c.id_red
            FROM "ReporteCdP" rc
            JOIN "CasasDePaz" c ON rc.id_lider = c.id_lider
            WHERE rc.id_reporte_cdp = $1
            "#,
        )
        .bind(report_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(chain_from_row))
    }

    async fn visit_chain(&self, visit_id: VisitId) -> Result<Option<Chain>, StoreError> {
        let row: Option<ChainRow> = sqlx::query_as(
            r#"
            SELECT c.id_cdp, c.id_lider, c.id_lsr, c.id_red
            FROM "VisitasCdP" v
            JOIN "ReporteCdP" rc ON v.id_reporte_cdp = rc.id_reporte_cdp
            JOIN "CasasDePaz" c ON rc.id_lider = c.id_lider
            WHERE v.id_visita = $1
            "#,
        )
        .bind(visit_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(chain_from_row))
    }

    async fn follow_up_chain(
        &self,
        follow_up_id: FollowUpId,
    ) -> Result<Option<Chain>, StoreError> {
        let row: Option<ChainRow> = sqlx::query_as(
            r#"
            SELECT c.id_cdp, c.id_lider, c.id_lsr, c.id_red
            FROM "Seguimiento" s
            JOIN "VisitasCdP" v ON s.id_visita = v.id_visita
            JOIN "ReporteCdP" rc ON v.id_reporte_cdp = rc.id_reporte_cdp
            JOIN "CasasDePaz" c ON rc.id_lider = c.id_lider
            WHERE s.id_seguimiento = $1
            "#,
        )
        .bind(follow_up_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(chain_from_row))
    }

    async fn user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row: Option<(i16, bool, String)> =
            sqlx::query_as(r#"SELECT id_rol, estado, nombre FROM "Usuarios" WHERE id_usuario = $1"#)
                .bind(user_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        row.map(|(id_rol, estado, nombre)| {
            let role = Role::from_id(id_rol).ok_or_else(|| {
                StoreError::Unavailable(format!(
                    "user {user_id} carries unknown role id {id_rol}"
                ))
            })?;
            Ok(UserAccount {
                role,
                active: estado,
                nombre,
            })
        })
        .transpose()
    }
}
