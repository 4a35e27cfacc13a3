//! End-to-end scoping tests over the full router.
//!
//! Run with: `cargo test -p casapaz-api -- --ignored`

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use casapaz_core::Role;
use serde_json::json;
use tower::util::ServiceExt;

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", auth)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, auth: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Fixture: two subnets (LSR a supervising groups 1 and 2, LSR b
/// supervising group 3), one member in group 1 and one in group 3.
struct Fixture {
    lsr_a: i64,
    lsr_b: i64,
    lider_1: i64,
    cdp_1: i64,
    cdp_2: i64,
    cdp_3: i64,
    member_in_1: i64,
    member_in_3: i64,
}

async fn build_fixture(pool: &sqlx::PgPool) -> Fixture {
    let red = common::create_network(pool, &common::unique("Red Scoping")).await;
    let lsr_a = common::create_user(pool, &common::unique("lsr-a"), 4).await;
    let lsr_b = common::create_user(pool, &common::unique("lsr-b"), 4).await;
    let lider_1 = common::create_user(pool, &common::unique("lider-1"), 5).await;
    let lider_2 = common::create_user(pool, &common::unique("lider-2"), 5).await;
    let lider_3 = common::create_user(pool, &common::unique("lider-3"), 5).await;

    let cdp_1 = common::create_group(pool, "CdP 1", Some(lider_1), Some(lsr_a), red).await;
    let cdp_2 = common::create_group(pool, "CdP 2", Some(lider_2), Some(lsr_a), red).await;
    let cdp_3 = common::create_group(pool, "CdP 3", Some(lider_3), Some(lsr_b), red).await;

    let member_in_1 = common::create_member(pool, "Miembro Uno", Some(cdp_1)).await;
    let member_in_3 = common::create_member(pool, "Miembro Tres", Some(cdp_3)).await;

    Fixture {
        lsr_a,
        lsr_b,
        lider_1,
        cdp_1,
        cdp_2,
        cdp_3,
        member_in_1,
        member_in_3,
    }
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_out_of_scope_member_is_403_missing_member_is_404() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool);

    let auth = common::bearer(fx.lsr_a, Role::SubnetLeader);

    // In scope: 200.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/miembros/{}", fx.member_in_1), &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Exists, but in the other subnet: 403, never 404.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/miembros/{}", fx.member_in_3), &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "outside_supervision_scope");

    // Does not exist at all: 404.
    let response = app
        .oneshot(get("/api/miembros/999999999", &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_group_leader_creates_member_into_own_group() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool);

    let auth = common::bearer(fx.lider_1, Role::GroupLeader);
    // No id_cdp supplied: the destination group is inferred from the
    // actor, not taken from the caller.
    let response = app
        .oneshot(send_json(
            "POST",
            "/api/miembros",
            &auth,
            json!({
                "nombre": "Ana",
                "sexo": "F",
                "fecha_nacimiento": "2000-01-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id_cdp"], fx.cdp_1);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_cross_subnet_update_is_denied() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool);

    let auth = common::bearer(fx.lsr_a, Role::SubnetLeader);
    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/miembros/{}", fx.member_in_3),
            &auth,
            json!({ "telefono": "5555-1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "outside_supervision_scope");
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_leader_cannot_reassign_but_administration_can() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let admin = common::create_user(&pool, &common::unique("admin"), 2).await;
    let app = common::test_app(pool);

    // The member's own leader is denied.
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/miembros/{}/reasignar", fx.member_in_1),
            &common::bearer(fx.lider_1, Role::GroupLeader),
            json!({ "id_cdp": fx.cdp_2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "reassignment_requires_higher_role");

    // A subnet leader may move within their subnet.
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/miembros/{}/reasignar", fx.member_in_1),
            &common::bearer(fx.lsr_a, Role::SubnetLeader),
            json!({ "id_cdp": fx.cdp_2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // But not into the other subnet.
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/miembros/{}/reasignar", fx.member_in_1),
            &common::bearer(fx.lsr_a, Role::SubnetLeader),
            json!({ "id_cdp": fx.cdp_3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Administration moves members anywhere.
    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/miembros/{}/reasignar", fx.member_in_1),
            &common::bearer(admin, Role::Administration),
            json!({ "id_cdp": fx.cdp_3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id_cdp"], fx.cdp_3);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_administration_reserved_set_follows_policy() {
    let pool = common::create_test_pool().await;
    let admin = common::create_user(&pool, &common::unique("admin-policy"), 2).await;

    // Strict policy: Administration is denied user management.
    let app = common::test_app(pool.clone());
    let response = app
        .oneshot(get("/api/admin/usuarios", &common::bearer(admin, Role::Administration)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "insufficient_rank");

    // Opt-in policy: the same request passes.
    let app = common::test_app_with_policy(
        pool,
        casapaz_authz::AuthzPolicy::administration_global(),
    );
    let response = app
        .oneshot(get("/api/admin/usuarios", &common::bearer(admin, Role::Administration)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_soft_delete_is_idempotent() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool);

    let auth = common::bearer(fx.lider_1, Role::GroupLeader);
    let uri = format!("/api/miembros/{}", fx.member_in_1);

    let response = app.clone().oneshot(
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header("authorization", &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleting again succeeds and reports the member already inactive.
    let response = app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header("authorization", &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["mensaje"].as_str().unwrap().contains("ya está inactivo"));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_group_delete_blocked_then_allowed() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let super_admin = common::create_user(&pool, &common::unique("root"), 1).await;
    let app = common::test_app(pool.clone());

    let auth = common::bearer(super_admin, Role::SuperAdmin);
    let uri = format!("/api/admin/cdp/{}", fx.cdp_3);

    // Blocked while a member references the group.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "dependency_conflict");

    // After moving the member out, the delete succeeds.
    casapaz_db::models::Member::reassign(&pool, fx.member_in_3, fx.cdp_1)
        .await
        .unwrap();
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_full_report_rolls_back_end_to_end() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool.clone());

    let auth = common::bearer(fx.lider_1, Role::GroupLeader);
    let response = app
        .oneshot(send_json(
            "POST",
            "/api/reportes/cdp",
            &auth,
            json!({
                "fecha_reporte": "2025-03-06",
                "latitud": 14.6,
                "longitud": -90.5,
                "asistencia": [
                    { "id_miembro": fx.member_in_1, "asistio": true }
                ],
                "visitas": [
                    // Missing tipo: the whole composite must fail.
                    { "nombre": "Juan", "tipo": "", "decision": "Conversion" }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No partial report persisted.
    let reports = casapaz_db::models::Report::list_by_leader(&pool, fx.lider_1)
        .await
        .unwrap();
    assert!(reports.is_empty());
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_subnet_member_listing_matches_group_scope() {
    let pool = common::create_test_pool().await;
    let fx = build_fixture(&pool).await;
    let app = common::test_app(pool);

    // LSR b sees exactly the members of the groups they supervise.
    let response = app
        .oneshot(get("/api/miembros", &common::bearer(fx.lsr_b, Role::SubnetLeader)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id_miembro"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&fx.member_in_3));
    assert!(!ids.contains(&fx.member_in_1));
}
