//! Integration tests for the relational layer.
//!
//! Run with: `cargo test -p casapaz-db -- --ignored`

mod common;

use casapaz_authz::HierarchyStore;
use casapaz_core::{GroupId, MemberId, UserId};
use casapaz_db::models::{
    FollowUp, Group, Member, NewAttendanceEntry, NewMember, NewReport, NewVisit, Report,
};
use casapaz_db::{DbError, PgHierarchyStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn birthdate() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn new_member(nombre: &str, id_cdp: Option<i64>) -> NewMember {
    NewMember {
        id_cdp,
        nombre: nombre.to_string(),
        telefono: Some("5555-0000".to_string()),
        direccion: None,
        referencia: None,
        sexo: Some("F".to_string()),
        fecha_nacimiento: birthdate(),
        fecha_conversion: None,
        fecha_bautizo: None,
        fecha_boda: None,
    }
}

fn new_report(id_lider: i64) -> NewReport {
    NewReport {
        id_lider,
        fecha_reporte: NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
        latitud: 14.6,
        longitud: -90.5,
        ofrendas: Decimal::new(15000, 2),
        diezmos: Decimal::ZERO,
        pactos: Decimal::ZERO,
        primicias: Decimal::ZERO,
        comentarios: None,
    }
}

fn visit(nombre: &str, tipo: &str, decision: &str, seguimiento: bool) -> NewVisit {
    NewVisit {
        nombre: nombre.to_string(),
        telefono: None,
        direccion: None,
        referencia: None,
        nombre_invitador: None,
        asiste_otra_iglesia: false,
        nombre_otra_iglesia: None,
        tipo: tipo.to_string(),
        decision: decision.to_string(),
        iniciar_seguimiento: seguimiento,
    }
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_leader_uniqueness_is_enforced_by_the_store() {
    let pool = common::create_test_pool().await;
    let red = common::create_test_network(&pool, "Red Test Lider Unico").await;
    let lider = common::create_test_user(&pool, "lider-unico-test", 5).await;

    common::create_test_group(&pool, "CdP Uno", Some(lider), None, red).await;

    // Racing a second assignment of the same leader hits the UNIQUE
    // constraint, regardless of any application pre-check.
    let group = casapaz_db::models::NewGroup {
        nombre_lider_cdp: "CdP Dos".to_string(),
        id_lider: Some(lider),
        id_lsr: None,
        id_red: red,
        direccion: "Calle 2".to_string(),
        referencia: None,
        latitud: 14.6,
        longitud: -90.5,
        dia_reunion: None,
        hora_reunion: None,
    };
    let err = Group::create(&pool, &group).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation(_)));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_member_soft_delete_and_reassignment() {
    let pool = common::create_test_pool().await;
    let red = common::create_test_network(&pool, "Red Test Miembros").await;
    let lider_a = common::create_test_user(&pool, "lider-miembros-a", 5).await;
    let lider_b = common::create_test_user(&pool, "lider-miembros-b", 5).await;
    let cdp_a = common::create_test_group(&pool, "CdP A", Some(lider_a), None, red).await;
    let cdp_b = common::create_test_group(&pool, "CdP B", Some(lider_b), None, red).await;

    let member = Member::create(&pool, &new_member("Ana", Some(cdp_a))).await.unwrap();
    assert_eq!(member.estado, "Activo");

    let member = Member::set_estado(&pool, member.id_miembro, "Inactivo")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.estado, "Inactivo");

    let member = Member::reassign(&pool, member.id_miembro, cdp_b)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.id_cdp, Some(cdp_b));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_full_report_rolls_back_on_invalid_visit() {
    let pool = common::create_test_pool().await;
    let red = common::create_test_network(&pool, "Red Test Reporte").await;
    let lider = common::create_test_user(&pool, "lider-reporte", 5).await;
    let cdp = common::create_test_group(&pool, "CdP Reporte", Some(lider), None, red).await;

    let m1 = Member::create(&pool, &new_member("M1", Some(cdp))).await.unwrap();
    let m2 = Member::create(&pool, &new_member("M2", Some(cdp))).await.unwrap();
    let m3 = Member::create(&pool, &new_member("M3", Some(cdp))).await.unwrap();

    let asistencia = vec![
        NewAttendanceEntry { id_miembro: m1.id_miembro, asistio: true },
        NewAttendanceEntry { id_miembro: m2.id_miembro, asistio: true },
        NewAttendanceEntry { id_miembro: m3.id_miembro, asistio: false },
    ];
    // The visit is missing its tipo: the whole unit must roll back.
    let visitas = vec![visit("Juan Perez", "", "Conversion", true)];

    let err = Report::create_full(&pool, cdp, &new_report(lider), &asistencia, &visitas)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ValidationFailed(_)));

    // Nothing persisted: no report for this leader.
    let reports = Report::list_by_leader(&pool, lider).await.unwrap();
    assert!(reports.is_empty());
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_full_report_commits_and_seeds_follow_ups() {
    let pool = common::create_test_pool().await;
    let red = common::create_test_network(&pool, "Red Test Reporte OK").await;
    let lider = common::create_test_user(&pool, "lider-reporte-ok", 5).await;
    let cdp = common::create_test_group(&pool, "CdP Reporte OK", Some(lider), None, red).await;

    let m1 = Member::create(&pool, &new_member("M1", Some(cdp))).await.unwrap();

    let created = Report::create_full(
        &pool,
        cdp,
        &new_report(lider),
        &[NewAttendanceEntry { id_miembro: m1.id_miembro, asistio: true }],
        &[visit("Invitada", "Nuevo", "Conversion", true)],
    )
    .await
    .unwrap();

    assert_eq!(created.visitas.len(), 1);
    assert_eq!(created.seguimientos.len(), 1);

    // A second follow-up on the same visit is a uniqueness conflict.
    let err = FollowUp::start(&pool, created.visitas[0]).await.unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_hierarchy_store_resolves_chains() {
    let pool = common::create_test_pool().await;
    let red = common::create_test_network(&pool, "Red Test Chains").await;
    let lsr = common::create_test_user(&pool, "lsr-chains", 4).await;
    let lider = common::create_test_user(&pool, "lider-chains", 5).await;
    let cdp = common::create_test_group(&pool, "CdP Chains", Some(lider), Some(lsr), red).await;

    let member = Member::create(&pool, &new_member("Ana", Some(cdp))).await.unwrap();
    let detached = Member::create(&pool, &new_member("Sin Grupo", None)).await.unwrap();

    let store = PgHierarchyStore::new(pool.clone());

    let chain = store
        .group_chain(GroupId::from_i64(cdp))
        .await
        .unwrap()
        .unwrap();
    assert!(chain.is_led_by(UserId::from_i64(lider)));
    assert!(chain.is_supervised_by(UserId::from_i64(lsr)));

    let member_chain = store
        .member_chain(MemberId::from_i64(member.id_miembro))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member_chain.group.unwrap().group_id, GroupId::from_i64(cdp));

    let detached_chain = store
        .member_chain(MemberId::from_i64(detached.id_miembro))
        .await
        .unwrap()
        .unwrap();
    assert!(detached_chain.group.is_none());

    let led = store.group_led_by(UserId::from_i64(lider)).await.unwrap();
    assert_eq!(led.unwrap().group_id, GroupId::from_i64(cdp));
}
