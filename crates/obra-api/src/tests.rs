//! Router tests against an in-memory `SqliteStore`.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use obra_core::{access::Principal, catalog::Catalog};
use obra_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app_as(principal: Option<Principal>) -> Router {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  router_for(store, principal)
}

fn router_for(store: Arc<SqliteStore>, principal: Option<Principal>) -> Router {
  let router = api_router(store, Arc::new(Catalog::default()));
  match principal {
    Some(p) => router.layer(Extension(p)),
    None => router,
  }
}

fn secretary() -> Principal { Principal::user("secretaria") }

fn admin() -> Principal {
  Principal {
    admin: true,
    ..Principal::user("admin")
  }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header("content-type", "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn form(name: &str, worker_type: &str) -> Value {
  json!({
    "fullName": name,
    "workerType": worker_type,
    "sector": "Setor Norte",
    "field": "Planalto",
  })
}

// ─── Workers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_worker_appears_in_list() {
  let app = app_as(Some(secretary())).await;

  let (status, record) =
    send(&app, Method::POST, "/workers", Some(form("  Maria Silva ", "pastor"))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(record["fullName"], "Maria Silva");
  assert_eq!(record["createdBy"], "secretaria");
  assert_eq!(record["payment"]["kind"], "cash");

  let (status, view) = send(&app, Method::GET, "/workers", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["filtered"], 1);
  assert_eq!(view["summary"]["total"], 1);
  assert_eq!(view["records"][0]["id"], record["id"]);
}

#[tokio::test]
async fn anonymous_creation_is_recorded_as_unknown() {
  let app = app_as(None).await;
  let (_, record) = send(&app, Method::POST, "/workers", Some(form("Ana", "retired"))).await;
  assert_eq!(record["createdBy"], "unknown");
}

#[tokio::test]
async fn incomplete_form_is_unprocessable() {
  let app = app_as(Some(secretary())).await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/workers",
    Some(json!({ "fullName": "   ", "sector": "Setor Norte" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let msg = body["error"].as_str().unwrap();
  assert!(msg.contains("fullName") && msg.contains("workerType") && msg.contains("field"));

  let (_, view) = send(&app, Method::GET, "/workers", None).await;
  assert_eq!(view["summary"]["total"], 0);
}

#[tokio::test]
async fn field_outside_sector_is_unprocessable() {
  let app = app_as(Some(secretary())).await;
  let mut body = form("Maria", "pastor");
  body["field"] = json!("Sede");
  let (status, _) = send(&app, Method::POST, "/workers", Some(body)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_applies_query_filter() {
  let app = app_as(Some(secretary())).await;
  send(&app, Method::POST, "/workers", Some(form("Maria Silva", "pastor"))).await;
  send(&app, Method::POST, "/workers", Some(form("Maria Costa", "missionary"))).await;
  send(&app, Method::POST, "/workers", Some(form("João Souza", "missionary"))).await;

  let (status, view) =
    send(&app, Method::GET, "/workers?search=maria&worker_type=missionary", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["filtered"], 1);
  assert_eq!(view["records"][0]["fullName"], "Maria Costa");
  assert_eq!(view["summary"]["total"], 3);
  assert_eq!(view["summary"]["by_type"]["missionary"], 2);
}

#[tokio::test]
async fn blank_query_values_do_not_filter() {
  let app = app_as(Some(secretary())).await;
  send(&app, Method::POST, "/workers", Some(form("Maria Silva", "pastor"))).await;

  let (status, view) = send(
    &app,
    Method::GET,
    "/workers?search=&sector=&year=&worker_type=&payment_kind=",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["filtered"], 1);
  assert_eq!(view["summary"]["total"], 1);

  let (status, view) =
    send(&app, Method::GET, "/workers?sector=Setor%20Norte&year=1999", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["filtered"], 0);
}

#[tokio::test]
async fn get_missing_worker_is_not_found() {
  let app = app_as(None).await;
  let (status, body) = send(&app, Method::GET, "/workers/123", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn patch_validates_location_and_applies() {
  let app = app_as(Some(secretary())).await;
  let (_, record) = send(&app, Method::POST, "/workers", Some(form("Maria", "pastor"))).await;
  let uri = format!("/workers/{}", record["id"].as_str().unwrap());

  let (status, _) =
    send(&app, Method::PATCH, &uri, Some(json!({ "field": "Sede" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, updated) =
    send(&app, Method::PATCH, &uri, Some(json!({ "field": "Boa Vista", "notes": "novo campo" })))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["field"], "Boa Vista");
  assert_eq!(updated["notes"], "novo campo");
  assert_eq!(updated["createdAt"], record["createdAt"]);

  let (status, _) =
    send(&app, Method::PATCH, "/workers/999", Some(json!({ "fullName": "X" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_keeps_record_invariants() {
  let app = app_as(Some(secretary())).await;
  let (_, record) = send(&app, Method::POST, "/workers", Some(form("Maria", "pastor"))).await;
  let uri = format!("/workers/{}", record["id"].as_str().unwrap());

  let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "fullName": "   " }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let bank = json!({ "payment": { "kind": "bank", "agency": "" } });
  let (status, _) = send(&app, Method::PATCH, &uri, Some(bank)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (_, unchanged) = send(&app, Method::GET, &uri, None).await;
  assert_eq!(unchanged, record);

  let (status, updated) = send(
    &app,
    Method::PATCH,
    &uri,
    Some(json!({ "fullName": " Maria Lima ", "notes": "  transferida  " })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["fullName"], "Maria Lima");
  assert_eq!(updated["notes"], "transferida");

  let (status, cleared) = send(&app, Method::PATCH, &uri, Some(json!({ "notes": "  " }))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(cleared.get("notes").is_none());
}

#[tokio::test]
async fn delete_requires_rights_and_confirmation() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let app = router_for(store.clone(), Some(secretary()));
  let (_, record) = send(&app, Method::POST, "/workers", Some(form("Maria", "pastor"))).await;
  let id = record["id"].as_str().unwrap().to_owned();

  let (status, _) =
    send(&app, Method::DELETE, &format!("/workers/{id}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let admin_app = router_for(store, Some(admin()));
  let (status, _) = send(&admin_app, Method::DELETE, &format!("/workers/{id}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) =
    send(&admin_app, Method::DELETE, &format!("/workers/{id}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) =
    send(&admin_app, Method::DELETE, &format!("/workers/{id}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_counts_both_payment_kinds() {
  let app = app_as(Some(secretary())).await;
  let mut banked = form("Maria", "evangelist");
  banked["paymentKind"] = json!("bank");
  banked["agency"] = json!("0001");
  send(&app, Method::POST, "/workers", Some(banked)).await;

  let (status, summary) = send(&app, Method::GET, "/summary", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(summary["total"], 1);
  assert_eq!(summary["by_payment"]["bank"], 1);
  assert_eq!(summary["by_payment"]["cash"], 0);
}

#[tokio::test]
async fn catalog_lists_sectors() {
  let app = app_as(None).await;
  let (status, catalog) = send(&app, Method::GET, "/catalog", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(catalog.as_array().unwrap().len(), Catalog::default().sectors().count());
}

// ─── Pastors and ledger ──────────────────────────────────────────────────────

#[tokio::test]
async fn pastor_registration_takes_actor_from_principal() {
  let app = app_as(Some(secretary())).await;
  let (status, reg) = send(
    &app,
    Method::POST,
    "/pastors",
    Some(json!({
      "pastorName": "Pr. Antônio",
      "spouseName": "Lúcia",
      "children": [{ "name": "Davi" }],
      "createdBy": "someone else",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(reg["createdBy"], "secretaria");

  let (status, _) =
    send(&app, Method::POST, "/pastors", Some(json!({ "pastorName": "" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (_, list) = send(&app, Method::GET, "/pastors", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn contributions_are_validated_and_summarised() {
  let app = app_as(Some(admin())).await;
  for (amount, month) in [("150.50", "2024-01"), ("49.50", "2024-02")] {
    let (status, _) = send(
      &app,
      Method::POST,
      "/contributions",
      Some(json!({
        "sector": "Setor Sul",
        "field": "Bela Vista",
        "amount": amount,
        "referenceMonth": month,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, _) = send(
    &app,
    Method::POST,
    "/contributions",
    Some(json!({
      "sector": "Setor Sul",
      "field": "Planalto",
      "amount": "10.00",
      "referenceMonth": "2024-01",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, summary) = send(&app, Method::GET, "/contributions/summary", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(summary["entries"], 2);
  assert_eq!(summary["total"], "200.00");

  let (_, list) = send(&app, Method::GET, "/contributions", None).await;
  let id = list[0]["id"].as_str().unwrap();
  assert_eq!(list[0]["createdBy"], "admin");
  let (status, _) =
    send(&app, Method::DELETE, &format!("/contributions/{id}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}
