use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;

use gantry_model::{
    ConnField, ConnId, ConnectionRecord, ConnectionStore, InMemoryConnectionStore, ModelError,
    Schedule, TaskId, TaskNode, Workflow, WorkUnit,
};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn sql_task(id: &str) -> TaskNode {
    TaskNode::new(
        TaskId::new(id).unwrap(),
        WorkUnit::Sql {
            conn: ConnId::new("warehouse").unwrap(),
            sql: format!("SELECT '{id}';"),
        },
    )
}

fn id(value: &str) -> TaskId {
    TaskId::new(value).unwrap()
}

#[test]
fn build_freezes_nodes_and_edges() {
    let workflow = Workflow::builder("nightly", Schedule::daily_from(start_date()))
        .add(sql_task("kickoff"))
        .add(sql_task("load").after(id("kickoff")))
        .add(sql_task("final").after(id("load")))
        .build()
        .unwrap();

    assert_eq!(workflow.name(), "nightly");
    assert_eq!(workflow.nodes().len(), 3);
    assert_eq!(
        workflow.edges(),
        vec![
            (id("kickoff"), id("load")),
            (id("load"), id("final")),
        ]
    );
    assert_eq!(
        workflow.topo_order(),
        vec![id("kickoff"), id("load"), id("final")]
    );
    assert!(workflow.node(&id("load")).is_some());
    assert!(workflow.node(&id("missing")).is_none());
}

#[test]
fn duplicate_task_ids_are_rejected() {
    let err = Workflow::builder("dup", Schedule::daily_from(start_date()))
        .add(sql_task("step"))
        .add(sql_task("step"))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateTaskId { ref task, .. } if task == &id("step")));
}

#[test]
fn unknown_upstream_is_rejected() {
    let err = Workflow::builder("dangling", Schedule::daily_from(start_date()))
        .add(sql_task("step").after(id("ghost")))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::UnknownUpstream { ref upstream, .. } if upstream == &id("ghost")
    ));
}

#[test]
fn cycles_are_rejected() {
    let err = Workflow::builder("loop", Schedule::daily_from(start_date()))
        .add(sql_task("a").after(id("b")))
        .add(sql_task("b").after(id("a")))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DependencyCycle { ref workflow } if workflow == "loop"));
}

#[test]
fn workflow_round_trips_through_json() {
    let workflow = Workflow::builder("roundtrip", Schedule::daily_from(start_date()))
        .add(sql_task("kickoff"))
        .add(sql_task("final").after(id("kickoff")))
        .build()
        .unwrap();

    let manifest = serde_json::to_string_pretty(&workflow).unwrap();
    let back: Workflow = serde_json::from_str(&manifest).unwrap();
    assert_eq!(back, workflow);
}

#[test]
fn schedule_defaults_to_single_run_no_catchup() {
    let schedule: Schedule = serde_json::from_value(json!({ "start_date": "2024-01-01" })).unwrap();
    assert!(!schedule.catchup);
    assert_eq!(schedule.max_active_runs, 1);
    assert_eq!(schedule.interval, None);
    assert_eq!(schedule.describe(), "manual");

    let daily = Schedule::daily_from(start_date());
    assert_eq!(daily.describe(), "every 1d");
    assert_eq!(daily.as_manual().describe(), "manual");
}

#[test]
fn client_secrets_require_the_blob_only() {
    let conn = ConnId::new("sheets_svc").unwrap();
    let record: ConnectionRecord = serde_json::from_value(json!({
        "extra": {
            "client_secrets": {
                "type": "service_account",
                "project_id": "abc-123"
            }
        }
    }))
    .unwrap();

    let key = record.client_secrets(&conn).unwrap();
    assert_eq!(key.project_id.as_deref(), Some("abc-123"));
    assert_eq!(key.private_key, None);
}

#[test]
fn missing_client_secrets_fail_before_any_network_call() {
    let conn = ConnId::new("sheets_svc").unwrap();
    let record = ConnectionRecord::default();
    let err = record.client_secrets(&conn).unwrap_err();
    assert!(matches!(err, ModelError::MissingCredentials { .. }));
    assert!(err.to_string().contains("client_secrets"));
}

#[test]
fn malformed_client_secrets_are_reported() {
    let conn = ConnId::new("sheets_svc").unwrap();
    let mut record = ConnectionRecord::default();
    record
        .extra
        .insert("client_secrets".to_string(), json!("not an object"));
    let err = record.client_secrets(&conn).unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[test]
fn required_fields_name_the_gap() {
    let conn = ConnId::new("warehouse").unwrap();
    let record = ConnectionRecord {
        host: Some("db.internal".to_string()),
        ..ConnectionRecord::default()
    };
    assert_eq!(record.require(&conn, ConnField::Host).unwrap(), "db.internal");

    let err = record.require(&conn, ConnField::Port).unwrap_err();
    assert!(err.to_string().contains("\"port\""));
}

#[test]
fn store_lookup_reports_unknown_connections() {
    let mut store = InMemoryConnectionStore::new();
    store.insert(ConnId::new("warehouse").unwrap(), ConnectionRecord::default());

    assert!(store.get(&ConnId::new("warehouse").unwrap()).is_ok());
    let err = store.get(&ConnId::new("absent").unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::ConnectionNotFound(_)));

    let records = BTreeMap::from([(
        ConnId::new("sheets").unwrap(),
        ConnectionRecord::default(),
    )]);
    let seeded = InMemoryConnectionStore::from_records(records);
    assert_eq!(seeded.len(), 1);
}
