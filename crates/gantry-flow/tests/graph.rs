use serde_json::json;

use gantry_flow::{FlowError, FullRefreshSpec, chain, fan_out, full_refresh_workflow};
use gantry_model::{
    ConnId, ConnectionRecord, ExtractOperator, InMemoryConnectionStore, RefreshStrategy,
    TableTarget, TaskId, TaskNode, WorkUnit,
};
use gantry_sheets::SheetsOperator;

fn id(value: &str) -> TaskId {
    TaskId::new(value).unwrap()
}

fn sql_node(task: &str) -> TaskNode {
    TaskNode::new(
        id(task),
        WorkUnit::Sql {
            conn: ConnId::new("warehouse").unwrap(),
            sql: format!("SELECT '{task}';"),
        },
    )
}

#[test]
fn fan_out_wires_kickoff_to_every_worker_to_final() {
    let nodes = fan_out(
        sql_node("kickoff"),
        vec![sql_node("w1"), sql_node("w2"), sql_node("w3")],
        sql_node("final"),
    )
    .unwrap();

    let order: Vec<&str> = nodes.iter().map(|node| node.id().as_str()).collect();
    assert_eq!(order, vec!["kickoff", "w1", "w2", "w3", "final"]);

    assert!(nodes[0].upstream().is_empty());
    for worker in &nodes[1..4] {
        assert_eq!(worker.upstream(), &[id("kickoff")]);
    }
    assert_eq!(nodes[4].upstream(), &[id("w1"), id("w2"), id("w3")]);
}

#[test]
fn fan_out_with_zero_workers_is_an_error() {
    let err = fan_out(sql_node("kickoff"), Vec::new(), sql_node("final")).unwrap_err();
    assert!(matches!(err, FlowError::EmptyPipeline { .. }));
}

#[test]
fn chain_links_present_steps_in_order() {
    // "run" and "docs" enabled, "seed" and "test" omitted: the edge bridges
    // straight from run to docs.
    let steps = chain(vec![sql_node("run"), sql_node("docs")]).unwrap();
    assert!(steps[0].upstream().is_empty());
    assert_eq!(steps[1].upstream(), &[id("run")]);

    let single = chain(vec![sql_node("only")]).unwrap();
    assert!(single[0].upstream().is_empty());
}

#[test]
fn chain_with_zero_steps_is_an_error() {
    let err = chain(Vec::new()).unwrap_err();
    assert!(matches!(err, FlowError::EmptyPipeline { .. }));
}

fn sheets_store() -> InMemoryConnectionStore {
    let mut store = InMemoryConnectionStore::new();
    let record: ConnectionRecord = serde_json::from_value(json!({
        "extra": { "client_secrets": { "type": "service_account" } }
    }))
    .unwrap();
    store.insert(ConnId::new("sheets_svc").unwrap(), record);
    store
}

fn refresh_spec(tables: serde_json::Value) -> FullRefreshSpec {
    serde_json::from_value(json!({
        "name": "crm_sheets_daily",
        "schedule": { "start_date": "2024-01-01", "interval": { "days": 1 } },
        "engine": "postgres",
        "warehouse_conn": "warehouse",
        "target_schema": "analytics",
        "read_right_users": ["looker"],
        "defaults": { "start_row": 4 },
        "general_config": { "workbook_key": "wb-1" },
        "tables": tables
    }))
    .unwrap()
}

#[test]
fn full_refresh_workflow_brackets_parallel_extract_tasks() {
    let store = sheets_store();
    let operator = SheetsOperator::new(ConnId::new("sheets_svc").unwrap(), &store).unwrap();
    let spec = refresh_spec(json!({
        "customers": {
            "sheet_key": "Customers",
            "columns": { "id": { "position": "A" } }
        },
        "orders": {
            "workbook_key": "wb-2",
            "sheet_key": "Orders",
            "start_row": 2,
            "columns": { "id": { "position": 1 }, "amount": { "position": "B" } }
        }
    }));

    let workflow = full_refresh_workflow(&spec, &operator).unwrap();
    assert_eq!(workflow.name(), "crm_sheets_daily");

    let task_ids: Vec<&str> = workflow
        .nodes()
        .iter()
        .map(|node| node.id().as_str())
        .collect();
    assert_eq!(
        task_ids,
        vec!["kickoff", "extract_load_customers", "extract_load_orders", "final"]
    );

    let edges = workflow.edges();
    assert_eq!(edges.len(), 4);
    assert!(edges.contains(&(id("kickoff"), id("extract_load_customers"))));
    assert!(edges.contains(&(id("extract_load_orders"), id("final"))));

    // Layers resolved: general workbook with per-table override, pipeline
    // default start_row unless the table sets its own.
    let Some(WorkUnit::SheetExtract {
        workbook_key,
        start_row,
        target_schema,
        ..
    }) = workflow
        .node(&id("extract_load_customers"))
        .map(TaskNode::unit)
    else {
        panic!("customers worker must be a sheet_extract unit");
    };
    assert_eq!(workbook_key, "wb-1");
    assert_eq!(*start_row, 4);
    assert_eq!(target_schema, "analytics_next");

    let Some(WorkUnit::SheetExtract {
        workbook_key,
        start_row,
        ..
    }) = workflow.node(&id("extract_load_orders")).map(TaskNode::unit)
    else {
        panic!("orders worker must be a sheet_extract unit");
    };
    assert_eq!(workbook_key, "wb-2");
    assert_eq!(*start_row, 2);

    // The final task grants the configured reader on the live schema.
    let Some(WorkUnit::Sql { sql, .. }) = workflow.node(&id("final")).map(TaskNode::unit) else {
        panic!("final must be a sql unit");
    };
    assert!(sql.contains("GRANT USAGE ON SCHEMA \"analytics\" TO \"looker\";"));
}

#[test]
fn topological_order_brackets_the_workers() {
    let store = sheets_store();
    let operator = SheetsOperator::new(ConnId::new("sheets_svc").unwrap(), &store).unwrap();
    let spec = refresh_spec(json!({
        "customers": {
            "sheet_key": "Customers",
            "columns": { "id": { "position": "A" } }
        },
        "orders": {
            "sheet_key": "Orders",
            "columns": { "id": { "position": 1 } }
        }
    }));

    let workflow = full_refresh_workflow(&spec, &operator).unwrap();
    let topo = workflow.topo_order();
    let position = |task: &str| {
        topo.iter()
            .position(|task_id| task_id.as_str() == task)
            .unwrap()
    };

    for worker in ["extract_load_customers", "extract_load_orders"] {
        assert!(position("kickoff") < position(worker));
        assert!(position(worker) < position("final"));
    }
}

#[test]
fn full_refresh_rejects_zero_tables() {
    let store = sheets_store();
    let operator = SheetsOperator::new(ConnId::new("sheets_svc").unwrap(), &store).unwrap();
    let spec = refresh_spec(json!({}));
    let err = full_refresh_workflow(&spec, &operator).unwrap_err();
    assert!(matches!(err, FlowError::EmptyPipeline { .. }));
}

#[test]
fn full_refresh_reports_defective_table_config() {
    let store = sheets_store();
    let operator = SheetsOperator::new(ConnId::new("sheets_svc").unwrap(), &store).unwrap();
    let spec = refresh_spec(json!({
        "customers": {
            "sheet_key": "Customers",
            "columns": { "id": { "position": "1a" } }
        }
    }));
    let err = full_refresh_workflow(&spec, &operator).unwrap_err();
    assert!(matches!(err, FlowError::TableConfig { ref table, .. } if table == "customers"));
}

struct IncrementalStub;

impl ExtractOperator for IncrementalStub {
    fn source_kind(&self) -> &'static str {
        "incremental_stub"
    }

    fn refresh_strategy(&self) -> RefreshStrategy {
        RefreshStrategy::Incremental
    }

    fn extract_unit(
        &self,
        _target: &TableTarget,
        _config: &serde_json::Value,
    ) -> anyhow::Result<WorkUnit> {
        anyhow::bail!("never reached")
    }
}

#[test]
fn incremental_operators_cannot_serve_full_refresh() {
    let spec = refresh_spec(json!({
        "customers": { "sheet_key": "Customers", "columns": {} }
    }));
    let err = full_refresh_workflow(&spec, &IncrementalStub).unwrap_err();
    assert!(matches!(
        err,
        FlowError::FullRefreshUnsupported { ref operator } if operator == "incremental_stub"
    ));
}
