//! Renders assembled workflows as terminal tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use gantry_model::{TaskId, TaskNode, Workflow};

pub fn print_plan(workflows: &[Workflow]) {
    let mut total_tasks = 0usize;
    for workflow in workflows {
        print_workflow(workflow);
        total_tasks += workflow.nodes().len();
        println!();
    }
    println!("{} workflows, {} tasks", workflows.len(), total_tasks);
}

fn print_workflow(workflow: &Workflow) {
    let schedule = workflow.schedule();
    println!("Workflow: {}", workflow.name());
    println!(
        "Schedule: {} (start {}, max {} active)",
        schedule.describe(),
        schedule.start_date,
        schedule.max_active_runs
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Task"),
        header_cell("Kind"),
        header_cell("Upstream"),
        header_cell("Detail"),
    ]);
    apply_plan_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    // Topological order reads top to bottom the way the engine runs it
    for id in workflow.topo_order() {
        let Some(node) = workflow.node(&id) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(node.id().as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            kind_cell(node),
            upstream_cell(node),
            Cell::new(node.unit().summary()),
        ]);
    }
    println!("{table}");
}

fn apply_plan_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(32)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Fixed(36)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_cell(node: &TaskNode) -> Cell {
    let kind = node.unit().kind();
    match kind {
        "sql" => Cell::new(kind).fg(Color::Blue),
        "sql_sensor" => Cell::new(kind).fg(Color::Magenta),
        "shell" => Cell::new(kind).fg(Color::Yellow),
        _ => Cell::new(kind).fg(Color::Green),
    }
}

fn upstream_cell(node: &TaskNode) -> Cell {
    if node.upstream().is_empty() {
        return dim_cell("-");
    }
    let joined = node
        .upstream()
        .iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Cell::new(joined)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
