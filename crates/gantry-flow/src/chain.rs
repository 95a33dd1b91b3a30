//! Dependency wiring: fan-out/fan-in brackets and linear chains.

use gantry_model::TaskNode;

use crate::error::FlowError;

/// Wires `kickoff -> each worker -> final_node`.
///
/// Workers stay mutually independent: once the kickoff node completes they
/// may run in any order or concurrently, and the final node waits for all
/// of them. Returns the nodes in registration order: kickoff, workers,
/// final.
pub fn fan_out(
    kickoff: TaskNode,
    mut workers: Vec<TaskNode>,
    mut final_node: TaskNode,
) -> Result<Vec<TaskNode>, FlowError> {
    if workers.is_empty() {
        return Err(FlowError::EmptyPipeline {
            detail: "fan-out requested with zero worker nodes".to_string(),
        });
    }
    for worker in &mut workers {
        worker.push_upstream(kickoff.id().clone());
        final_node.push_upstream(worker.id().clone());
    }
    let mut nodes = Vec::with_capacity(workers.len() + 2);
    nodes.push(kickoff);
    nodes.append(&mut workers);
    nodes.push(final_node);
    Ok(nodes)
}

/// Wires the given steps into a linear chain, in declared order.
///
/// Callers drop disabled steps before calling, so the produced edges bridge
/// across whatever was omitted. A single step is a valid chain with no
/// edges; zero steps is an error.
pub fn chain(mut steps: Vec<TaskNode>) -> Result<Vec<TaskNode>, FlowError> {
    if steps.is_empty() {
        return Err(FlowError::EmptyPipeline {
            detail: "linear chain requested with zero steps".to_string(),
        });
    }
    for at in 1..steps.len() {
        let upstream = steps[at - 1].id().clone();
        steps[at].push_upstream(upstream);
    }
    Ok(steps)
}
