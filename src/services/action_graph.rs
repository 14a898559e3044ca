use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Action;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Graph queries over a set of actions: cycle detection, validation, depth.
///
/// The scheduler does not require a valid graph; this is used for
/// diagnostics (naming the cycle behind a deadlock) and by callers that
/// want to reject bad plans up front.
#[derive(Debug, Clone, Default)]
pub struct ActionGraph;

// Standalone helper for cycle detection (no self needed)
fn detect_cycle_util(
    node: Uuid,
    graph: &HashMap<Uuid, Vec<Uuid>>,
    visited: &mut HashSet<Uuid>,
    rec_stack: &mut HashSet<Uuid>,
    path: &mut Vec<Uuid>,
) -> bool {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(&node) {
        for &neighbor in neighbors {
            if !visited.contains(&neighbor) {
                if detect_cycle_util(neighbor, graph, visited, rec_stack, path) {
                    return true;
                }
            } else if rec_stack.contains(&neighbor) {
                if let Some(cycle_start) = path.iter().position(|&id| id == neighbor) {
                    path.drain(0..cycle_start);
                    path.push(neighbor);
                    return true;
                }
            }
        }
    }

    rec_stack.remove(&node);
    path.pop();
    false
}

impl ActionGraph {
    /// Create a graph analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Check that every dependency names an action in the set
    pub fn validate_dependencies(&self, actions: &[Action]) -> DomainResult<()> {
        let ids: HashSet<Uuid> = actions.iter().map(|a| a.id).collect();
        for action in actions {
            for dep in &action.depends_on {
                if !ids.contains(dep) {
                    return Err(DomainError::UnknownDependency {
                        action: action.id,
                        dependency: *dep,
                    });
                }
            }
        }
        Ok(())
    }

    /// Find a dependency cycle, returned as a closed path (`A -> B -> A`)
    pub fn detect_cycle(&self, actions: &[Action]) -> Option<Vec<Uuid>> {
        let mut graph: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

        // Edges point from an action to the actions it depends on.
        // Sorted so the reported cycle is stable for a given input.
        let mut ordered: Vec<&Action> = actions.iter().collect();
        ordered.sort_by_key(|a| a.id);
        for action in &ordered {
            graph
                .entry(action.id)
                .or_default()
                .extend(action.depends_on.iter().copied());
        }

        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for action in &ordered {
            if !visited.contains(&action.id)
                && detect_cycle_util(action.id, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Some(path);
            }
        }

        None
    }

    /// Validate dependencies and reject cycles
    pub fn validate(&self, actions: &[Action]) -> DomainResult<()> {
        self.validate_dependencies(actions)?;
        if let Some(cycle) = self.detect_cycle(actions) {
            return Err(DomainError::DependencyCycle(cycle));
        }
        Ok(())
    }

    /// Length of the longest dependency chain, counted in actions.
    ///
    /// An acyclic set runs in at most this many waves. Unknown dependencies
    /// are ignored.
    pub fn depth(&self, actions: &[Action]) -> DomainResult<usize> {
        let action_map: HashMap<Uuid, &Action> = actions.iter().map(|a| (a.id, a)).collect();
        let mut memo: HashMap<Uuid, usize> = HashMap::new();
        let mut max_depth = 0;
        for action in actions {
            let mut visiting = HashSet::new();
            let depth = depth_recursive(action, &action_map, &mut visiting, &mut memo)?;
            max_depth = max_depth.max(depth);
        }
        Ok(max_depth)
    }
}

// Standalone helper for depth calculation
fn depth_recursive(
    action: &Action,
    action_map: &HashMap<Uuid, &Action>,
    visiting: &mut HashSet<Uuid>,
    memo: &mut HashMap<Uuid, usize>,
) -> DomainResult<usize> {
    if let Some(&depth) = memo.get(&action.id) {
        return Ok(depth);
    }
    if !visiting.insert(action.id) {
        return Err(DomainError::DependencyCycle(vec![action.id, action.id]));
    }

    let mut deepest = 0;
    for dep_id in &action.depends_on {
        if let Some(&dep) = action_map.get(dep_id) {
            deepest = deepest.max(depth_recursive(dep, action_map, visiting, memo)?);
        }
    }

    visiting.remove(&action.id);
    let depth = deepest + 1;
    memo.insert(action.id, depth);
    Ok(depth)
}
