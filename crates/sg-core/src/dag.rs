//! Stage dependency graph and topological ordering

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::names::StageName;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// A directed acyclic graph of stage dependencies
#[derive(Debug, Default)]
pub struct StageDag {
    graph: DiGraph<StageName, ()>,
    node_map: HashMap<StageName, NodeIndex>,
}

impl StageDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage to the DAG
    pub fn add_stage(&mut self, name: &str) -> CoreResult<NodeIndex> {
        if let Some(&idx) = self.node_map.get(name) {
            return Ok(idx);
        }
        let stage = StageName::try_new(name).ok_or_else(|| CoreError::InvalidName {
            context: "stage name in DAG".into(),
        })?;
        let idx = self.graph.add_node(stage.clone());
        self.node_map.insert(stage, idx);
        Ok(idx)
    }

    /// Add a dependency edge (`stage` consumes `upstream`)
    pub fn add_dependency(&mut self, stage: &str, upstream: &str) -> CoreResult<()> {
        let stage_idx = self.add_stage(stage)?;
        let upstream_idx = self.add_stage(upstream)?;
        // Edge runs upstream -> stage so toposort yields producers first
        self.graph.add_edge(upstream_idx, stage_idx, ());
        Ok(())
    }

    /// Build the DAG from the project configuration
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let mut dag = Self::new();

        for raw in &config.raw_stages {
            dag.add_stage(raw)?;
        }
        for stage in &config.stages {
            dag.add_stage(&stage.name)?;
        }
        for stage in &config.stages {
            for upstream in &stage.upstream {
                dag.add_dependency(&stage.name, upstream)?;
            }
        }

        dag.validate()?;
        Ok(dag)
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        self.topological_order().map(|_| ())
    }

    /// Stages in topological order (producers first)
    pub fn topological_order(&self) -> CoreResult<Vec<StageName>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Direct upstream stages
    pub fn upstream(&self, stage: &str) -> Vec<StageName> {
        self.neighbors(stage, petgraph::Direction::Incoming)
    }

    /// Direct downstream stages
    pub fn downstream(&self, stage: &str) -> Vec<StageName> {
        self.neighbors(stage, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, stage: &str, direction: petgraph::Direction) -> Vec<StageName> {
        let Some(&idx) = self.node_map.get(stage) else {
            return Vec::new();
        };
        let mut names: Vec<StageName> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        names.sort();
        names
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the DAG has no stages
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
