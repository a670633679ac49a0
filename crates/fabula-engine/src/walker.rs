//! Graph traversal from the start sentinel to the end sentinel.
//!
//! The walker is a small state machine: at each step the current vertex's
//! bound selector (or, without one, its first registered edge) names the
//! next vertex, the edge's transition fires, and the walk advances. All
//! caller-visible side effects come from predicate/processor strategies;
//! the walker itself only invokes and advances.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fabula_core::{Graph, VertexId};

use crate::error::{EngineError, EngineResult};

/// Configuration for a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Maximum number of steps before the walk aborts.
    ///
    /// The graph itself carries no cycle guard; a misconfigured selector can
    /// orbit forever, so the bound is load-bearing.
    pub max_steps: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self { max_steps: 10_000 }
    }
}

/// Result of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOutcome {
    /// Vertices in visit order, from the start sentinel to the end sentinel.
    pub path: Vec<VertexId>,
    /// Number of edge traversals performed.
    pub steps: usize,
}

/// Walks a graph start to end, invoking bound strategies along the way.
pub struct Walker<'g> {
    graph: &'g mut Graph,
    config: WalkConfig,
}

impl<'g> Walker<'g> {
    /// Create a walker with the default configuration.
    pub fn new(graph: &'g mut Graph) -> Self {
        Self::with_config(graph, WalkConfig::default())
    }

    /// Create a walker with a custom configuration.
    pub fn with_config(graph: &'g mut Graph, config: WalkConfig) -> Self {
        Self { graph, config }
    }

    /// Run the walk to completion.
    ///
    /// Selector memory lives on the vertices, so repeated runs over the same
    /// graph continue from where the bound selectors left off.
    pub fn run(&mut self) -> EngineResult<WalkOutcome> {
        let mut current = VertexId::Start;
        let mut path = vec![current];
        let mut steps = 0;

        while current != VertexId::End {
            if steps >= self.config.max_steps {
                return Err(EngineError::StepLimitExceeded {
                    max_steps: self.config.max_steps,
                });
            }

            let next = self.choose_next(current)?;
            self.run_edge(current, next)?;
            debug!(from = %current, to = %next, "walk_step");

            path.push(next);
            current = next;
            steps += 1;
        }

        Ok(WalkOutcome { path, steps })
    }

    /// Pick the next vertex: bound selector if present, else the first edge
    /// in registration order.
    fn choose_next(&mut self, current: VertexId) -> EngineResult<VertexId> {
        let views = self.graph.edge_views(current)?;
        let vertex = self
            .graph
            .get_vertex_mut(current)
            .ok_or(EngineError::VertexNotFound { id: current })?;

        let chosen = match vertex.selector_mut() {
            Some(selector) => selector.next(&views),
            None => views.first().map(|view| view.target),
        };
        chosen.ok_or(EngineError::DeadEnd { id: current })
    }

    /// Fire the transition bound to the edge `from -> to`, if any.
    ///
    /// The processor only runs when a predicate exists and yields arguments.
    fn run_edge(&mut self, from: VertexId, to: VertexId) -> EngineResult<()> {
        let morph = self
            .graph
            .get_vertex(from)
            .and_then(|vertex| vertex.get_edge(to))
            .and_then(|edge| edge.morph.clone());
        let Some(morph) = morph else {
            return Ok(());
        };
        let Some(predicate) = &morph.predicate else {
            return Ok(());
        };

        let Some(args) = predicate.strategy.evaluate(self.graph, from, to)? else {
            return Ok(());
        };
        if let Some(processor) = &morph.processor {
            processor.strategy.process(self.graph, &args)?;
        }
        Ok(())
    }
}

/// Walk a graph start to end with the default configuration.
pub fn walk_graph(graph: &mut Graph) -> EngineResult<WalkOutcome> {
    Walker::new(graph).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fabula_core::{
        GraphResult, Predicate, Processor, Registry, StepArgs, StrategyKind,
    };
    use serde_json::json;

    /// Predicate that always suppresses the processor.
    struct NeverPredicate;

    impl Predicate for NeverPredicate {
        fn evaluate(
            &self,
            _graph: &Graph,
            _from: VertexId,
            _to: VertexId,
        ) -> GraphResult<Option<StepArgs>> {
            Ok(None)
        }
    }

    /// Processor that leaves a marker in the target vertex's metadata.
    struct MarkProcessor;

    impl Processor for MarkProcessor {
        fn process(&self, graph: &mut Graph, args: &StepArgs) -> GraphResult<()> {
            if let Some(vertex) = graph.get_vertex_mut(args.target) {
                vertex.metadata_mut().insert("marked".to_string(), json!(true));
            }
            Ok(())
        }
    }

    fn registry() -> Registry {
        Registry::builder()
            .selector("by_label", Arc::new(fabula_core::ByLabelSelector))
            .predicate("carry_step", Arc::new(fabula_core::CarryStepPredicate))
            .predicate("never", Arc::new(NeverPredicate))
            .processor("mark", Arc::new(MarkProcessor))
            .build()
    }

    fn chain_graph() -> Graph {
        let mut graph = Graph::new(1, "chain", registry());
        graph.add_vertex(VertexId::Num(1));
        graph.add_vertex(VertexId::Num(2));
        graph.add_edge(VertexId::Start, VertexId::Num(1), None, false).unwrap();
        graph.add_edge(VertexId::Num(1), VertexId::Num(2), None, false).unwrap();
        graph.add_edge(VertexId::Num(2), VertexId::End, None, false).unwrap();
        graph
    }

    #[test]
    fn test_linear_chain_walk() {
        let mut graph = chain_graph();
        let outcome = walk_graph(&mut graph).unwrap();

        assert_eq!(
            outcome.path,
            vec![
                VertexId::Start,
                VertexId::Num(1),
                VertexId::Num(2),
                VertexId::End
            ]
        );
        assert_eq!(outcome.steps, 3);
    }

    #[test]
    fn test_tie_break_takes_first_registered_edge() {
        let mut graph = Graph::new(1, "fork", registry());
        graph.add_vertex(VertexId::Num(1));
        graph.add_vertex(VertexId::Num(2));
        // Two edges, no selector: the first registered edge wins.
        graph.add_edge(VertexId::Start, VertexId::Num(2), None, false).unwrap();
        graph.add_edge(VertexId::Start, VertexId::Num(1), None, false).unwrap();
        graph.add_edge(VertexId::Num(2), VertexId::End, None, false).unwrap();
        graph.add_edge(VertexId::Num(1), VertexId::End, None, false).unwrap();

        let outcome = walk_graph(&mut graph).unwrap();
        assert_eq!(outcome.path[1], VertexId::Num(2));
    }

    #[test]
    fn test_selector_steers_walk() {
        let mut graph = Graph::new(1, "fork", registry());
        graph.add_vertex_with(VertexId::Num(1), Some("zulu".to_string()), Default::default());
        graph.add_vertex_with(VertexId::Num(2), Some("alpha".to_string()), Default::default());
        graph.add_edge(VertexId::Start, VertexId::Num(1), None, false).unwrap();
        graph.add_edge(VertexId::Start, VertexId::Num(2), None, false).unwrap();
        graph.add_edge(VertexId::Num(1), VertexId::End, None, false).unwrap();
        graph.add_edge(VertexId::Num(2), VertexId::End, None, false).unwrap();

        graph.add_func_desc("sel", StrategyKind::Selection, "by_label");
        graph.set_selector(VertexId::Start, "sel").unwrap();

        // "alpha" sorts before "zulu", regardless of registration order.
        let outcome = walk_graph(&mut graph).unwrap();
        assert_eq!(outcome.path[1], VertexId::Num(2));
    }

    #[test]
    fn test_suppressed_predicate_skips_processor() {
        let mut graph = chain_graph();
        graph.add_func_desc("pred", StrategyKind::Predicate, "never");
        graph.add_func_desc("proc", StrategyKind::Processor, "mark");
        graph.add_transition("gate", Some("proc"), Some("pred"));
        graph
            .add_edge(VertexId::Num(1), VertexId::Num(2), Some("gate"), false)
            .unwrap();

        walk_graph(&mut graph).unwrap();

        // The predicate returned None, so the marker never appeared.
        let target = graph.get_vertex(VertexId::Num(2)).unwrap();
        assert!(!target.metadata().contains_key("marked"));
    }

    #[test]
    fn test_passing_predicate_runs_processor() {
        let mut graph = chain_graph();
        graph.add_func_desc("pred", StrategyKind::Predicate, "carry_step");
        graph.add_func_desc("proc", StrategyKind::Processor, "mark");
        graph.add_transition("gate", Some("proc"), Some("pred"));
        graph
            .add_edge(VertexId::Num(1), VertexId::Num(2), Some("gate"), false)
            .unwrap();

        walk_graph(&mut graph).unwrap();

        let target = graph.get_vertex(VertexId::Num(2)).unwrap();
        assert_eq!(target.metadata().get("marked"), Some(&json!(true)));
    }

    #[test]
    fn test_processor_without_predicate_is_inert() {
        let mut graph = chain_graph();
        graph.add_func_desc("proc", StrategyKind::Processor, "mark");
        graph.add_transition("bare", Some("proc"), None);
        graph
            .add_edge(VertexId::Num(1), VertexId::Num(2), Some("bare"), false)
            .unwrap();

        walk_graph(&mut graph).unwrap();

        let target = graph.get_vertex(VertexId::Num(2)).unwrap();
        assert!(!target.metadata().contains_key("marked"));
    }

    #[test]
    fn test_step_limit_on_cycle() {
        let mut graph = Graph::new(1, "orbit", registry());
        graph.add_vertex(VertexId::Num(1));
        graph.add_vertex(VertexId::Num(2));
        graph.add_edge(VertexId::Start, VertexId::Num(1), None, false).unwrap();
        graph.add_edge(VertexId::Num(1), VertexId::Num(2), None, false).unwrap();
        graph.add_edge(VertexId::Num(2), VertexId::Num(1), None, false).unwrap();

        let result = Walker::with_config(&mut graph, WalkConfig { max_steps: 25 }).run();
        assert!(matches!(
            result,
            Err(EngineError::StepLimitExceeded { max_steps: 25 })
        ));
    }

    #[test]
    fn test_dead_end_is_typed() {
        let mut graph = Graph::new(1, "stub", registry());
        graph.add_vertex(VertexId::Num(1));
        graph.add_edge(VertexId::Start, VertexId::Num(1), None, false).unwrap();

        let result = walk_graph(&mut graph);
        assert!(matches!(result, Err(EngineError::DeadEnd { .. })));
    }
}
