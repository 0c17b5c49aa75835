//! Dependency resolution over the include / explicit-dependency graph

use crate::error::{Relation, SynthError};
use crate::metadata::{MetadataCache, MetadataSource};
use crate::model::{EdgeKind, SourceFile};
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Computes link sets for entry points.
///
/// The union graph is never stored; each query walks it on demand, with only
/// the per-file direct edges memoized in the owned [`MetadataCache`].
#[derive(Debug)]
pub struct DependencyResolver {
    cache: MetadataCache,
}

impl DependencyResolver {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        DependencyResolver {
            cache: MetadataCache::new(source),
        }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// The files that must be compiled and linked together with `entry`,
    /// sorted by path.
    ///
    /// Include edges are followed but their targets are not added; explicit
    /// dependencies are both followed and added. The visited set makes this
    /// safe on cyclic graphs.
    pub fn closure(&self, entry: &SourceFile) -> Result<Vec<SourceFile>, SynthError> {
        let mut queue = VecDeque::from([entry.clone()]);
        let mut seen: HashSet<SourceFile> = HashSet::from([entry.clone()]);
        let mut deps: BTreeSet<SourceFile> = BTreeSet::from([entry.clone()]);

        while let Some(file) = queue.pop_front() {
            let scanned = self.cache.get(&file).map_err(|source| SynthError::Scan {
                relation: Relation::Include,
                entry: entry.clone(),
                source,
            })?;
            for next in &scanned.includes {
                if seen.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
            for next in &scanned.explicit_deps {
                if seen.insert(next.clone()) {
                    deps.insert(next.clone());
                    queue.push_back(next.clone());
                }
            }
        }

        tracing::debug!("Closure of {}: {} file(s)", entry, deps.len());
        Ok(deps.into_iter().collect())
    }

    /// Resolve several entry points in parallel. Results keep input order,
    /// and on failure the error of the first failing entry is returned.
    pub fn closures(
        &self,
        entries: &[SourceFile],
    ) -> Result<Vec<Vec<SourceFile>>, SynthError> {
        let results: Vec<Result<Vec<SourceFile>, SynthError>> = entries
            .par_iter()
            .map(|entry| self.closure(entry))
            .collect();
        results.into_iter().collect()
    }

    /// Materialize everything reachable from `entry` as a graph, for
    /// inspection. Node weights are files, edge weights the relation.
    pub fn reachable_graph(
        &self,
        entry: &SourceFile,
    ) -> Result<DiGraph<SourceFile, EdgeKind>, SynthError> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<SourceFile, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([entry.clone()]);
        index.insert(entry.clone(), graph.add_node(entry.clone()));

        while let Some(file) = queue.pop_front() {
            let scanned = self.cache.get(&file).map_err(|source| SynthError::Scan {
                relation: Relation::Include,
                entry: entry.clone(),
                source,
            })?;
            let from = index[&file];
            let edges = scanned
                .includes
                .iter()
                .map(|f| (f, EdgeKind::Include))
                .chain(scanned.explicit_deps.iter().map(|f| (f, EdgeKind::Explicit)));
            for (next, kind) in edges {
                let to = match index.get(next) {
                    Some(&idx) => idx,
                    None => {
                        let idx = graph.add_node(next.clone());
                        index.insert(next.clone(), idx);
                        queue.push_back(next.clone());
                        idx
                    }
                };
                graph.add_edge(from, to, kind);
            }
        }

        Ok(graph)
    }
}

/// Render a dependency graph in Graphviz DOT, labelled by path and relation.
pub fn to_dot(graph: &DiGraph<SourceFile, EdgeKind>) -> String {
    format!("{}", Dot::new(graph))
}
