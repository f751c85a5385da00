//! Algorithm Orchestrator (§4.G) — a registry of typed algorithm descriptors
//! plus dispatch and metrics. The algorithms themselves (merge sort,
//! knapsack, N-queens, …) are implementation details out of scope; this
//! module specifies only recommendation, dispatch and execution history.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse algorithmic family a registered solver belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmFamily {
    DivideAndConquer,
    DynamicProgramming,
    Backtracking,
    Greedy,
    Csp,
    Other,
}

/// A task descriptor the orchestrator matches algorithms against.
#[derive(Debug, Clone, Default)]
pub struct TaskDescriptor {
    pub task_type: String,
    pub requirements: Vec<String>,
}

impl TaskDescriptor {
    pub fn new(task_type: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    fn haystack(&self) -> String {
        format!("{} {}", self.task_type, self.requirements.join(" ")).to_lowercase()
    }
}

/// A registered algorithm: its identity, declared shape, and the keywords
/// `recommend` matches a [`TaskDescriptor`] against.
#[derive(Debug, Clone)]
pub struct AlgorithmDescriptor {
    pub name: String,
    pub family: AlgorithmFamily,
    pub input_schema: Value,
    pub output_shape: String,
    pub keywords: Vec<String>,
}

impl AlgorithmDescriptor {
    pub fn new(name: impl Into<String>, family: AlgorithmFamily, keywords: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            family,
            input_schema: Value::Null,
            output_shape: String::new(),
            keywords: keywords.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_output_shape(mut self, shape: impl Into<String>) -> Self {
        self.output_shape = shape.into();
        self
    }

    /// Fraction of this descriptor's keywords present in the haystack.
    fn match_score(&self, haystack: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }
        let hits = self
            .keywords
            .iter()
            .filter(|kw| haystack.contains(kw.as_str()))
            .count();
        hits as f64 / self.keywords.len() as f64
    }
}

/// A keyword-matched recommendation, confidence in (0, 1].
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub algorithm: String,
    pub confidence: f64,
}

/// One past dispatch, appended to the orchestrator's execution history.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub algorithm: String,
    pub task_type: String,
    pub success: bool,
}

/// Registry of typed algorithm descriptors plus dispatch and history.
#[derive(Default)]
pub struct AlgorithmOrchestrator {
    descriptors: HashMap<String, AlgorithmDescriptor>,
    history: Vec<ExecutionRecord>,
}

impl AlgorithmOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: AlgorithmDescriptor) {
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&AlgorithmDescriptor> {
        self.descriptors.get(name)
    }

    pub fn history(&self) -> &[ExecutionRecord] {
        &self.history
    }

    /// Best-fit algorithm by keyword match over task type and requirements.
    /// Ties break on registration-stable name order for determinism.
    pub fn recommend(&self, task: &TaskDescriptor) -> Option<Recommendation> {
        let haystack = task.haystack();
        let mut best: Option<(&str, f64)> = None;
        let mut names: Vec<&String> = self.descriptors.keys().collect();
        names.sort();

        for name in names {
            let descriptor = &self.descriptors[name];
            let score = descriptor.match_score(&haystack);
            if score <= 0.0 {
                continue;
            }
            if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
                best = Some((name, score));
            }
        }

        best.map(|(name, score)| Recommendation {
            algorithm: name.to_string(),
            confidence: score.clamp(f64::EPSILON, 1.0),
        })
    }

    /// Recommend then dispatch via the caller-supplied execution closure
    /// (the solvers themselves are out of scope, §4.G).
    pub fn execute_with_best<F>(&mut self, task: &TaskDescriptor, dispatch: F) -> Option<Value>
    where
        F: FnOnce(&str) -> Result<Value, Value>,
    {
        let recommendation = self.recommend(task)?;
        let outcome = dispatch(&recommendation.algorithm);
        let success = outcome.is_ok();
        self.history.push(ExecutionRecord {
            algorithm: recommendation.algorithm,
            task_type: task.task_type.clone(),
            success,
        });
        outcome.ok()
    }

    /// Run multiple named algorithms on the same input, returning a map of
    /// per-algorithm results.
    pub fn compare<F>(&mut self, task: &TaskDescriptor, keys: &[&str], mut dispatch: F) -> HashMap<String, Value>
    where
        F: FnMut(&str) -> Result<Value, Value>,
    {
        let mut results = HashMap::new();
        for key in keys {
            if !self.descriptors.contains_key(*key) {
                continue;
            }
            let outcome = dispatch(key);
            let success = outcome.is_ok();
            self.history.push(ExecutionRecord {
                algorithm: key.to_string(),
                task_type: task.task_type.clone(),
                success,
            });
            results.insert(key.to_string(), outcome.unwrap_or_else(|e| e));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> AlgorithmOrchestrator {
        let mut orchestrator = AlgorithmOrchestrator::new();
        orchestrator.register(AlgorithmDescriptor::new(
            "merge_sort",
            AlgorithmFamily::DivideAndConquer,
            vec!["sort", "ordering"],
        ));
        orchestrator.register(AlgorithmDescriptor::new(
            "knapsack",
            AlgorithmFamily::DynamicProgramming,
            vec!["knapsack", "capacity", "optimization"],
        ));
        orchestrator.register(AlgorithmDescriptor::new(
            "n_queens",
            AlgorithmFamily::Backtracking,
            vec!["queens", "placement", "constraint"],
        ));
        orchestrator
    }

    #[test]
    fn recommend_matches_keywords() {
        let orchestrator = sample_registry();
        let task = TaskDescriptor::new("sort a list").with_requirement("ordering");
        let recommendation = orchestrator.recommend(&task).unwrap();
        assert_eq!(recommendation.algorithm, "merge_sort");
        assert!(recommendation.confidence > 0.0);
    }

    #[test]
    fn recommend_returns_none_with_no_keyword_overlap() {
        let orchestrator = sample_registry();
        let task = TaskDescriptor::new("completely unrelated");
        assert!(orchestrator.recommend(&task).is_none());
    }

    #[test]
    fn execute_with_best_appends_history() {
        let mut orchestrator = sample_registry();
        let task = TaskDescriptor::new("sort").with_requirement("ordering");
        let result = orchestrator.execute_with_best(&task, |name| Ok(serde_json::json!({"ran": name})));
        assert!(result.is_some());
        assert_eq!(orchestrator.history().len(), 1);
        assert!(orchestrator.history()[0].success);
    }

    #[test]
    fn compare_runs_every_requested_key() {
        let mut orchestrator = sample_registry();
        let task = TaskDescriptor::new("any");
        let results = orchestrator.compare(&task, &["merge_sort", "knapsack", "missing"], |name| {
            Ok(serde_json::json!({"name": name}))
        });
        assert_eq!(results.len(), 2);
        assert_eq!(orchestrator.history().len(), 2);
    }
}
