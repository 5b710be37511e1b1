//! At-most-once execution of named tasks with declared prerequisites.
//!
//! A [`TaskGraph`] owns the invocation record for one run: the set of tasks
//! that already completed and the stack of tasks currently executing. Task
//! bodies live behind the [`TaskSet`] trait and declare prerequisites by calling
//! [`TaskGraph::require`] on the graph they are handed, so traversal is
//! depth-first in declaration order.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use anyhow::Result;
use thiserror::Error;

/// Errors raised by the graph itself (as opposed to the tasks it runs).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("cyclic task dependency: {chain}")]
    Cycle { chain: String },
}

/// A family of named tasks that can be executed by a [`TaskGraph`].
pub trait TaskSet {
    type Task: Copy + Eq + Hash + fmt::Display;

    /// Run the body of `task`. Prerequisites are declared with `graph.require`.
    fn execute(&mut self, task: Self::Task, graph: &mut TaskGraph<Self::Task>) -> Result<()>;
}

/// Invocation record for a single run.
#[derive(Debug, Clone)]
pub struct TaskGraph<T> {
    completed: HashSet<T>,
    in_progress: Vec<T>,
    history: Vec<T>,
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self {
            completed: HashSet::new(),
            in_progress: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl<T> TaskGraph<T>
where
    T: Copy + Eq + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point for a directly invoked task.
    pub fn run<S>(&mut self, tasks: &mut S, task: T) -> Result<()>
    where
        S: TaskSet<Task = T>,
    {
        self.require(tasks, task)
    }

    /// Ensure `task` has run, executing it now if it has not.
    ///
    /// Completed tasks are skipped. A failing task is not recorded and its error
    /// is returned untouched so the caller can abort with the failing task's message.
    pub fn require<S>(&mut self, tasks: &mut S, task: T) -> Result<()>
    where
        S: TaskSet<Task = T>,
    {
        if self.completed.contains(&task) {
            return Ok(());
        }
        if let Some(pos) = self.in_progress.iter().position(|active| *active == task) {
            let chain = self.in_progress[pos..]
                .iter()
                .chain(std::iter::once(&task))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(GraphError::Cycle { chain }.into());
        }

        self.in_progress.push(task);
        let result = tasks.execute(task, self);
        self.in_progress.pop();
        result?;

        self.completed.insert(task);
        self.history.push(task);
        Ok(())
    }

    pub fn is_completed(&self, task: T) -> bool {
        self.completed.contains(&task)
    }

    /// Completed tasks in completion order.
    pub fn history(&self) -> &[T] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;

    /// Tasks keyed by name with static prerequisite lists.
    struct Declared {
        deps: HashMap<&'static str, Vec<&'static str>>,
        failing: HashSet<&'static str>,
        started: Vec<&'static str>,
    }

    impl Declared {
        fn new(edges: &[(&'static str, &[&'static str])]) -> Self {
            Self {
                deps: edges
                    .iter()
                    .map(|(task, deps)| (*task, deps.to_vec()))
                    .collect(),
                failing: HashSet::new(),
                started: Vec::new(),
            }
        }

        fn fail(mut self, task: &'static str) -> Self {
            self.failing.insert(task);
            self
        }

        fn count(&self, task: &str) -> usize {
            self.started.iter().filter(|t| **t == task).count()
        }
    }

    impl TaskSet for Declared {
        type Task = &'static str;

        fn execute(&mut self, task: &'static str, graph: &mut TaskGraph<&'static str>) -> Result<()> {
            let deps = self.deps.get(task).cloned().unwrap_or_default();
            for dep in deps {
                graph.require(self, dep)?;
            }
            self.started.push(task);
            if self.failing.contains(task) {
                return Err(anyhow!("{task} exploded"));
            }
            Ok(())
        }
    }

    #[test]
    fn diamond_runs_shared_dependency_once() {
        let mut tasks = Declared::new(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &["d"])]);
        let mut graph = TaskGraph::new();
        graph.run(&mut tasks, "a").expect("run");

        assert_eq!(tasks.count("d"), 1);
        assert_eq!(graph.history(), &["d", "b", "c", "a"]);
    }

    #[test]
    fn dependencies_run_depth_first_in_declaration_order() {
        let mut tasks = Declared::new(&[("top", &["x", "y"]), ("x", &["x1", "x2"]), ("y", &["y1"])]);
        let mut graph = TaskGraph::new();
        graph.run(&mut tasks, "top").expect("run");

        assert_eq!(tasks.started, vec!["x1", "x2", "x", "y1", "y", "top"]);
    }

    #[test]
    fn failing_dependency_stops_dependents_with_its_message() {
        let mut tasks =
            Declared::new(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &[])]).fail("d");
        let mut graph = TaskGraph::new();
        let err = graph.run(&mut tasks, "a").expect_err("should fail");

        assert_eq!(err.to_string(), "d exploded");
        assert_eq!(format!("{err:#}"), "d exploded");
        assert_eq!(tasks.started, vec!["d"]);
        assert!(!graph.is_completed("b"));
        assert!(!graph.is_completed("a"));
        assert!(graph.history().is_empty());
    }

    #[test]
    fn rerunning_a_completed_task_is_a_no_op() {
        let mut tasks = Declared::new(&[("a", &[])]);
        let mut graph = TaskGraph::new();
        graph.run(&mut tasks, "a").expect("first");
        graph.run(&mut tasks, "a").expect("second");

        assert_eq!(tasks.count("a"), 1);
    }

    #[test]
    fn independent_graphs_do_not_share_state() {
        let mut tasks = Declared::new(&[("a", &[])]);
        let mut first = TaskGraph::new();
        let mut second = TaskGraph::new();
        first.run(&mut tasks, "a").expect("first");
        second.run(&mut tasks, "a").expect("second");

        assert_eq!(tasks.count("a"), 2);
    }

    #[test]
    fn cycle_fails_fast_with_chain() {
        let mut tasks = Declared::new(&[("a", &["b"]), ("b", &["c"]), ("c", &["b"])]);
        let mut graph = TaskGraph::new();
        let err = graph.run(&mut tasks, "a").expect_err("cycle");

        assert_eq!(
            err.downcast_ref::<GraphError>(),
            Some(&GraphError::Cycle {
                chain: "b -> c -> b".to_string()
            })
        );
        assert!(tasks.started.is_empty());
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut tasks = Declared::new(&[("a", &["a"])]);
        let mut graph = TaskGraph::new();
        let err = graph.run(&mut tasks, "a").expect_err("cycle");
        assert_eq!(err.to_string(), "cyclic task dependency: a -> a");
    }
}
