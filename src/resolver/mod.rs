//! Dependency graph walking and install decisions.
//!
//! [`DependencyWalker`] guarantees that every dependency is installed after all of
//! its prerequisites and at most once per run. It walks the prerequisite graph
//! depth-first with an explicit stack of arena indices, tracking each node with a
//! three-state mark:
//!
//! - **unvisited** nodes have not been reached yet;
//! - **in-progress** nodes are on the stack, waiting for their prerequisites;
//! - **done** nodes have been installed (or found up to date).
//!
//! Reaching an in-progress node means the graph has a cycle, which is reported
//! as [`DepwrightError::CircularDependency`] with the offending chain. A
//! prerequisite key missing from the registry is
//! [`DepwrightError::UnknownPrerequisite`]. Both are fatal.
//!
//! What happens at each node is up to the [`NodeInstaller`]; the real one lives in
//! [`crate::installer`] and consults [`decision::install_reason`] first.

pub mod decision;
pub mod graph;

pub use decision::{InstallReason, install_reason, should_install};
pub use graph::DependencyGraph;

use anyhow::Result;
use std::future::Future;

use crate::core::DepwrightError;
use crate::registry::{Dependency, Registry};

/// Result of visiting one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The install strategy ran
    Installed(InstallReason),
    /// The installed copy was current
    UpToDate,
}

/// Action performed on each dependency once its prerequisites are done.
pub trait NodeInstaller {
    /// Installs `dependency` if needed.
    fn install(&mut self, dependency: &Dependency) -> impl Future<Output = Result<InstallOutcome>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Per-run walk state: one mark per registry entry plus the outcomes so far.
#[derive(Debug, Clone)]
pub struct BuildState {
    marks: Vec<Mark>,
    outcomes: Vec<(String, InstallOutcome)>,
}

impl BuildState {
    /// Fresh state with every dependency unvisited.
    #[must_use]
    pub fn new(registry: &Registry) -> Self {
        Self {
            marks: vec![Mark::Unvisited; registry.len()],
            outcomes: Vec::new(),
        }
    }

    /// Whether the dependency at `index` has been handled.
    #[must_use]
    pub fn is_done(&self, index: usize) -> bool {
        self.marks.get(index) == Some(&Mark::Done)
    }

    /// Outcomes in the order dependencies were handled.
    #[must_use]
    pub fn outcomes(&self) -> &[(String, InstallOutcome)] {
        &self.outcomes
    }
}

struct Frame<'a> {
    index: usize,
    dependency: &'a Dependency,
    next_prerequisite: usize,
}

fn cycle_chain(stack: &[Frame<'_>], repeated: usize, repeated_key: &str) -> String {
    let start = stack.iter().position(|frame| frame.index == repeated).unwrap_or(0);
    stack[start..]
        .iter()
        .map(|frame| frame.dependency.key.as_str())
        .chain(std::iter::once(repeated_key))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Walks the prerequisite graph of a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct DependencyWalker<'a> {
    registry: &'a Registry,
}

impl<'a> DependencyWalker<'a> {
    /// Creates a walker over `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
        }
    }

    /// Installs `key` after its transitive prerequisites, skipping anything
    /// already done in `state`.
    pub async fn ensure_built<I: NodeInstaller>(
        &self,
        key: &str,
        state: &mut BuildState,
        installer: &mut I,
    ) -> Result<()> {
        let (root, root_dependency) = self.registry.entry(key).ok_or_else(|| DepwrightError::ConfigError {
            message: format!("unknown dependency '{key}'"),
        })?;
        if state.marks[root] == Mark::Done {
            return Ok(());
        }

        state.marks[root] = Mark::InProgress;
        let mut stack = vec![Frame {
            index: root,
            dependency: root_dependency,
            next_prerequisite: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let index = frame.index;
            let dependency = frame.dependency;
            let next = dependency.requires.get(frame.next_prerequisite);
            if next.is_some() {
                frame.next_prerequisite += 1;
            }

            match next {
                Some(prerequisite_key) => {
                    let (prerequisite, prerequisite_dependency) =
                        self.registry.entry(prerequisite_key).ok_or_else(|| {
                            DepwrightError::UnknownPrerequisite {
                                dependency: dependency.key.clone(),
                                prerequisite: prerequisite_key.clone(),
                            }
                        })?;

                    match state.marks[prerequisite] {
                        Mark::Done => {}
                        Mark::InProgress => {
                            return Err(DepwrightError::CircularDependency {
                                chain: cycle_chain(&stack, prerequisite, prerequisite_key),
                            }
                            .into());
                        }
                        Mark::Unvisited => {
                            state.marks[prerequisite] = Mark::InProgress;
                            stack.push(Frame {
                                index: prerequisite,
                                dependency: prerequisite_dependency,
                                next_prerequisite: 0,
                            });
                        }
                    }
                }
                None => {
                    tracing::debug!("Prerequisites of '{}' are done", dependency.key);
                    let outcome = installer.install(dependency).await?;
                    state.marks[index] = Mark::Done;
                    state.outcomes.push((dependency.key.clone(), outcome));
                    stack.pop();
                }
            }
        }

        Ok(())
    }

    /// Ensures every registry entry is built, in declaration order.
    pub async fn build_all<I: NodeInstaller>(&self, state: &mut BuildState, installer: &mut I) -> Result<()> {
        self.build_where(|_| true, state, installer).await
    }

    /// Ensures the entries matching `predicate` are built, in declaration order.
    ///
    /// Prerequisites of selected entries are built whether or not they match.
    pub async fn build_where<I, P>(&self, predicate: P, state: &mut BuildState, installer: &mut I) -> Result<()>
    where
        I: NodeInstaller,
        P: Fn(&Dependency) -> bool,
    {
        for dependency in self.registry {
            if predicate(dependency) {
                self.ensure_built(&dependency.key, state, installer).await?;
            } else {
                tracing::debug!("Skipping '{}', not selected", dependency.key);
            }
        }
        Ok(())
    }
}
