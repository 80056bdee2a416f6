//! Things hostkit converges: files, links, packages, service definitions.
//!
//! Each resource reports a [`ResourceState`] before anything is touched, so
//! dry-run and drift reporting share one code path with real applies.
pub mod dotfile;
pub mod fs;
pub mod package;
pub mod service_file;
pub mod shell;
pub mod symlink;

use anyhow::Result;

/// A change hostkit knows how to make.
pub trait Applicable {
    /// Short label used in log lines, e.g. `~/.zshenv`.
    fn description(&self) -> String;

    /// Make the change, creating parent directories when needed.
    ///
    /// # Errors
    ///
    /// I/O failures and failing commands.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo [`apply`](Self::apply). Unsupported unless overridden.
    ///
    /// # Errors
    ///
    /// Always, for resources that cannot be removed.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!("cannot remove {}", self.description())
    }
}

/// What a resource looks like on the host right now.
///
/// ```
/// use hostkit_cli::resources::ResourceState;
///
/// let drift = ResourceState::Incorrect { current: "content differs".into() };
/// assert_ne!(drift, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Not present.
    Missing,
    /// Present and as desired.
    Correct,
    /// Present but different.
    Incorrect {
        /// What is there instead.
        current: String,
    },
    /// Cannot be converged, e.g. a directory where a file belongs.
    Invalid {
        /// Why not.
        reason: String,
    },
}

/// What [`Applicable::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The host was modified.
    Applied,
    /// Nothing needed doing.
    AlreadyCorrect,
}

/// An [`Applicable`] that can inspect its own state.
pub trait Resource: Applicable {
    /// Inspect the host.
    ///
    /// # Errors
    ///
    /// The state could not be read.
    fn current_state(&self) -> Result<ResourceState>;

    /// `true` when [`apply`](Applicable::apply) would do something.
    /// Invalid resources never need a change; they cannot take one.
    ///
    /// # Errors
    ///
    /// Propagates [`current_state`](Self::current_state) failures.
    fn needs_change(&self) -> Result<bool> {
        self.current_state().map(|state| {
            matches!(
                state,
                ResourceState::Missing | ResourceState::Incorrect { .. }
            )
        })
    }
}

impl<T: Applicable + ?Sized> Applicable for &T {
    fn description(&self) -> String {
        T::description(self)
    }

    fn apply(&self) -> Result<ResourceChange> {
        T::apply(self)
    }

    fn remove(&self) -> Result<ResourceChange> {
        T::remove(self)
    }
}

impl<T: Resource + ?Sized> Resource for &T {
    fn current_state(&self) -> Result<ResourceState> {
        T::current_state(self)
    }
}

/// Shared test helpers for resource and module unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(success, stdout)` responses consumed in FIFO
    /// order. When the queue is empty, calls succeed with empty output if the
    /// mock is [`permissive`](Self::permissive) and fail otherwise. Every
    /// invocation is recorded as a space-joined command line.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        permissive: bool,
        programs: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// Create a mock with a single failed response (empty stdout).
        #[must_use]
        pub fn fail() -> Self {
            Self::with_responses(vec![(false, String::new())])
        }

        /// Create a mock whose every call succeeds with empty output.
        #[must_use]
        pub fn permissive() -> Self {
            Self {
                permissive: true,
                ..Self::default()
            }
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            }
        }

        /// Succeed with empty output once the response queue is drained.
        #[must_use]
        pub const fn then_permissive(mut self) -> Self {
            self.permissive = true;
            self
        }

        /// Make [`Executor::which`] return `true` for exactly these programs.
        #[must_use]
        pub fn with_programs(mut self, programs: &[&str]) -> Self {
            self.programs = programs.iter().map(|p| (*p).to_string()).collect();
            self
        }

        /// Every command line executed so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Total number of executor calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls().len()
        }

        fn next(&self, program: &str, args: &[&str]) -> (bool, String) {
            if let Ok(mut calls) = self.calls.lock() {
                let mut line = vec![program];
                line.extend_from_slice(args);
                calls.push(line.join(" "));
            }
            self.responses.lock().map_or_else(
                |_| (false, "mutex poisoned".to_string()),
                |mut guard| {
                    guard.pop_front().unwrap_or_else(|| {
                        if self.permissive {
                            (true, String::new())
                        } else {
                            (false, "unexpected call".to_string())
                        }
                    })
                },
            )
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("mock command failed: {program}")
            }
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
            self.run(program, args).map(|_| ())
        }

        fn which(&self, program: &str) -> bool {
            self.programs.contains(program)
        }
    }
}
