//! CCS terms.
//!
//! Names are validated on construction: action and synchronisation names
//! start with a lowercase letter, process constants with an uppercase one.
//! [`Summation`] and [`Composition`] always hold at least two operands.
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::net::NetError;

static ACTION_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9_]*$").unwrap());
static CONSTANT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CcsError {
    #[error("{0:?} is not an action name (must start with a lowercase letter)")]
    InvalidActionName(String),
    #[error("{0:?} is not a process constant (must start with an uppercase letter)")]
    InvalidConstantName(String),
    #[error("{operator} needs at least two operands, got {count}")]
    TooFewOperands { operator: &'static str, count: usize },
}

impl From<CcsError> for NetError {
    fn from(err: CcsError) -> Self {
        NetError::InvalidArgument(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionName(String);

impl ActionName {
    pub fn new(name: impl Into<String>) -> Result<Self, CcsError> {
        let name = name.into();
        if ACTION_NAME.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(CcsError::InvalidActionName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstantName(String);

impl ConstantName {
    pub fn new(name: impl Into<String>) -> Result<Self, CcsError> {
        let name = name.into();
        if CONSTANT_NAME.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(CcsError::InvalidConstantName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConstantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// `a?`
    Input(ActionName),
    /// `a!`
    Co(ActionName),
    /// `τ`
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    pub action: Action,
    pub continuation: Box<Process>,
}

impl Prefix {
    pub fn new(action: Action, continuation: Process) -> Self {
        Self {
            action,
            continuation: Box::new(continuation),
        }
    }
}

/// `P₁ + … + Pₙ` over prefixes, `n ≥ 2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Summation(Vec<Prefix>);

impl Summation {
    pub fn new(summands: Vec<Prefix>) -> Result<Self, CcsError> {
        if summands.len() < 2 {
            return Err(CcsError::TooFewOperands {
                operator: "choice",
                count: summands.len(),
            });
        }
        Ok(Self(summands))
    }

    pub fn summands(&self) -> &[Prefix] {
        &self.0
    }
}

/// `P₁ ∥ … ∥ Pₙ`, `n ≥ 2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Composition(Vec<Process>);

impl Composition {
    pub fn new(components: Vec<Process>) -> Result<Self, CcsError> {
        if components.len() < 2 {
            return Err(CcsError::TooFewOperands {
                operator: "parallel composition",
                count: components.len(),
            });
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[Process] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Process {
    /// `0`
    Inaction,
    Prefix(Prefix),
    Choice(Summation),
    Parallel(Composition),
    /// `Pⁿ`, `n` copies of `P` in parallel.
    Exponent(Box<Process>, u64),
    /// `(νa)P`
    Restriction(ActionName, Box<Process>),
    Constant(ConstantName),
}

impl Process {
    pub fn prefix(action: Action, continuation: Process) -> Self {
        Process::Prefix(Prefix::new(action, continuation))
    }

    pub fn constant(name: ConstantName) -> Self {
        Process::Constant(name)
    }

    pub fn exponent(process: Process, count: u64) -> Self {
        Process::Exponent(Box::new(process), count)
    }

    pub fn restrict(name: ActionName, process: Process) -> Self {
        Process::Restriction(name, Box::new(process))
    }

    /// Choice over `summands`: `0` when empty, the prefix itself when there
    /// is only one.
    pub fn sum(mut summands: Vec<Prefix>) -> Self {
        match summands.len() {
            0 => Process::Inaction,
            1 => Process::Prefix(summands.remove(0)),
            _ => Process::Choice(Summation(summands)),
        }
    }

    /// Parallel composition of `components`: `0` when empty, the component
    /// itself when there is only one.
    pub fn compose(mut components: Vec<Process>) -> Self {
        match components.len() {
            0 => Process::Inaction,
            1 => components.remove(0),
            _ => Process::Parallel(Composition(components)),
        }
    }

    /// Calls `visit` on this term and every subterm, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Process)) {
        visit(self);
        match self {
            Process::Inaction | Process::Constant(_) => {}
            Process::Prefix(prefix) => prefix.continuation.walk(visit),
            Process::Choice(choice) => {
                for summand in choice.summands() {
                    summand.continuation.walk(visit);
                }
            }
            Process::Parallel(parallel) => {
                for component in parallel.components() {
                    component.walk(visit);
                }
            }
            Process::Exponent(process, _) | Process::Restriction(_, process) => {
                process.walk(visit)
            }
        }
    }

    /// Every action appearing in a prefix of this term, in walk order.
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions = Vec::new();
        self.walk(&mut |process| match process {
            Process::Prefix(prefix) => actions.push(&prefix.action),
            Process::Choice(choice) => {
                actions.extend(choice.summands().iter().map(|summand| &summand.action))
            }
            _ => {}
        });
        actions
    }
}
