//! Positions in a document tree, as produced by the diff walk.
//!
//! A [`Path`] is immutable: [`Path::with_key`] and [`Path::with_index`] return
//! a new path with its own storage, so sibling branches of a recursive walk
//! never observe each other's steps.

use std::fmt;

/// One step below a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Mapping key, compared by key text.
    Key(String),
    /// Sequence position.
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // JSON string quoting is valid in both selector dialects.
            Self::Key(key) => match serde_json::to_string(key) {
                Ok(quoted) => write!(f, "[{quoted}]"),
                Err(_) => Err(fmt::Error),
            },
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// An ordered sequence of steps from the document body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// The empty path, addressing the document body (`$`).
    pub fn root() -> Self {
        Self::default()
    }

    fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// A new path with `key` appended.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        self.with_step(Step::Key(key.into()))
    }

    /// A new path with `index` appended.
    pub fn with_index(&self, index: usize) -> Self {
        self.with_step(Step::Index(index))
    }

    fn with_step(&self, step: Step) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    /// All steps but the last. The root path is its own parent.
    pub fn dir(&self) -> Self {
        match self.steps.split_last() {
            Some((_, init)) => Self::from_steps(init.to_vec()),
            None => Self::root(),
        }
    }

    /// The last step, `None` for the root path.
    pub fn base(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Render as a selector expression in bracket notation, e.g. `$["a"][0]`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
