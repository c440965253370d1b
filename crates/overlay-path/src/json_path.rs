use overlay_tree::{NodeId, Tree};

use crate::ast::Query;
use crate::dialect::Dialect;
use crate::error::{SelectorError, SelectorResult};
use crate::eval::Evaluator;
use crate::parser::Parser;

/// A compiled selector expression.
#[derive(Debug, Clone)]
pub struct JsonPath {
    expression: String,
    dialect: Dialect,
    query: Query,
}

impl JsonPath {
    /// Compile `expression` under `dialect`.
    pub fn compile(expression: &str, dialect: Dialect) -> SelectorResult<Self> {
        let query = Parser::parse(expression, dialect).map_err(|source| SelectorError::Compile {
            expression: expression.to_string(),
            dialect,
            source,
        })?;
        Ok(Self {
            expression: expression.to_string(),
            dialect,
            query,
        })
    }

    /// Evaluate against the document body of `tree`. An empty document
    /// matches nothing.
    pub fn query(&self, tree: &Tree) -> SelectorResult<Vec<NodeId>> {
        match tree.body() {
            Some(body) => self.query_from(tree, body),
            None => Ok(Vec::new()),
        }
    }

    /// Evaluate with `$` bound to `root`.
    pub fn query_from(&self, tree: &Tree, root: NodeId) -> SelectorResult<Vec<NodeId>> {
        Evaluator::new(tree, root, self.dialect)
            .query(&self.query, root)
            .map_err(|source| SelectorError::Evaluation {
                expression: self.expression.clone(),
                source,
            })
    }

    /// Returns `true` if the expression is just `$`.
    pub fn selects_root(&self) -> bool {
        self.query.segments.is_empty()
    }
}
