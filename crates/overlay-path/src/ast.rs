//! Syntax tree of a compiled selector expression.

use overlay_tree::Scalar;
use regex::Regex;

/// Where a query starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoot {
    /// `$`: the document body.
    Root,
    /// `@`: the node under test in a filter.
    Current,
}

/// `$` or `@` followed by segments.
#[derive(Debug, Clone)]
pub struct Query {
    pub root: QueryRoot,
    pub segments: Vec<Segment>,
}

impl Query {
    /// A query selects at most one node when every segment is a single name
    /// or index selector without descent.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| {
            !segment.descendant
                && segment.selectors.len() == 1
                && matches!(segment.selectors[0], Selector::Name(_) | Selector::Index(_))
        })
    }
}

/// One `.x`, `..x` or `[...]` step with its selectors.
#[derive(Debug, Clone)]
pub struct Segment {
    pub selectors: Vec<Selector>,
    /// `..`: apply the selectors to the node and every descendant.
    pub descendant: bool,
}

impl Segment {
    pub fn new(selectors: Vec<Selector>, descendant: bool) -> Self {
        Self {
            selectors,
            descendant,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Selector {
    Name(String),
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    Wildcard,
    Filter(Box<Filter>),
}

/// A logical expression inside `[?...]`.
#[derive(Debug, Clone)]
pub enum Filter {
    Or(Box<Filter>, Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    /// Non-empty result of a query.
    Exists(Query),
    Compare {
        op: CompareOp,
        left: Comparable,
        right: Comparable,
    },
    /// A function returning a logical result, e.g. `match(@.a, 'x')`.
    Function(FunctionCall),
    /// Legacy `subject =~ /pattern/flags`.
    RegexMatch { subject: Comparable, regex: Regex },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An operand of a comparison.
#[derive(Debug, Clone)]
pub enum Comparable {
    Literal(Scalar),
    /// A singular query in the RFC dialect; the legacy dialect takes the
    /// first match of any query.
    Query(Query),
    Function(FunctionCall),
}

/// Function extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Length,
    Count,
    Match,
    Search,
    Value,
}

/// Declared type of a function parameter or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Value,
    Logical,
    Nodes,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length" => Some(Self::Length),
            "count" => Some(Self::Count),
            "match" => Some(Self::Match),
            "search" => Some(Self::Search),
            "value" => Some(Self::Value),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Count => "count",
            Self::Match => "match",
            Self::Search => "search",
            Self::Value => "value",
        }
    }

    pub fn params(self) -> &'static [ArgType] {
        match self {
            Self::Length => &[ArgType::Value],
            Self::Count | Self::Value => &[ArgType::Nodes],
            Self::Match | Self::Search => &[ArgType::Value, ArgType::Value],
        }
    }

    pub fn result(self) -> ArgType {
        match self {
            Self::Length | Self::Count | Self::Value => ArgType::Value,
            Self::Match | Self::Search => ArgType::Logical,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub function: Function,
    pub args: Vec<FunctionArg>,
}

#[derive(Debug, Clone)]
pub enum FunctionArg {
    Literal(Scalar),
    Query(Query),
    Function(FunctionCall),
}
