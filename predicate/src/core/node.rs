use std::{cmp::Ordering, fmt};

use super::{PredicateVisitor, ScalarValue};

/// Comparison operator used by binary predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equals (`=`).
    Equal,
    /// Not equals (`!=`).
    NotEqual,
    /// Less than (`<`).
    LessThan,
    /// Less than or equal to (`<=`).
    LessThanOrEqual,
    /// Greater than (`>`).
    GreaterThan,
    /// Greater than or equal to (`>=`).
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Evaluates the operator against a comparison ordering.
    #[must_use]
    pub fn test_ordering(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
        })
    }
}

/// Operator used by text predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringOp {
    /// Text equality.
    Equal,
    /// Text inequality.
    NotEqual,
    /// Lexicographically greater.
    GreaterThan,
    /// Lexicographically greater or equal.
    GreaterThanOrEqual,
    /// Lexicographically smaller.
    LessThan,
    /// Lexicographically smaller or equal.
    LessThanOrEqual,
    /// Operand occurs anywhere in the cell.
    Contains,
    /// Operand occurs nowhere in the cell.
    DoesNotContain,
    /// Cell starts with the operand.
    StartsWith,
    /// Cell does not start with the operand.
    DoesNotStartWith,
    /// Cell ends with the operand.
    EndsWith,
    /// Cell does not end with the operand.
    DoesNotEndWith,
}

impl StringOp {
    /// Tests `value` against `operand`, lower-casing both sides first when the
    /// match is case-insensitive.
    #[must_use]
    pub fn matches(self, value: &str, operand: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.matches_exact(value, operand)
        } else {
            self.matches_exact(&value.to_lowercase(), &operand.to_lowercase())
        }
    }

    fn matches_exact(self, value: &str, operand: &str) -> bool {
        match self {
            StringOp::Equal => value == operand,
            StringOp::NotEqual => value != operand,
            StringOp::GreaterThan => value > operand,
            StringOp::GreaterThanOrEqual => value >= operand,
            StringOp::LessThan => value < operand,
            StringOp::LessThanOrEqual => value <= operand,
            StringOp::Contains => value.contains(operand),
            StringOp::DoesNotContain => !value.contains(operand),
            StringOp::StartsWith => value.starts_with(operand),
            StringOp::DoesNotStartWith => !value.starts_with(operand),
            StringOp::EndsWith => value.ends_with(operand),
            StringOp::DoesNotEndWith => !value.ends_with(operand),
        }
    }
}

impl fmt::Display for StringOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StringOp::Equal => "=",
            StringOp::NotEqual => "!=",
            StringOp::GreaterThan => ">",
            StringOp::GreaterThanOrEqual => ">=",
            StringOp::LessThan => "<",
            StringOp::LessThanOrEqual => "<=",
            StringOp::Contains => "CONTAINS",
            StringOp::DoesNotContain => "NOT CONTAINS",
            StringOp::StartsWith => "STARTS WITH",
            StringOp::DoesNotStartWith => "NOT STARTS WITH",
            StringOp::EndsWith => "ENDS WITH",
            StringOp::DoesNotEndWith => "NOT ENDS WITH",
        })
    }
}

/// Kind of a nullity check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullityKind {
    /// Matches empty cells.
    IsNull,
    /// Matches non-empty cells.
    IsNotNull,
}

/// Recursive predicate node; leaf and branch variants coexist.
#[derive(Clone, Debug, PartialEq)]
pub enum PredicateNode {
    /// Comparison of the cell against a literal.
    Compare {
        /// Operator.
        op: ComparisonOp,
        /// Right-hand literal.
        operand: ScalarValue,
    },
    /// Text comparison of the cell against a string literal.
    StringMatch {
        /// Operator.
        op: StringOp,
        /// Whether letter case is significant.
        case_sensitive: bool,
        /// Right-hand text.
        operand: String,
    },
    /// Null check (`IS NULL` / `IS NOT NULL`).
    Nullity(NullityKind),
    /// Conjunction over child predicates; vacuously true when empty.
    And(Vec<Predicate>),
    /// Disjunction over child predicates; vacuously false when empty.
    Or(Vec<Predicate>),
}

impl PredicateNode {
    /// Returns true when the node has no child predicates.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, PredicateNode::And(_) | PredicateNode::Or(_))
    }

    /// Evaluates a leaf node against a single cell.
    ///
    /// Empty cells only satisfy `IS NULL`. Branch nodes are evaluated
    /// recursively with short-circuiting.
    #[must_use]
    pub fn matches(&self, cell: &ScalarValue) -> bool {
        match self {
            PredicateNode::Compare { op, operand } => cell
                .compare(operand)
                .map(|ordering| op.test_ordering(ordering))
                .unwrap_or(false),
            PredicateNode::StringMatch {
                op,
                case_sensitive,
                operand,
            } => cell
                .as_utf8()
                .map(|text| op.matches(text, operand, *case_sensitive))
                .unwrap_or(false),
            PredicateNode::Nullity(NullityKind::IsNull) => cell.is_null(),
            PredicateNode::Nullity(NullityKind::IsNotNull) => !cell.is_null(),
            PredicateNode::And(children) => children.iter().all(|child| child.matches(cell)),
            PredicateNode::Or(children) => children.iter().any(|child| child.matches(cell)),
        }
    }
}

/// Single-column predicate handed to storage engines.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    kind: PredicateNode,
}

impl Predicate {
    /// Builds a predicate directly from a node.
    #[must_use]
    pub fn from_kind(kind: PredicateNode) -> Self {
        Self { kind }
    }

    /// Returns a reference to the underlying node.
    #[must_use]
    pub fn kind(&self) -> &PredicateNode {
        &self.kind
    }

    /// Consumes the predicate and returns its node.
    #[must_use]
    pub fn into_kind(self) -> PredicateNode {
        self.kind
    }

    /// Comparison against a literal.
    #[must_use]
    pub fn compare(op: ComparisonOp, operand: ScalarValue) -> Self {
        Self::from_kind(PredicateNode::Compare { op, operand })
    }

    /// Text comparison against a string literal.
    #[must_use]
    pub fn string_match(op: StringOp, case_sensitive: bool, operand: impl Into<String>) -> Self {
        Self::from_kind(PredicateNode::StringMatch {
            op,
            case_sensitive,
            operand: operand.into(),
        })
    }

    /// Nullity check.
    #[must_use]
    pub fn nullity(kind: NullityKind) -> Self {
        Self::from_kind(PredicateNode::Nullity(kind))
    }

    /// Builds a conjunction that keeps the supplied clauses in order.
    ///
    /// Unlike a planner-side conjunction, nested `And` nodes are not
    /// flattened: the tree mirrors the caller's filter exactly.
    #[must_use]
    pub fn and<I>(clauses: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        Self::from_kind(PredicateNode::And(clauses.into_iter().collect()))
    }

    /// Builds a disjunction that keeps the supplied clauses in order.
    #[must_use]
    pub fn or<I>(clauses: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        Self::from_kind(PredicateNode::Or(clauses.into_iter().collect()))
    }

    /// Child predicates of a branch node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Predicate] {
        match &self.kind {
            PredicateNode::And(children) | PredicateNode::Or(children) => children,
            _ => &[],
        }
    }

    /// Evaluates the predicate against a single cell.
    #[must_use]
    pub fn matches(&self, cell: &ScalarValue) -> bool {
        self.kind.matches(cell)
    }

    /// Accepts a visitor that walks the predicate tree bottom-up.
    pub fn accept<V>(&self, visitor: &mut V) -> Result<V::Value, V::Error>
    where
        V: PredicateVisitor + ?Sized,
    {
        visitor.visit_predicate(self)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PredicateNode::Compare { op, operand } => write!(f, "{op} {operand}"),
            PredicateNode::StringMatch {
                op,
                case_sensitive,
                operand,
            } => {
                write!(f, "{op} '{operand}'")?;
                if !case_sensitive {
                    f.write_str(" (ci)")?;
                }
                Ok(())
            }
            PredicateNode::Nullity(NullityKind::IsNull) => f.write_str("IS NULL"),
            PredicateNode::Nullity(NullityKind::IsNotNull) => f.write_str("IS NOT NULL"),
            PredicateNode::And(children) => write_group(f, "AND", children),
            PredicateNode::Or(children) => write_group(f, "OR", children),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, joiner: &str, children: &[Predicate]) -> fmt::Result {
    f.write_str("(")?;
    for (idx, child) in children.iter().enumerate() {
        if idx > 0 {
            write!(f, " {joiner} ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}
