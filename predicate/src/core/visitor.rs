use super::{Predicate, PredicateNode};

/// Visitor that walks predicate trees bottom-up and folds child results.
pub trait PredicateVisitor {
    /// Error type used when evaluation fails.
    type Error;
    /// Concrete value type produced while walking the predicate.
    type Value;

    /// Evaluates a leaf predicate and returns its result.
    fn visit_leaf(&mut self, leaf: &PredicateNode) -> Result<Self::Value, Self::Error>;

    /// Combines an `AND` clause from the supplied child results.
    ///
    /// `children` is empty for an empty conjunction.
    fn combine_and(
        &mut self,
        original: &Predicate,
        children: Vec<Self::Value>,
    ) -> Result<Self::Value, Self::Error>;

    /// Combines an `OR` clause from the supplied child results.
    ///
    /// `children` is empty for an empty disjunction.
    fn combine_or(
        &mut self,
        original: &Predicate,
        children: Vec<Self::Value>,
    ) -> Result<Self::Value, Self::Error>;

    /// Visits the supplied predicate by walking the expression tree.
    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Value, Self::Error> {
        self.visit_node(predicate.kind(), predicate)
    }

    /// Internal helper that evaluates a predicate node recursively.
    fn visit_node(
        &mut self,
        node: &PredicateNode,
        original: &Predicate,
    ) -> Result<Self::Value, Self::Error> {
        match node {
            PredicateNode::And(clauses) => {
                let mut children = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    children.push(self.visit_predicate(clause)?);
                }
                self.combine_and(original, children)
            }
            PredicateNode::Or(clauses) => {
                let mut children = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    children.push(self.visit_predicate(clause)?);
                }
                self.combine_or(original, children)
            }
            leaf => {
                debug_assert!(leaf.is_leaf(), "branch nodes handled earlier");
                self.visit_leaf(leaf)
            }
        }
    }
}
