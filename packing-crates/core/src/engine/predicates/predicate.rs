use crate::engine::variables::DomainId;

/// The kind of atomic constraint a [`Predicate`] expresses over its domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredicateType {
    LowerBound,
    UpperBound,
    NotEqual,
    Equal,
}

/// An atomic constraint over a single integer domain, e.g. `[x >= 5]` or `[x != 2]`.
///
/// Predicates are the only way in which propagators change domains; see
/// [`crate::propagation::PropagationContext::post`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate {
    domain: DomainId,
    predicate_type: PredicateType,
    right_hand_side: i32,
}

impl Predicate {
    pub(crate) fn new(domain: DomainId, predicate_type: PredicateType, right_hand_side: i32) -> Self {
        Predicate {
            domain,
            predicate_type,
            right_hand_side,
        }
    }

    pub fn get_domain(&self) -> DomainId {
        self.domain
    }

    pub fn get_predicate_type(&self) -> PredicateType {
        self.predicate_type
    }

    pub fn get_right_hand_side(&self) -> i32 {
        self.right_hand_side
    }

    pub fn is_lower_bound_predicate(&self) -> bool {
        self.predicate_type == PredicateType::LowerBound
    }

    pub fn is_upper_bound_predicate(&self) -> bool {
        self.predicate_type == PredicateType::UpperBound
    }

    pub fn is_equality_predicate(&self) -> bool {
        self.predicate_type == PredicateType::Equal
    }

    pub fn is_not_equal_predicate(&self) -> bool {
        self.predicate_type == PredicateType::NotEqual
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self.predicate_type {
            PredicateType::LowerBound => ">=",
            PredicateType::UpperBound => "<=",
            PredicateType::NotEqual => "!=",
            PredicateType::Equal => "==",
        };
        write!(f, "[{} {operator} {}]", self.domain, self.right_hand_side)
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
