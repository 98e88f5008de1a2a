use super::predicate::Predicate;
use super::predicate::PredicateType;
use crate::engine::variables::DomainId;

/// Creates [`Predicate`]s over a variable; used by the [`crate::predicate`] macro.
pub trait PredicateConstructor {
    type Value;

    fn predicate(&self, predicate_type: PredicateType, value: Self::Value) -> Predicate;

    /// `[x >= bound]`
    fn lower_bound_predicate(&self, bound: Self::Value) -> Predicate {
        self.predicate(PredicateType::LowerBound, bound)
    }

    /// `[x <= bound]`
    fn upper_bound_predicate(&self, bound: Self::Value) -> Predicate {
        self.predicate(PredicateType::UpperBound, bound)
    }

    /// `[x == value]`
    fn equality_predicate(&self, value: Self::Value) -> Predicate {
        self.predicate(PredicateType::Equal, value)
    }

    /// `[x != value]`
    fn disequality_predicate(&self, value: Self::Value) -> Predicate {
        self.predicate(PredicateType::NotEqual, value)
    }
}

impl PredicateConstructor for DomainId {
    type Value = i32;

    fn predicate(&self, predicate_type: PredicateType, value: i32) -> Predicate {
        Predicate::new(*self, predicate_type, value)
    }
}

/// Creates a [`Predicate`] from a comparison between a variable and a value.
///
/// # Example
/// ```rust
/// # use packing_core::predicate;
/// # use packing_core::state::State;
/// let mut state = State::default();
/// let items = vec![state.new_interval_variable(0, 3)];
///
/// let placed = predicate![items[0] == 2];
/// assert_eq!(items[0], placed.get_domain());
/// assert_eq!(2, placed.get_right_hand_side());
///
/// assert!(predicate![items[0] != 2].is_not_equal_predicate());
/// ```
#[macro_export]
macro_rules! predicate {
    (@create $variable:expr, $predicate_type:ident, $value:expr) => {{
        #[allow(unused_imports, reason = "the trait may already be in scope")]
        use $crate::predicates::PredicateConstructor;
        $variable.predicate($crate::predicates::PredicateType::$predicate_type, $value)
    }};
    ($($var:ident).+$([$index:expr])? >= $bound:expr) => {
        $crate::predicate!(@create $($var).+$([$index])?, LowerBound, $bound)
    };
    ($($var:ident).+$([$index:expr])? <= $bound:expr) => {
        $crate::predicate!(@create $($var).+$([$index])?, UpperBound, $bound)
    };
    ($($var:ident).+$([$index:expr])? == $value:expr) => {
        $crate::predicate!(@create $($var).+$([$index])?, Equal, $value)
    };
    ($($var:ident).+$([$index:expr])? != $value:expr) => {
        $crate::predicate!(@create $($var).+$([$index])?, NotEqual, $value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn every_comparison_creates_its_predicate_type() {
        let x = DomainId::create_from_index(3);

        assert!(predicate![x >= 2].is_lower_bound_predicate());
        assert!(predicate![x <= 2].is_upper_bound_predicate());
        assert!(predicate![x == 2].is_equality_predicate());
        assert!(predicate![x != 2].is_not_equal_predicate());

        assert_eq!(x, predicate![x != 2].get_domain());
        assert_eq!(2, predicate![x != 2].get_right_hand_side());
    }

    #[test]
    fn indexed_and_nested_variables_are_accepted() {
        struct Bin {
            load: DomainId,
        }

        let items = [DomainId::create_from_index(0), DomainId::create_from_index(1)];
        let bin = Bin {
            load: DomainId::create_from_index(2),
        };

        assert_eq!(items[1], predicate![items[1] == 4].get_domain());
        assert_eq!(bin.load, predicate![bin.load <= 9].get_domain());
        assert_eq!(9, predicate![bin.load <= 9].get_right_hand_side());
    }
}
