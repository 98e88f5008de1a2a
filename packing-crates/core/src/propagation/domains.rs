use crate::engine::Assignments;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;
use crate::engine::variables::DomainId;
use crate::predicates::Predicate;

/// A read-only view of the current domains, handed to propagators whenever they may inspect but
/// not change the state.
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    pub(crate) assignments: &'a Assignments,
    pub(crate) trailed_values: &'a TrailedValues,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(assignments: &'a Assignments, trailed_values: &'a TrailedValues) -> Self {
        Domains {
            assignments,
            trailed_values,
        }
    }
}

/// A trait which defines common methods for retrieving the [`Assignments`] and the
/// [`TrailedValues`] from the structure which implements this trait.
pub trait HasAssignments {
    /// Returns the stored [`Assignments`].
    fn assignments(&self) -> &Assignments;

    /// Returns the stored [`TrailedValues`].
    fn trailed_values(&self) -> &TrailedValues;
}

pub(crate) trait HasTrailedValues: HasAssignments {
    fn trailed_values_mut(&mut self) -> &mut TrailedValues;
}

impl HasAssignments for Domains<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

pub(crate) trait ManipulateTrailedValues: HasTrailedValues {
    fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.trailed_values_mut()
            .add_assign(trailed_integer, addition);
    }

    fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values_mut().assign(trailed_integer, value);
    }
}

impl<T: HasTrailedValues> ManipulateTrailedValues for T {}

/// Read access to the domains and trailed values of the state.
pub trait ReadDomains: HasAssignments {
    fn is_predicate_satisfied(&self, predicate: Predicate) -> bool {
        self.assignments()
            .evaluate_predicate(predicate)
            .is_some_and(|truth_value| truth_value)
    }

    fn is_predicate_falsified(&self, predicate: Predicate) -> bool {
        self.assignments()
            .evaluate_predicate(predicate)
            .is_some_and(|truth_value| !truth_value)
    }

    /// Returns `true` if the domain of the given variable is singleton.
    fn is_fixed(&self, var: DomainId) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }

    /// The value of the given variable if its domain is a singleton.
    fn fixed_value(&self, var: DomainId) -> Option<i32> {
        self.assignments().get_assigned_value(var)
    }

    fn lower_bound(&self, var: DomainId) -> i32 {
        self.assignments().get_lower_bound(var)
    }

    fn upper_bound(&self, var: DomainId) -> i32 {
        self.assignments().get_upper_bound(var)
    }

    fn contains(&self, var: DomainId, value: i32) -> bool {
        self.assignments().is_value_in_domain(var, value)
    }

    fn iterate_domain(&self, var: DomainId) -> impl Iterator<Item = i32> {
        self.assignments().get_domain_iterator(var)
    }

    fn value(&self, trailed_integer: TrailedInteger) -> i64 {
        self.trailed_values().read(trailed_integer)
    }
}

impl<T: HasAssignments> ReadDomains for T {}
