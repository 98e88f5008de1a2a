use log::debug;
use log::trace;

use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::create_statistics_struct;
use crate::engine::notifications::NotificationEngine;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::EmptyDomain;
use crate::engine::PropagatorQueue;
use crate::engine::TrailedValues;
use crate::packing_asserts::packing_assert_extreme;
use crate::packing_asserts::packing_assert_simple;
use crate::packing_asserts::print_packing_assert_warning_message;
use crate::predicates::Predicate;
use crate::propagation::store::PropagatorStore;
use crate::propagation::Domains;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorHandle;
use crate::propagation::PropagatorId;
use crate::statistics::log_statistic;
use crate::statistics::StatisticLogger;

/// The [`State`] is the container of variables and propagators.
///
/// It owns the domains of all variables together with the trailed values of the propagators,
/// and restores both when the host search backtracks with [`State::restore_to`].
#[derive(Debug)]
pub struct State {
    /// The list of propagators; propagators live here and are queried when events (domain
    /// changes) happen.
    pub(crate) propagators: PropagatorStore,
    /// Tracks information related to the assignments of integer variables.
    pub(crate) assignments: Assignments,
    /// Keep track of trailed values (i.e. values which automatically backtrack).
    pub(crate) trailed_values: TrailedValues,
    /// Dictates the order in which propagators will be called to propagate.
    pub(crate) propagator_queue: PropagatorQueue,
    /// Component responsible for providing notifications for changes to the domains of
    /// variables.
    pub(crate) notification_engine: NotificationEngine,

    statistics: StateStatistics,
}

impl Default for State {
    fn default() -> Self {
        print_packing_assert_warning_message!();

        State {
            propagators: PropagatorStore::default(),
            assignments: Assignments::default(),
            trailed_values: TrailedValues::default(),
            propagator_queue: PropagatorQueue::default(),
            notification_engine: NotificationEngine::default(),
            statistics: StateStatistics::default(),
        }
    }
}

create_statistics_struct!(StateStatistics {
    num_propagators_called: usize,
    num_conflicts: usize,
    /// The number of times the state was restored to an earlier checkpoint.
    num_restores: usize,
});

/// Information concerning the conflict returned by [`State::propagate_to_fixed_point`].
///
/// Two (related) conflicts can happen:
/// 1) a propagator explicitly detects a conflict.
/// 2) a propagator post a domain change that results in a variable having an empty domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// A conflict raised explicitly by a propagator.
    Propagator(PropagatorConflict),
    /// A conflict caused by an empty domain for a variable occurring.
    EmptyDomain(EmptyDomainConflict),
}

impl From<EmptyDomainConflict> for Conflict {
    fn from(value: EmptyDomainConflict) -> Self {
        Conflict::EmptyDomain(value)
    }
}

impl From<PropagatorConflict> for Conflict {
    fn from(value: PropagatorConflict) -> Self {
        Conflict::Propagator(value)
    }
}

/// A conflict because a domain became empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomainConflict {
    /// The propagator whose change emptied the domain.
    pub propagator_id: PropagatorId,
}

impl State {
    /// Logs the statistics of the state and, if `verbose`, of every propagator.
    pub fn log_statistics(&self, verbose: bool) {
        log_statistic("variables", self.assignments.num_domains());
        log_statistic("propagators", self.propagators.num_propagators());
        log_statistic("failures", self.statistics.num_conflicts);
        log_statistic("propagations", self.statistics.num_propagators_called);
        log_statistic("restores", self.statistics.num_restores);
        if verbose {
            for (index, propagator) in self.propagators.iter_propagators().enumerate() {
                propagator.log_statistics(StatisticLogger::new([
                    propagator.name(),
                    "number",
                    index.to_string().as_str(),
                ]));
            }
        }
    }
}

/// Operations to create variables.
impl State {
    /// Creates a new integer variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_interval_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        let domain_id = self.assignments.grow(lower_bound, upper_bound);
        self.notification_engine.grow();
        domain_id
    }
}

/// Operations to retrieve information about values.
impl State {
    /// Returns the lower-bound of the given `variable`.
    pub fn lower_bound(&self, variable: DomainId) -> i32 {
        self.assignments.get_lower_bound(variable)
    }

    /// Returns the upper-bound of the given `variable`.
    pub fn upper_bound(&self, variable: DomainId) -> i32 {
        self.assignments.get_upper_bound(variable)
    }

    /// Returns whether the given `variable` contains the provided `value`.
    pub fn contains(&self, variable: DomainId, value: i32) -> bool {
        self.assignments.is_value_in_domain(variable, value)
    }

    /// If the given `variable` is fixed, then [`Some`] containing the assigned value is
    /// returned. Otherwise, [`None`] is returned.
    pub fn fixed_value(&self, variable: DomainId) -> Option<i32> {
        self.assignments.get_assigned_value(variable)
    }

    /// Iterates over the values in the domain of `variable` in increasing order.
    pub fn iterate_domain(&self, variable: DomainId) -> impl Iterator<Item = i32> + '_ {
        self.assignments.get_domain_iterator(variable)
    }

    /// Returns the current checkpoint.
    pub fn get_checkpoint(&self) -> usize {
        self.assignments.get_checkpoint()
    }

    pub fn get_domains(&self) -> Domains<'_> {
        Domains::new(&self.assignments, &self.trailed_values)
    }
}

impl State {
    /// Add a new propagator to the [`State`]. The constructor for that propagator should
    /// subscribe to the appropriate domain events so that the propagator is called when
    /// necessary.
    ///
    /// While the propagator is added to the queue for propagation, this function does _not_
    /// trigger a round of propagation. An explicit call to [`State::propagate_to_fixed_point`]
    /// is necessary to run the new propagator for the first time.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let propagator_id = self.propagators.next_id();
        let constructor_context = PropagatorConstructorContext::new(propagator_id, self);
        let propagator = constructor.create(constructor_context);

        debug!("Adding propagator {} as {propagator_id}", propagator.name());

        let priority = propagator.priority();
        let added_id = self.propagators.add(Box::new(propagator));
        packing_assert_simple!(added_id == propagator_id);

        self.propagator_queue
            .enqueue_propagator(propagator_id, priority);

        PropagatorHandle::new(propagator_id)
    }

    /// Get a reference to the propagator identified by the given handle.
    ///
    /// For an exclusive reference, use [`State::get_propagator_mut`].
    pub fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self.propagators.get_propagator(handle)
    }
}

/// Operations for modifying the state.
impl State {
    /// Apply a [`Predicate`] to the [`State`].
    ///
    /// Returns `true` if a change to a domain occured, and `false` if the given [`Predicate`]
    /// was already true.
    ///
    /// If a domain becomes empty due to this operation, an [`EmptyDomain`] error is returned.
    ///
    /// This method does _not_ perform any propagation. For that, an explicit call to
    /// [`State::propagate_to_fixed_point`] is required. This allows the posting of multiple
    /// predicates before the entire propagation engine is invoked.
    pub fn post(&mut self, predicate: Predicate) -> Result<bool, EmptyDomain> {
        self.assignments
            .post_predicate(predicate, &mut self.notification_engine)
    }

    /// Create a checkpoint of the current [`State`], that can be returned to with
    /// [`State::restore_to`].
    ///
    /// If the state is not at fixed-point, then this method will panic.
    ///
    /// # Example
    /// ```
    /// use packing_core::predicate;
    /// use packing_core::state::State;
    ///
    /// let mut state = State::default();
    /// let variable = state.new_interval_variable(1, 10);
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    ///
    /// state.new_checkpoint();
    ///
    /// assert_eq!(state.get_checkpoint(), 1);
    ///
    /// state
    ///     .post(predicate![variable <= 5])
    ///     .expect("The lower bound is 1 so no conflict");
    /// assert_eq!(state.upper_bound(variable), 5);
    ///
    /// state.restore_to(0);
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    /// assert_eq!(state.upper_bound(variable), 10);
    /// ```
    pub fn new_checkpoint(&mut self) {
        packing_assert_simple!(
            self.propagator_queue.is_empty() && !self.notification_engine.has_pending_events(),
            "Can only create a new checkpoint when all propagation has occurred"
        );
        self.assignments.new_checkpoint();
        self.trailed_values.new_checkpoint();
    }

    /// Restore to the given checkpoint, undoing every domain change and every trailed value
    /// change made since.
    ///
    /// If the provided checkpoint is equal to the current checkpoint, this is a no-op. If the
    /// provided checkpoint is larger than the current checkpoint, this method will panic.
    pub fn restore_to(&mut self, checkpoint: usize) {
        packing_assert_simple!(checkpoint <= self.get_checkpoint());

        if checkpoint == self.get_checkpoint() {
            return;
        }

        trace!(
            "Restoring from checkpoint {} to {checkpoint}",
            self.get_checkpoint()
        );
        self.statistics.num_restores += 1;

        self.assignments.synchronise(checkpoint);
        self.trailed_values.synchronise(checkpoint);
        self.notification_engine.clear_events();
        self.propagator_queue.clear();

        for propagator in self.propagators.iter_propagators_mut() {
            let domains = Domains::new(&self.assignments, &self.trailed_values);
            propagator.synchronise(domains);
        }
    }

    /// Performs a single call to [`Propagator::propagate`] for the propagator with the provided
    /// [`PropagatorId`], and notifies the propagators about the resulting events.
    fn propagate(&mut self, propagator_id: PropagatorId) -> Result<(), Conflict> {
        self.statistics.num_propagators_called += 1;

        let propagation_status = {
            let propagator = &mut self.propagators[propagator_id];
            let context = PropagationContext::new(
                &mut self.trailed_values,
                &mut self.assignments,
                &mut self.notification_engine,
                propagator_id,
            );
            propagator.propagate(context)
        };

        match propagation_status {
            Ok(()) => {
                self.notification_engine
                    .notify_propagators_about_domain_events(
                        &self.assignments,
                        &mut self.trailed_values,
                        &mut self.propagators,
                        &mut self.propagator_queue,
                    );
                Ok(())
            }
            Err(inconsistency) => {
                self.statistics.num_conflicts += 1;
                self.notification_engine.clear_events();
                self.propagator_queue.clear();

                let conflict = match inconsistency {
                    Inconsistency::EmptyDomain => {
                        Conflict::EmptyDomain(EmptyDomainConflict { propagator_id })
                    }
                    Inconsistency::Conflict(conflict) => Conflict::Propagator(conflict),
                };
                debug!(
                    "Conflict in {}: {conflict:?}",
                    self.propagators[propagator_id].name()
                );

                Err(conflict)
            }
        }
    }

    /// Performs fixed-point propagation using the propagators defined in the [`State`].
    ///
    /// The posted [`Predicate`]s (using [`State::post`]) and added propagators (using
    /// [`State::add_propagator`]) cause propagators to be enqueued when the events that they
    /// have subscribed to are triggered. As propagation causes more changes to be made, more
    /// propagators are enqueued. This continues until applying all (enqueued) propagators leads
    /// to no more domain changes.
    ///
    /// It could be that the current [`State`] implies a conflict by propagation. In that case,
    /// an error with [`Conflict`] is returned.
    ///
    /// Once the [`State`] is conflicting, then the only operation that is defined is
    /// [`State::restore_to`]. All other operations and queries on the state are unspecified.
    pub fn propagate_to_fixed_point(&mut self) -> Result<(), Conflict> {
        // The initial domain events are due to the posted predicates.
        self.notification_engine
            .notify_propagators_about_domain_events(
                &self.assignments,
                &mut self.trailed_values,
                &mut self.propagators,
                &mut self.propagator_queue,
            );

        while let Some(propagator_id) = self.propagator_queue.pop() {
            self.propagate(propagator_id)?;
        }

        packing_assert_extreme!(
            self.debug_fixed_point_propagation(),
            "The propagators missed a propagation at the fixed point"
        );

        Ok(())
    }

    /// Checks that no propagator can change a domain when propagating from scratch.
    pub(crate) fn debug_fixed_point_propagation(&self) -> bool {
        self.propagators
            .iter_propagators()
            .enumerate()
            .all(|(index, propagator)| {
                let mut assignments = self.assignments.clone();
                let mut trailed_values = self.trailed_values.clone();
                let mut notification_engine = NotificationEngine::default();
                for _ in 0..assignments.num_domains() {
                    notification_engine.grow();
                }
                let num_trail_entries_before = assignments.num_trail_entries();

                let context = PropagationContext::new(
                    &mut trailed_values,
                    &mut assignments,
                    &mut notification_engine,
                    PropagatorId(index as u32),
                );
                let status = propagator.propagate_from_scratch(context);

                status.is_ok() && assignments.num_trail_entries() == num_trail_entries_before
            })
    }
}
