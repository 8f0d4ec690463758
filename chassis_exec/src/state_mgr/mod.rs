//! # State manager module
//!
//! A small, configuration driven state machine for robot mechanisms. A mechanism provides:
//!
//! - the behaviours it knows about, as a map from configuration name to [`StateStruc`] slot,
//! - a factory which builds the behaviour for a slot,
//! - optionally a transition hook, called every cycle, which may request a new slot.
//!
//! The configuration lists the behaviours to actually load. If the configuration is broken the
//! manager stays inert: it holds no states and running it does nothing, so one badly configured
//! mechanism can't stop the rest of the robot.
//!
//! The manager is generic over a context type `C` which is passed to every behaviour call, so the
//! behaviours can reach the mechanism they drive without owning it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Standard
use std::collections::HashMap;

// External
use log::{debug, error, info};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A behaviour of a mechanism.
pub trait MechState<C> {
    /// Called when the state becomes the current state.
    fn init(&mut self, ctx: &mut C);

    /// Called once per cycle while the state is current.
    fn run(&mut self, ctx: &mut C);

    /// Called when the state stops being the current state.
    fn exit(&mut self, ctx: &mut C);

    /// True once the mechanism has reached whatever the state is driving it towards.
    fn at_target(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where a recognised state lives in the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStruc {
    pub id: usize,

    /// The manager starts in the first loaded default state.
    pub is_default: bool,
}

/// One entry of a mechanism's state configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateConfig {
    pub name: String,
}

/// A loaded state.
pub struct MechanismState<C> {
    pub id: usize,
    pub name: String,
    pub behaviour: Box<dyn MechState<C>>,
    pub is_default: bool,
}

/// Builds the behaviour for a named state, or `None` if it can't.
pub type StateFactory<C> = dyn Fn(&str, usize) -> Option<Box<dyn MechState<C>>>;

/// Called at the start of every run with the context and the current slot. May return a slot to
/// change to, and whether the new state should also be run immediately.
pub type TransitionCheck<C> = Box<dyn FnMut(&C, Option<usize>) -> Option<(usize, bool)>>;

/// Manages the states of one mechanism.
pub struct StateMgr<C> {
    name: String,

    states: HashMap<usize, MechanismState<C>>,

    current: Option<usize>,

    transitions: Option<TransitionCheck<C>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Configuration errors of a state manager.
#[derive(Debug, thiserror::Error)]
pub enum StateMgrError {
    #[error("No states are configured for the {0} state manager")]
    EmptyConfig(String),

    #[error("{1} is not a state the {0} state manager recognises")]
    UnknownState(String, String),

    #[error("States {2} and {3} of the {0} state manager both use slot {1}")]
    DuplicateSlot(String, usize, String, String),

    #[error("The {0} state manager could not create state {1}")]
    StateCreation(String, String),

    #[error("None of the configured states of the {0} state manager is a default")]
    NoDefault(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C> StateMgr<C> {
    /// Create an empty, inert manager.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            states: HashMap::new(),
            current: None,
            transitions: None,
        }
    }

    /// Load the configured states and enter the default one.
    ///
    /// On any configuration error the error is logged once and the manager is left inert.
    pub fn init(
        &mut self,
        configs: &[StateConfig],
        state_map: &HashMap<&str, StateStruc>,
        factory: &StateFactory<C>,
        transitions: Option<TransitionCheck<C>>,
        ctx: &mut C,
    ) {
        if let Err(e) = self.try_init(configs, state_map, factory, transitions, ctx) {
            error!("State manager left inert: {}", e);
        }
    }

    /// As [`StateMgr::init`], returning the error instead of logging it.
    pub fn try_init(
        &mut self,
        configs: &[StateConfig],
        state_map: &HashMap<&str, StateStruc>,
        factory: &StateFactory<C>,
        transitions: Option<TransitionCheck<C>>,
        ctx: &mut C,
    ) -> Result<(), StateMgrError> {
        let states = &mut self.states;
        if let Some(s) = self.current.and_then(|id| states.get_mut(&id)) {
            debug!("{} state manager leaving {} to re-initialise", self.name, s.name);
            s.behaviour.exit(ctx);
        }

        self.states.clear();
        self.current = None;
        self.transitions = None;

        let states = self.build_states(configs, state_map, factory)?;

        // First default in configuration order wins
        let default_id = configs
            .iter()
            .filter_map(|c| state_map.get(c.name.as_str()))
            .find(|s| s.is_default)
            .map(|s| s.id)
            .ok_or_else(|| StateMgrError::NoDefault(self.name.clone()))?;

        self.states = states;
        self.transitions = transitions;
        self.current = Some(default_id);

        if let Some(s) = self.states.get_mut(&default_id) {
            info!("{} state manager starting in {}", self.name, s.name);
            s.behaviour.init(ctx);
        }

        Ok(())
    }

    /// Check for a requested transition, then run the current state.
    pub fn run_current_state(&mut self, ctx: &mut C) {
        let request = match self.transitions.as_mut() {
            Some(check) => check(&*ctx, self.current),
            None => None,
        };

        if let Some((slot, run_now)) = request {
            // A state entered with run_now has already run this cycle
            if self.set_current_state(slot, run_now, ctx) && run_now {
                return;
            }
        }

        if let Some(s) = self.current.and_then(|id| self.states.get_mut(&id)) {
            s.behaviour.run(ctx);
        }
    }

    /// Change to the state in the given slot, optionally running it straight away.
    ///
    /// Does nothing if the slot is already current or holds no state. Returns true if the state
    /// changed.
    pub fn set_current_state(&mut self, slot: usize, run: bool, ctx: &mut C) -> bool {
        if self.current == Some(slot) {
            return false;
        }

        if !self.states.contains_key(&slot) {
            debug!("{} state manager has no state in slot {}", self.name, slot);
            return false;
        }

        if let Some(s) = self.current.and_then(|id| self.states.get_mut(&id)) {
            s.behaviour.exit(ctx);
        }

        self.current = Some(slot);

        if let Some(s) = self.states.get_mut(&slot) {
            info!("{} state manager entering {}", self.name, s.name);
            s.behaviour.init(ctx);
            if run {
                s.behaviour.run(ctx);
            }
        }

        true
    }

    /// Slot of the current state.
    pub fn current_state(&self) -> Option<usize> {
        self.current
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current
            .and_then(|id| self.states.get(&id))
            .map(|s| s.name.as_str())
    }

    /// True if no state is loaded.
    pub fn is_inert(&self) -> bool {
        self.current.is_none()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// True if the current state reports it has reached its target.
    pub fn at_target(&self) -> bool {
        self.current
            .and_then(|id| self.states.get(&id))
            .map(|s| s.behaviour.at_target())
            .unwrap_or(false)
    }

    fn build_states(
        &self,
        configs: &[StateConfig],
        state_map: &HashMap<&str, StateStruc>,
        factory: &StateFactory<C>,
    ) -> Result<HashMap<usize, MechanismState<C>>, StateMgrError> {
        if configs.is_empty() {
            return Err(StateMgrError::EmptyConfig(self.name.clone()));
        }

        let mut states: HashMap<usize, MechanismState<C>> = HashMap::new();

        for config in configs {
            let struc = match state_map.get(config.name.as_str()) {
                Some(s) => *s,
                None => {
                    return Err(StateMgrError::UnknownState(
                        self.name.clone(),
                        config.name.clone(),
                    ))
                }
            };

            if let Some(existing) = states.get(&struc.id) {
                return Err(StateMgrError::DuplicateSlot(
                    self.name.clone(),
                    struc.id,
                    existing.name.clone(),
                    config.name.clone(),
                ));
            }

            let behaviour = match factory(&config.name, struc.id) {
                Some(b) => b,
                None => {
                    return Err(StateMgrError::StateCreation(
                        self.name.clone(),
                        config.name.clone(),
                    ))
                }
            };

            debug!(
                "{} state manager loaded {} in slot {}",
                self.name, config.name, struc.id
            );

            states.insert(
                struc.id,
                MechanismState {
                    id: struc.id,
                    name: config.name.clone(),
                    behaviour,
                    is_default: struc.is_default,
                },
            );
        }

        Ok(states)
    }
}
