//! Backward-differentiation forms and the bootstrap state machine.
//!
//! Every form is normalized as
//!
//! ```text
//! u^{n+1} − Σ_j a_j u^{n−j} = β dt f(u^{n+1})
//! ```
//!
//! so a provider only needs the history combination `Σ a_j u^{n−j}` and the
//! mass weight `1 / (β dt)` multiplying `u^{n+1} − history`.

use ff_core::{Field, Real, linear_combination};

use crate::levels::TimeLevels;

/// Coefficients of one BDF formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BdfCoefficients {
    /// `a_j`, applied to `u^{n−j}` newest first
    pub history: &'static [Real],
    /// `β`, scaling `dt f` on the right-hand side
    pub beta: Real,
}

impl BdfCoefficients {
    pub fn order(&self) -> usize {
        self.history.len()
    }
}

pub const BDF1: BdfCoefficients = BdfCoefficients {
    history: &[1.0],
    beta: 1.0,
};

pub const BDF2: BdfCoefficients = BdfCoefficients {
    history: &[4.0 / 3.0, -1.0 / 3.0],
    beta: 2.0 / 3.0,
};

pub const BDF3: BdfCoefficients = BdfCoefficients {
    history: &[18.0 / 11.0, -9.0 / 11.0, 2.0 / 11.0],
    beta: 6.0 / 11.0,
};

/// Scheme used once enough history exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteadyScheme {
    #[default]
    Bdf2,
    Bdf3,
}

impl SteadyScheme {
    /// Number of time levels the scheme reads.
    pub fn memory(self) -> usize {
        self.coefficients().order()
    }

    pub fn coefficients(self) -> &'static BdfCoefficients {
        match self {
            SteadyScheme::Bdf2 => &BDF2,
            SteadyScheme::Bdf3 => &BDF3,
        }
    }
}

/// Which formula is active. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeState {
    /// BDF1 on `u_n`
    Bootstrap1,
    /// BDF2 on `u_n, u_{n−1}` ahead of a BDF3 steady scheme
    Bootstrap2,
    /// The steady scheme for the rest of the run
    Steady,
}

/// Time-derivative data handed to the provider for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepForm {
    /// `Σ a_j u^{n−j}`
    pub history: Field,
    /// `1 / (β dt)`
    pub mass_weight: Real,
    /// Formal order of the active formula
    pub order: usize,
}

/// Bootstrap state machine: BDF1, then BDF2, then (for BDF3) the steady form.
#[derive(Debug, Clone)]
pub struct SchemeBuilder {
    steady: SteadyScheme,
    state: SchemeState,
}

impl SchemeBuilder {
    pub fn new(steady: SteadyScheme) -> Self {
        Self {
            steady,
            state: SchemeState::Bootstrap1,
        }
    }

    pub fn state(&self) -> SchemeState {
        self.state
    }

    pub fn steady(&self) -> SteadyScheme {
        self.steady
    }

    /// Coefficients of the active formula.
    pub fn coefficients(&self) -> &'static BdfCoefficients {
        match self.state {
            SchemeState::Bootstrap1 => &BDF1,
            SchemeState::Bootstrap2 => &BDF2,
            SchemeState::Steady => self.steady.coefficients(),
        }
    }

    /// Levels needed by the active formula.
    pub fn required_levels(&self) -> usize {
        self.coefficients().order()
    }

    /// Build the step form from the accepted levels.
    ///
    /// # Panics
    ///
    /// Panics if `levels` holds fewer fields than the active formula reads.
    /// That only happens when the state machine is driven out of order.
    pub fn build_form(&self, levels: &TimeLevels, dt: Real) -> StepForm {
        let coeffs = self.coefficients();
        let needed = coeffs.order();
        assert!(
            levels.len() >= needed,
            "{:?} needs {} time levels, only {} available",
            self.state,
            needed,
            levels.len()
        );
        let fields: Vec<&Field> = levels.newest_first().take(needed).collect();
        StepForm {
            history: linear_combination(coeffs.history, &fields),
            mass_weight: 1.0 / (coeffs.beta * dt),
            order: needed,
        }
    }

    /// Move past one accepted step. Returns whether the active form changed.
    pub fn advance(&mut self) -> bool {
        let next = match (self.state, self.steady) {
            (SchemeState::Bootstrap1, SteadyScheme::Bdf2) => SchemeState::Steady,
            (SchemeState::Bootstrap1, SteadyScheme::Bdf3) => SchemeState::Bootstrap2,
            (SchemeState::Bootstrap2, _) => SchemeState::Steady,
            (SchemeState::Steady, _) => SchemeState::Steady,
        };
        let changed = next != self.state;
        self.state = next;
        changed
    }
}
