//! model::equilibrium — the three endogenous unknowns.
//!
//! An [`Equilibrium`] is the triple `(tw, sf, sm)`: the female-to-male wage
//! ratio and female and male schooling years. The Newton solver works on
//! `ndarray` vectors in this order; the conversions here are the only place
//! the layout is spelled out.
use ndarray::{array, Array1};
use serde::{Deserialize, Serialize};

/// Number of endogenous unknowns.
pub const EQUILIBRIUM_DIM: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    /// Female-to-male wage ratio.
    pub tw: f64,
    /// Female schooling years.
    pub sf: f64,
    /// Male schooling years.
    pub sm: f64,
}

impl Equilibrium {
    pub fn new(tw: f64, sf: f64, sm: f64) -> Self {
        Self { tw, sf, sm }
    }

    /// Read `(tw, sf, sm)` from a vector; `None` unless it has length 3.
    pub fn from_array(values: &Array1<f64>) -> Option<Self> {
        match values.as_slice() {
            Some(&[tw, sf, sm]) => Some(Self { tw, sf, sm }),
            _ if values.len() == EQUILIBRIUM_DIM => Some(Self::new(values[0], values[1], values[2])),
            _ => None,
        }
    }

    pub fn to_array(&self) -> Array1<f64> {
        array![self.tw, self.sf, self.sm]
    }

    /// Female-to-male schooling ratio `sf / sm`.
    pub fn schooling_ratio(&self) -> f64 {
        self.sf / self.sm
    }
}
