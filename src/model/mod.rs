//! model — gendered time allocation, schooling and structural change.
//!
//! Purpose
//! -------
//! Encode the closed-form general-equilibrium model whose equilibrium is
//! the triple `(tw, sf, sm)`: the female-to-male wage ratio and the
//! schooling years of women and men. Households split time between six
//! production indices (agriculture, manufacturing, services, each with a
//! traditional and a modern technology) and leisure.
//!
//! Key behaviors
//! -------------
//! - `index`, `params`, `inputs`: the taxonomy, the fixed constants, the
//!   free-parameter schema and the observed group records.
//! - `primitives`: discounting, human capital, schooling costs, wage bills.
//! - `expenditure`: resolution of relative expenditures between any two
//!   production indices through chains of productivity ratios, done once
//!   per [`data::Economy`].
//! - `snapshot`, `allocation`, `subsistence`: every quantity of the economy
//!   at one equilibrium candidate, cached in a [`snapshot::Snapshot`].
//! - `foc`: the three first-order conditions and their
//!   [`crate::solver::traits::ResidualSystem`] implementation.
//!
//! Invariants & assumptions
//! ------------------------
//! - An `Economy` is immutable; a calibration trial builds a fresh one from
//!   the mutated [`data::ModelData`].
//! - Every ordered pair of production indices has a resolvable relative
//!   expenditure under the standard productivity schema; other schemas are
//!   rejected when the economy is built.
//! - Functions of an equilibrium are pure. Numerical trouble shows up as
//!   non-finite values which the Newton solver rejects.
//!
//! Conventions
//! -----------
//! - Flow indices are ordered `Ah, Mh, Sh, Ar, Mr, Sr, l`; arrays of seven
//!   shares follow that order.
//! - Productivity parameters are written `Z_<over><under>`, e.g. `Z_ArAh`.
//!
//! Testing notes
//! -------------
//! - Unit tests per submodule; the end-to-end solve of the reference economy
//!   lives in the integration tests.

pub mod allocation;
pub mod data;
pub mod equilibrium;
pub mod errors;
pub mod expenditure;
pub mod foc;
pub mod index;
pub mod inputs;
pub mod params;
pub mod primitives;
pub mod snapshot;
pub mod subsistence;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use schooling_gap::model::prelude::*;
//
// to import the model surface in a single line.

pub mod prelude {
    pub use super::data::{Economy, ModelData};
    pub use super::equilibrium::Equilibrium;
    pub use super::errors::{ModelError, ModelResult};
    pub use super::expenditure::{Expenditure, ExpenditureTable, ProductivityGraph};
    pub use super::foc::{ConsistencyWarning, FocSystem};
    pub use super::index::{FlowIndex, Gender, ProductionIndex, Sector, Technology};
    pub use super::inputs::{AllocationShares, GroupData, GroupTable, IncomeGroup};
    pub use super::params::{Bounds, FixedParams, FreeParams, ParamKey, Subsistence};
    pub use super::snapshot::Snapshot;
}
