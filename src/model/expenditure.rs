//! model::expenditure — relative consumption expenditure between indices.
//!
//! Purpose
//! -------
//! Resolve, for any ordered pair of production indices `(over, under)`, a
//! closed-form expression for the relative expenditure `E(over, under)`
//! as a function of the equilibrium, and extend it to leisure.
//!
//! Key behaviors
//! -------------
//! - The calibrated productivity ratios `Z_{over}{under}` form a small
//!   undirected graph over the six production indices
//!   ([`ProductivityGraph`]).
//! - [`resolve`] turns a pair into an [`Expenditure`] tree:
//!   - identical indices give [`Expenditure::Unit`];
//!   - a calibrated ratio gives a direct node, same-sector or cross-sector;
//!     the cross-sector form embeds the resolved own-sector pairs of both
//!     indices;
//!   - a calibrated ratio in the opposite orientation gives the reciprocal;
//!   - otherwise a breadth-first search finds the shortest chain of
//!     calibrated ratios (at most [`MAX_INTERMEDIATES`] intermediate
//!     indices) and the links are multiplied.
//! - [`ExpenditureTable`] resolves all 36 pairs once per parameter vector,
//!   so evaluating a pair at an equilibrium never fails.
//! - Leisure relations are derived from the production table, the sectoral
//!   expenditure shares and the non-subsistence consumption share.
//!
//! Invariants & assumptions
//! ------------------------
//! - `E(A, A) == 1` exactly and `E(A, B) E(B, A) == 1` up to rounding:
//!   chains are always resolved from the lower-positioned index and the
//!   other orientation is their reciprocal.
//! - A pair the graph cannot connect is a configuration error
//!   ([`ModelError::NoProductivityPath`]) raised at resolution time.
//! - Cross-sector nodes that need themselves to be defined are cut off by
//!   a depth guard ([`ModelError::ResolutionDepthExceeded`]).
use std::collections::VecDeque;

use crate::model::{
    errors::{ModelError, ModelResult},
    index::{FlowIndex, ProductionIndex, Sector},
    params::{FixedParams, FreeParams, ParamKey},
    primitives::LifeCycle,
};

/// Longest admissible chain, counted in intermediate indices.
pub const MAX_INTERMEDIATES: usize = 3;

const MAX_DEPTH: usize = 12;

/// Undirected graph of calibrated productivity ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductivityGraph {
    edges: Vec<(ProductionIndex, ProductionIndex, f64)>,
}

impl ProductivityGraph {
    pub fn new(edges: Vec<(ProductionIndex, ProductionIndex, f64)>) -> Self {
        Self { edges }
    }

    /// Graph of the productivity entries of a free-parameter schema.
    ///
    /// # Errors
    /// [`ModelError::UnsetParameter`] for a productivity without a value.
    pub fn from_free(free: &FreeParams) -> ModelResult<Self> {
        let edges = free
            .productivities()
            .into_iter()
            .map(|(over, under, value)| {
                value.map(|z| (over, under, z)).ok_or_else(|| ModelError::UnsetParameter {
                    key: ParamKey::Productivity { over, under }.label(),
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self { edges })
    }

    /// Calibrated `Z_{over}{under}` in this orientation.
    pub fn ratio(&self, over: ProductionIndex, under: ProductionIndex) -> Option<f64> {
        self.edges.iter().find(|(o, u, _)| *o == over && *u == under).map(|(_, _, z)| *z)
    }

    fn neighbours(&self, node: ProductionIndex) -> impl Iterator<Item = ProductionIndex> + '_ {
        self.edges.iter().filter_map(move |&(o, u, _)| {
            if o == node {
                Some(u)
            } else if u == node {
                Some(o)
            } else {
                None
            }
        })
    }

    /// Shortest chain `[over, k1, ..., under]` of calibrated ratios.
    ///
    /// # Errors
    /// [`ModelError::NoProductivityPath`] when the indices are disconnected
    /// or need more than [`MAX_INTERMEDIATES`] intermediate indices.
    pub fn path(
        &self, over: ProductionIndex, under: ProductionIndex,
    ) -> ModelResult<Vec<ProductionIndex>> {
        let mut previous: [Option<ProductionIndex>; 6] = [None; 6];
        let mut seen = [false; 6];
        let mut queue = VecDeque::from([over]);
        seen[over.position()] = true;
        while let Some(node) = queue.pop_front() {
            if node == under {
                break;
            }
            for next in self.neighbours(node) {
                if !seen[next.position()] {
                    seen[next.position()] = true;
                    previous[next.position()] = Some(node);
                    queue.push_back(next);
                }
            }
        }
        if !seen[under.position()] {
            return Err(ModelError::NoProductivityPath { over, under });
        }
        let mut path = vec![under];
        let mut node = under;
        while let Some(prev) = previous[node.position()] {
            path.push(prev);
            node = prev;
        }
        path.reverse();
        if path.len() > MAX_INTERMEDIATES + 2 {
            return Err(ModelError::NoProductivityPath { over, under });
        }
        Ok(path)
    }
}

/// Closed-form relative expenditure of one ordered pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Expenditure {
    Unit,
    /// Calibrated ratio within a sector.
    SameSector { over: ProductionIndex, under: ProductionIndex, productivity: f64 },
    /// Calibrated ratio across sectors, carrying the own-sector relations
    /// `E(over, over')` and `E(under, under')`.
    CrossSector {
        over: ProductionIndex,
        under: ProductionIndex,
        productivity: f64,
        over_own: Box<Expenditure>,
        under_own: Box<Expenditure>,
    },
    Inverse(Box<Expenditure>),
    Chain(Vec<Expenditure>),
}

/// Equilibrium-dependent inputs of an [`Expenditure`] evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub fixed: &'a FixedParams,
    pub life: &'a LifeCycle,
    /// Female wage bills in [`FlowIndex::ALL`] order.
    pub female_wage: &'a [f64; 7],
}

impl PricingContext<'_> {
    fn wage(&self, idx: ProductionIndex) -> f64 {
        self.female_wage[idx.position()]
    }
}

impl Expenditure {
    pub fn eval(&self, ctx: &PricingContext<'_>) -> f64 {
        match self {
            Expenditure::Unit => 1.0,
            Expenditure::SameSector { over, under, productivity } => {
                let (fixed, life) = (ctx.fixed, ctx.life);
                let eta = fixed.eta;
                let xi_ratio = fixed.xi((*over).into()) / fixed.xi((*under).into());
                let wage_ratio = ctx.wage(*under) / ctx.wage(*over);
                (productivity
                    * xi_ratio.powf(eta / (eta - 1.0))
                    * wage_ratio.powf(1.0 / (eta - 1.0))
                    * life.d_female
                    * life.h_female
                    / life.d_zero)
                    .powf(fixed.sigma - 1.0)
            }
            Expenditure::CrossSector { over, under, productivity, over_own, under_own } => {
                let fixed = ctx.fixed;
                let (eta, sigma, epsilon) = (fixed.eta, fixed.sigma, fixed.epsilon);
                let xi_ratio = fixed.xi((*over).into()) / fixed.xi((*under).into());
                let wage_ratio = ctx.wage(*over) / ctx.wage(*under);
                let e_over = over_own.eval(ctx);
                let e_under = under_own.eval(ctx);
                productivity.powf(epsilon - 1.0)
                    * (xi_ratio.powf(eta / (eta - 1.0)) * wage_ratio.powf(1.0 / (1.0 - eta)))
                        .powf(epsilon - 1.0)
                    * (1.0 + 1.0 / e_under).powf((sigma - epsilon) / (sigma - 1.0))
                    * (1.0 + 1.0 / e_over).powf((epsilon - sigma) / (sigma - 1.0))
            }
            Expenditure::Inverse(inner) => 1.0 / inner.eval(ctx),
            Expenditure::Chain(links) => links.iter().map(|link| link.eval(ctx)).product(),
        }
    }
}

/// Resolve `E(over, under)` against the productivity graph.
///
/// # Errors
/// - [`ModelError::NoProductivityPath`] when no admissible chain exists.
/// - [`ModelError::ResolutionDepthExceeded`] for self-referential
///   cross-sector definitions.
pub fn resolve(
    graph: &ProductivityGraph, over: ProductionIndex, under: ProductionIndex,
) -> ModelResult<Expenditure> {
    resolve_at(graph, over, under, 0)
}

fn resolve_at(
    graph: &ProductivityGraph, over: ProductionIndex, under: ProductionIndex, depth: usize,
) -> ModelResult<Expenditure> {
    if depth > MAX_DEPTH {
        return Err(ModelError::ResolutionDepthExceeded { over, under, depth });
    }
    if over == under {
        return Ok(Expenditure::Unit);
    }
    if let Some(productivity) = graph.ratio(over, under) {
        if over.sector == under.sector {
            return Ok(Expenditure::SameSector { over, under, productivity });
        }
        let over_own = resolve_at(graph, over, over.counterpart(), depth + 1)?;
        let under_own = resolve_at(graph, under, under.counterpart(), depth + 1)?;
        return Ok(Expenditure::CrossSector {
            over,
            under,
            productivity,
            over_own: Box::new(over_own),
            under_own: Box::new(under_own),
        });
    }
    if graph.ratio(under, over).is_some() || over.position() > under.position() {
        let inverse = resolve_at(graph, under, over, depth + 1)?;
        return Ok(Expenditure::Inverse(Box::new(inverse)));
    }
    let path = graph.path(over, under)?;
    let links = path
        .windows(2)
        .map(|pair| resolve_at(graph, pair[0], pair[1], depth + 1))
        .collect::<ModelResult<Vec<_>>>()?;
    Ok(Expenditure::Chain(links))
}

/// Resolved expressions for all ordered pairs of production indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenditureTable {
    entries: Vec<Expenditure>,
}

impl ExpenditureTable {
    /// # Errors
    /// The first resolution error over the 36 pairs.
    pub fn resolve(graph: &ProductivityGraph) -> ModelResult<Self> {
        let mut entries = Vec::with_capacity(36);
        for over in ProductionIndex::ALL {
            for under in ProductionIndex::ALL {
                entries.push(resolve(graph, over, under)?);
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, over: ProductionIndex, under: ProductionIndex) -> &Expenditure {
        &self.entries[over.position() * 6 + under.position()]
    }

    /// Evaluate every pair; row `over`, column `under`.
    pub fn evaluate(&self, ctx: &PricingContext<'_>) -> [[f64; 6]; 6] {
        let mut values = [[1.0; 6]; 6];
        for over in ProductionIndex::ALL {
            for under in ProductionIndex::ALL {
                values[over.position()][under.position()] = self.get(over, under).eval(ctx);
            }
        }
        values
    }
}

/// Share of each sector in commodity expenditure, indexed by
/// [`Sector::position`].
///
/// `E_j = 1 / sum_i [A_j (1 + E(ir, ih)) / E(jr, ih)]` with
/// `A_j = E(jr, jh) / (1 + E(jr, jh))`.
pub fn sector_shares(e: &[[f64; 6]; 6]) -> [f64; 3] {
    let rel = |over: ProductionIndex, under: ProductionIndex| e[over.position()][under.position()];
    let mut shares = [0.0; 3];
    for sector in Sector::ALL {
        let own = rel(sector.modern(), sector.traditional());
        let scale = own / (1.0 + own);
        let total: f64 = Sector::ALL
            .iter()
            .map(|other| {
                scale * (1.0 + rel(other.modern(), other.traditional()))
                    / rel(sector.modern(), other.traditional())
            })
            .sum();
        shares[sector.position()] = 1.0 / total;
    }
    shares
}

/// Leisure-over-production expenditure `E(l, X)` for the six production
/// indices.
///
/// For a modern index `E(l, Xr) = varphi nsub / E_X (1 + E(Xh, Xr))`; a
/// traditional index composes it with the modern step,
/// `E(l, Xh) = E(l, Xr) E(Xr, Xh)`.
pub fn leisure_expenditure(
    varphi: f64, non_subsistence: f64, shares: &[f64; 3], e: &[[f64; 6]; 6],
) -> [f64; 6] {
    let mut values = [0.0; 6];
    for sector in Sector::ALL {
        let (modern, traditional) = (sector.modern(), sector.traditional());
        let over_modern = varphi * non_subsistence / shares[sector.position()]
            * (1.0 + e[traditional.position()][modern.position()]);
        values[modern.position()] = over_modern;
        values[traditional.position()] =
            over_modern * e[modern.position()][traditional.position()];
    }
    values
}

/// `E(over, under)` over flow indices given the production table and the
/// leisure row.
pub fn flow_expenditure(
    e: &[[f64; 6]; 6], leisure: &[f64; 6], over: FlowIndex, under: FlowIndex,
) -> f64 {
    match (over, under) {
        (FlowIndex::Leisure, FlowIndex::Leisure) => 1.0,
        (FlowIndex::Production(p), FlowIndex::Leisure) => 1.0 / leisure[p.position()],
        (FlowIndex::Leisure, FlowIndex::Production(p)) => leisure[p.position()],
        (FlowIndex::Production(o), FlowIndex::Production(u)) => e[o.position()][u.position()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{equilibrium::Equilibrium, index::FlowIndex};
    use approx::assert_relative_eq;

    const AH: ProductionIndex = ProductionIndex::AH;
    const MH: ProductionIndex = ProductionIndex::MH;
    const SH: ProductionIndex = ProductionIndex::SH;
    const AR: ProductionIndex = ProductionIndex::AR;
    const MR: ProductionIndex = ProductionIndex::MR;
    const SR: ProductionIndex = ProductionIndex::SR;

    fn standard_graph() -> ProductivityGraph {
        ProductivityGraph::new(vec![
            (AR, AH, 0.15),
            (MR, MH, 2.0),
            (SR, SH, 0.17),
            (AR, SR, 3.0),
            (MR, SR, 13.0),
        ])
    }

    #[test]
    // Purpose
    // -------
    // The resolver picks the simplest form available for each pair.
    //
    // Given
    // -----
    // - The five calibrated ratios of the default schema.
    //
    // Expect
    // ------
    // - Unit on the diagonal, a same-sector node for `(Ar, Ah)`, its
    //   reciprocal for `(Ah, Ar)`, a cross-sector node for `(Ar, Sr)` and a
    //   four-link chain for `(Ah, Mh)`.
    fn resolver_shapes() {
        let g = standard_graph();
        assert_eq!(resolve(&g, SH, SH).unwrap(), Expenditure::Unit);
        assert!(matches!(resolve(&g, AR, AH).unwrap(), Expenditure::SameSector { .. }));
        assert!(matches!(resolve(&g, AH, AR).unwrap(), Expenditure::Inverse(_)));
        assert!(matches!(resolve(&g, AR, SR).unwrap(), Expenditure::CrossSector { .. }));
        match resolve(&g, AH, MH).unwrap() {
            Expenditure::Chain(links) => assert_eq!(links.len(), 4),
            other => panic!("expected chain, got {other:?}"),
        }
        assert!(matches!(resolve(&g, MH, AH).unwrap(), Expenditure::Inverse(_)));
    }

    #[test]
    // Purpose
    // -------
    // Disconnected pairs are reported instead of silently resolved.
    //
    // Given
    // -----
    // - The default graph without `Z_MrSr`, which cuts manufacturing off.
    //
    // Expect
    // ------
    // - `NoProductivityPath` for `(Ar, Mr)`, and the whole table fails.
    fn disconnected_pair_is_an_error() {
        let g = ProductivityGraph::new(vec![(AR, AH, 0.15), (MR, MH, 2.0), (SR, SH, 0.17), (AR, SR, 3.0)]);
        assert_eq!(resolve(&g, AR, MR), Err(ModelError::NoProductivityPath { over: AR, under: MR }));
        assert!(ExpenditureTable::resolve(&g).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Chains longer than three intermediate indices are rejected.
    //
    // Given
    // -----
    // - A line graph `Ah - Ar - Sr - Sh - Mh - Mr`.
    //
    // Expect
    // ------
    // - `(Ah, Mh)` resolves (three intermediates) and `(Ah, Mr)` does not
    //   (four intermediates).
    fn chain_length_is_bounded() {
        let g = ProductivityGraph::new(vec![
            (AR, AH, 0.15),
            (AR, SR, 3.0),
            (SR, SH, 0.17),
            (SH, MH, 1.0),
            (MR, MH, 2.0),
        ]);
        assert_eq!(g.path(AH, MH).unwrap(), vec![AH, AR, SR, SH, MH]);
        assert_eq!(g.path(AH, MR), Err(ModelError::NoProductivityPath { over: AH, under: MR }));
    }

    #[test]
    // Purpose
    // -------
    // Self-referential cross-sector definitions terminate with an error.
    //
    // Given
    // -----
    // - Only cross-sector ratios `Z_ArSr` and `Z_AhSh` plus `Z_SrSh`, so the
    //   agriculture own-sector relation needs `E(Ar, Sr)` which needs it.
    //
    // Expect
    // ------
    // - `ResolutionDepthExceeded`.
    fn cyclic_definitions_hit_the_depth_guard() {
        let g = ProductivityGraph::new(vec![(AR, SR, 3.0), (AH, SH, 1.0), (SR, SH, 0.17)]);
        assert!(matches!(
            resolve(&g, AR, SR),
            Err(ModelError::ResolutionDepthExceeded { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Evaluated pairs are reciprocal and sector shares sum to one.
    //
    // Given
    // -----
    // - The default graph, `xi = 1/2` everywhere and an arbitrary
    //   equilibrium.
    //
    // Expect
    // ------
    // - `E(A, B) E(B, A) = 1` to 1e-12 for all pairs, `E(A, A) = 1`
    //   exactly, and `sum_j E_j = 1`.
    fn evaluated_table_properties() {
        let fixed = FixedParams::with_life_expectancy(40.0, 1.0);
        let eq = Equilibrium::new(0.8, 8.0, 10.0);
        let life = LifeCycle::at(&fixed, &eq);
        let wages: [f64; 7] = std::array::from_fn(|i| {
            crate::model::primitives::female_wage_bill(&fixed, FlowIndex::ALL[i], eq.tw, &life)
        });
        let ctx = PricingContext { fixed: &fixed, life: &life, female_wage: &wages };
        let table = ExpenditureTable::resolve(&standard_graph()).unwrap();
        let e = table.evaluate(&ctx);
        for a in 0..6 {
            assert_eq!(e[a][a], 1.0);
            for b in 0..6 {
                assert_relative_eq!(e[a][b] * e[b][a], 1.0, max_relative = 1e-12);
            }
        }
        let shares = sector_shares(&e);
        assert_relative_eq!(shares.iter().sum::<f64>(), 1.0, max_relative = 1e-10);
    }
}
