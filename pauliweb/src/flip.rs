//! Flip operators: single-edge Paulis dual to a basis of Pauli webs.
//!
//! For a generating set `g_0, g_1, ...` the flip operators `f_0, f_1, ...` satisfy `f_i`
//! anticommutes with `g_j` iff `i == j`, so the webs a fault anticommutes with can be read off
//! one flip at a time.

use crate::diagram::{Diagram, EdgeId, NodeId, NodeType};
use crate::error::{Result, WebError};
use crate::pauli::PauliString;
use crate::web::compute_pauli_webs;
use binar::{BitMatrix, Bitwise, EchelonForm};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Rebases `generators` so that it is dual to one single-edge flip per generator.
///
/// Each generator is restricted with `restriction`, the first edge of its support is turned into
/// the anticommuting single-edge flip, and every later or earlier generator anticommuting with
/// that flip gets the current generator multiplied in. Returns the flips and the rebased
/// generators, index by index.
///
/// ```
/// use pauliweb::flip::flip_operators;
/// use pauliweb::PauliString;
///
/// let generators: Vec<PauliString> = vec!["XX".parse().unwrap(), "ZZ".parse().unwrap()];
/// let (flips, rebased) = flip_operators(generators, Clone::clone).unwrap();
/// assert_eq!(flips[0], "Z".parse().unwrap());
/// assert!(!flips[0].commutes(&rebased[0]));
/// assert!(flips[0].commutes(&rebased[1]));
/// ```
///
/// # Errors
///
/// Returns [`WebError::NoFlipOperator`] if a rebased generator restricts to the identity.
pub fn flip_operators(
    generators: Vec<PauliString>,
    restriction: impl Fn(&PauliString) -> PauliString,
) -> Result<(Vec<PauliString>, Vec<PauliString>)> {
    let mut generators = generators;
    let mut flips = Vec::with_capacity(generators.len());
    for current in 0..generators.len() {
        let Some((edge, pauli)) = restriction(&generators[current]).iter().next() else {
            return Err(WebError::NoFlipOperator { generator: current });
        };
        let flip = PauliString::unary(edge, pauli.anticommuting());
        let pivot = generators[current].clone();
        for (other, generator) in generators.iter_mut().enumerate() {
            if other != current && !restriction(generator).commutes(&flip) {
                *generator *= &pivot;
            }
        }
        flips.push(flip);
    }
    Ok((flips, generators))
}

/// Flip operators of the detecting regions, with the stabilizer flips each of them implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFlips {
    pub flip_ops: Vec<PauliString>,
    /// For every region flip, the stabilizer generators it anticommutes with.
    pub stab_flip_map: Vec<BTreeSet<usize>>,
}

impl RegionFlips {
    fn new(flip_ops: Vec<PauliString>, stab_gen_set: &[PauliString]) -> RegionFlips {
        let stab_flip_map = flip_ops
            .iter()
            .map(|flip| {
                stab_gen_set
                    .iter()
                    .enumerate()
                    .filter(|(_, stabilizer)| !flip.commutes(stabilizer))
                    .map(|(index, _)| index)
                    .collect()
            })
            .collect();
        RegionFlips {
            flip_ops,
            stab_flip_map,
        }
    }
}

/// Web generators of a diagram together with their flip operators.
///
/// Stabilizer flips act on boundary edges only and are dual to the stabilizers restricted to the
/// boundary. Region flips are present when the regions are the diagram's own detecting regions,
/// and absent when the regions were replaced by detecting operators.
#[derive(Debug, Clone)]
pub struct FlipOperators {
    diagram: Arc<Diagram>,
    stab_flip_ops: Vec<PauliString>,
    stab_gen_set: Vec<PauliString>,
    region_gen_set: Vec<PauliString>,
    region_flips: Option<RegionFlips>,
}

/// Checks that every boundary node has exactly one edge and no edge joins two boundaries.
///
/// # Errors
///
/// Returns [`WebError::BoundaryAllocation`] otherwise.
pub fn check_boundary_allocation(diagram: &Diagram) -> Result<()> {
    for boundary in diagram.boundary_nodes() {
        let [edge] = diagram.incident_edges(boundary)[..] else {
            return Err(WebError::BoundaryAllocation);
        };
        if diagram
            .opposite(edge, boundary)
            .is_some_and(|other| diagram.node_type(other) == NodeType::Boundary)
        {
            return Err(WebError::BoundaryAllocation);
        }
    }
    Ok(())
}

impl FlipOperators {
    /// Computes the webs of `diagram` and their flip operators.
    ///
    /// # Errors
    ///
    /// Fails if the diagram's IO is virtual, if boundaries are not allocated one-to-one to edges,
    /// if web computation fails, or if a generator has no flip operator.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(diagram: Arc<Diagram>) -> Result<FlipOperators> {
        if diagram.is_io_virtual() {
            return Err(WebError::malformed_io("flip operators need real IO"));
        }
        check_boundary_allocation(&diagram)?;
        let webs = compute_pauli_webs(&diagram)?;
        let boundary_edges = diagram.boundary_edges();
        let (stab_flip_ops, stab_gen_set) =
            flip_operators(webs.stabilizers, |web| web.restrict(&boundary_edges))?;
        let (region_flip_ops, region_gen_set) = flip_operators(webs.regions, Clone::clone)?;
        let region_flips = RegionFlips::new(region_flip_ops, &stab_gen_set);
        tracing::debug!(
            stabilizers = stab_gen_set.len(),
            regions = region_gen_set.len(),
            "built flip operators"
        );
        Ok(FlipOperators {
            diagram,
            stab_flip_ops,
            stab_gen_set,
            region_gen_set,
            region_flips: Some(region_flips),
        })
    }

    #[must_use]
    pub fn diagram(&self) -> &Arc<Diagram> {
        &self.diagram
    }

    #[must_use]
    pub fn stab_flip_ops(&self) -> &[PauliString] {
        &self.stab_flip_ops
    }

    #[must_use]
    pub fn stab_gen_set(&self) -> &[PauliString] {
        &self.stab_gen_set
    }

    #[must_use]
    pub fn region_gen_set(&self) -> &[PauliString] {
        &self.region_gen_set
    }

    #[must_use]
    pub fn region_flips(&self) -> Option<&RegionFlips> {
        self.region_flips.as_ref()
    }

    /// Rebases the regions so that each logical operator anticommutes with exactly one region.
    ///
    /// For every logical, the first region not yet assigned to a logical that anticommutes with
    /// it is selected, and it is multiplied into every other anticommuting region. The region
    /// flips are updated to stay dual. Returns the rebased operators and the map from selected
    /// region to logical index.
    ///
    /// # Errors
    ///
    /// Fails with [`WebError::OperatorCount`] if there are more logicals than regions, and with
    /// [`WebError::SolveFailure`] if there are no region flips or no region can be selected for
    /// a logical.
    pub fn with_logicals(&self, logicals: &[PauliString]) -> Result<(FlipOperators, BTreeMap<usize, usize>)> {
        if logicals.len() > self.region_gen_set.len() {
            return Err(WebError::OperatorCount {
                expected: self.region_gen_set.len(),
                found: logicals.len(),
            });
        }
        let Some(region_flips) = &self.region_flips else {
            return Err(WebError::solve_failure("logicals without region flip operators"));
        };
        let mut region_gen_set = self.region_gen_set.clone();
        let mut region_flip_ops = region_flips.flip_ops.clone();
        let mut region_to_logical = BTreeMap::new();
        for (logical_index, logical) in logicals.iter().enumerate() {
            let anticommuting: Vec<usize> = region_gen_set
                .iter()
                .enumerate()
                .filter(|(_, region)| !region.commutes(logical))
                .map(|(index, _)| index)
                .collect();
            let Some(&selected) = anticommuting
                .iter()
                .find(|index| !region_to_logical.contains_key(*index))
            else {
                return Err(WebError::solve_failure(format!("a region anticommuting with logical {logical}")));
            };
            region_to_logical.insert(selected, logical_index);
            let pivot = region_gen_set[selected].clone();
            let mut dual = region_flip_ops[selected].clone();
            for other in anticommuting.into_iter().filter(|index| *index != selected) {
                region_gen_set[other] *= &pivot;
                dual *= &region_flip_ops[other];
            }
            region_flip_ops[selected] = dual;
        }
        let region_flips = RegionFlips::new(region_flip_ops, &self.stab_gen_set);
        Ok((
            FlipOperators {
                diagram: Arc::clone(&self.diagram),
                stab_flip_ops: self.stab_flip_ops.clone(),
                stab_gen_set: self.stab_gen_set.clone(),
                region_gen_set,
                region_flips: Some(region_flips),
            },
            region_to_logical,
        ))
    }

    /// Replaces the regions by one region per detecting operator.
    ///
    /// `operators` act on the edges of `measurement_nodes`. Every operator is expressed as the
    /// product of the regions whose restriction to those edges multiplies to it. The result has no
    /// region flips.
    ///
    /// # Errors
    ///
    /// Fails with [`WebError::SolveFailure`] if a measurement node has no edge or an operator is
    /// not a product of restricted regions.
    pub fn for_detecting_operators(
        &self,
        measurement_nodes: &[NodeId],
        operators: &[PauliString],
    ) -> Result<FlipOperators> {
        let mut measurement_edges: BTreeMap<EdgeId, usize> = BTreeMap::new();
        for node in measurement_nodes {
            let Some(edge) = self.diagram.incident_edges(*node).first().copied() else {
                return Err(WebError::solve_failure(format!("an edge at measurement node {node}")));
            };
            let next = measurement_edges.len();
            measurement_edges.entry(edge).or_insert(next);
        }
        let compiled = BitMatrix::from_row_iter(
            self.region_gen_set
                .iter()
                .map(|region| region.compile(&measurement_edges)),
            2 * measurement_edges.len(),
        );
        let echelon = EchelonForm::new(compiled);
        let region_gen_set = operators
            .iter()
            .map(|operator| {
                let coefficients = echelon
                    .solve(&operator.compile(&measurement_edges))
                    .ok_or_else(|| WebError::solve_failure(format!("detecting regions for operator {operator}")))?;
                let mut region = PauliString::new();
                for index in coefficients.support() {
                    region *= &self.region_gen_set[index];
                }
                Ok(region)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FlipOperators {
            diagram: Arc::clone(&self.diagram),
            stab_flip_ops: self.stab_flip_ops.clone(),
            stab_gen_set: self.stab_gen_set.clone(),
            region_gen_set,
            region_flips: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pauli::Pauli;

    #[test]
    fn flips_are_dual_to_rebased_generators() {
        let generators: Vec<PauliString> = ["XXI", "ZZI", "IZZ", "YIY"]
            .into_iter()
            .map(|dense| dense.parse().unwrap())
            .collect();
        let (flips, rebased) = flip_operators(generators, Clone::clone).unwrap();
        for (i, flip) in flips.iter().enumerate() {
            assert_eq!(flip.weight(), 1);
            for (j, generator) in rebased.iter().enumerate() {
                assert_eq!(flip.commutes(generator), i != j, "flip {i} against generator {j}");
            }
        }
    }

    #[test]
    fn dependent_generators_have_no_flip() {
        let generators: Vec<PauliString> = ["XX", "ZZ", "YY"].into_iter().map(|dense| dense.parse().unwrap()).collect();
        assert_eq!(
            flip_operators(generators, Clone::clone).unwrap_err(),
            WebError::NoFlipOperator { generator: 2 }
        );
    }

    #[test]
    fn connected_boundaries_are_rejected() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, output);
        diagram.set_io(vec![input], vec![output], false).unwrap();
        assert_eq!(
            FlipOperators::build(Arc::new(diagram)).unwrap_err(),
            WebError::BoundaryAllocation
        );
    }

    #[test]
    fn stabilizer_flips_live_on_the_boundary() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let first = diagram.add_node(NodeType::Z);
        let second = diagram.add_node(NodeType::X);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, first);
        diagram.add_edge(first, second);
        diagram.add_edge(second, output);
        diagram.set_io(vec![input], vec![output], false).unwrap();
        let flip_ops = FlipOperators::build(Arc::new(diagram)).unwrap();
        let boundary = flip_ops.diagram().boundary_edges();
        assert_eq!(flip_ops.stab_flip_ops().len(), 2);
        for flip in flip_ops.stab_flip_ops() {
            assert!(flip.support().all(|edge| boundary.contains(&edge)));
            assert_ne!(flip.iter().next().map(|(_, pauli)| pauli), Some(Pauli::I));
        }
        assert!(flip_ops.region_gen_set().is_empty());
        assert_eq!(flip_ops.region_flips().map(|flips| flips.flip_ops.len()), Some(0));
    }
}
