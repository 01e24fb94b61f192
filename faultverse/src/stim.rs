//! Import of the text format of stim circuits.
//!
//! Supported are the Clifford gates `H` and `CX`, Z-basis resets and measurements, Pauli and
//! depolarizing noise and the `DETECTOR` and `OBSERVABLE_INCLUDE` annotations. Every qubit starts
//! in `|0⟩`, drawn as a one-legged X spider, and a measurement attaches a one-legged X spider to
//! the wire before starting a fresh one. The circuit must end in measurements, so the resulting
//! diagram is closed.
//!
//! ```
//! use faultverse::stim::import_stim;
//!
//! let imported = import_stim(
//!     "R 0 1
//!      X_ERROR(0.01) 0
//!      CX 0 1
//!      M 0 1
//!      DETECTOR rec[-1] rec[-2]",
//! )
//! .unwrap();
//! assert_eq!(imported.measurement_nodes.len(), 2);
//! assert_eq!(imported.detectors.len(), 1);
//! assert_eq!(imported.noise.num_faults(), 1);
//! ```

use crate::error::{FaultError, Result};
use crate::fault::Fault;
use crate::noise::NoiseModel;
use itertools::iproduct;
use pauliweb::{All, Diagram, EdgeId, NodeId, NodeType, Pauli, PauliString, PositionedDiagram};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A closed diagram with its noise, read from a stim circuit.
#[derive(Debug, Clone)]
pub struct StimImport {
    pub diagram: Arc<Diagram>,
    /// One fault per independent error mechanism, valued by its probability.
    pub noise: NoiseModel<f64>,
    /// Measurement spiders in the order of the measurement record.
    pub measurement_nodes: Vec<NodeId>,
    /// Per observable index, the product of the measurement edge labels of its record entries.
    pub observables: BTreeMap<usize, PauliString>,
    /// Per detector, the product of the measurement edge labels of its record entries.
    pub detectors: Vec<PauliString>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Target {
    Qubit(usize),
    /// `rec[-k]`, looking back `k` measurements.
    Record(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Instruction {
    line: usize,
    name: String,
    args: Vec<f64>,
    targets: Vec<Target>,
}

impl Instruction {
    fn single_arg(&self) -> Result<f64> {
        match self.args.as_slice() {
            [arg] => Ok(*arg),
            args => Err(FaultError::parse(
                self.line,
                format!("{} takes one argument, got {}", self.name, args.len()),
            )),
        }
    }

    fn qubits(&self) -> Result<Vec<usize>> {
        self.targets
            .iter()
            .map(|target| match target {
                Target::Qubit(qubit) => Ok(*qubit),
                Target::Record(_) => Err(FaultError::parse(
                    self.line,
                    format!("{} expects qubit targets", self.name),
                )),
            })
            .collect()
    }

    fn qubit_pairs(&self) -> Result<Vec<(usize, usize)>> {
        let qubits = self.qubits()?;
        if qubits.len() % 2 != 0 {
            return Err(FaultError::parse(
                self.line,
                format!("{} expects pairs of qubits", self.name),
            ));
        }
        qubits
            .chunks_exact(2)
            .map(|pair| {
                if pair[0] == pair[1] {
                    Err(FaultError::parse(
                        self.line,
                        format!("{} on qubit {} twice", self.name, pair[0]),
                    ))
                } else {
                    Ok((pair[0], pair[1]))
                }
            })
            .collect()
    }

    fn lookbacks(&self) -> Result<Vec<usize>> {
        self.targets
            .iter()
            .map(|target| match target {
                Target::Record(lookback) => Ok(*lookback),
                Target::Qubit(_) => Err(FaultError::parse(
                    self.line,
                    format!("{} expects measurement record targets", self.name),
                )),
            })
            .collect()
    }
}

fn parse_target(line: usize, token: &str) -> Result<Target> {
    if let Some(lookback) = token.strip_prefix("rec[-").and_then(|rest| rest.strip_suffix(']')) {
        return lookback
            .parse()
            .map(Target::Record)
            .map_err(|_| FaultError::parse(line, format!("bad measurement record target {token}")));
    }
    token
        .parse()
        .map(Target::Qubit)
        .map_err(|_| FaultError::unsupported(format!("target {token}")))
}

fn parse_line(line: usize, text: &str) -> Result<Option<Instruction>> {
    let text = text.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.contains('{') || text.contains('}') {
        return Err(FaultError::unsupported("REPEAT blocks"));
    }
    let (name, args, rest) = match text.find('(') {
        Some(open) => {
            let close = text[open..]
                .find(')')
                .map(|close| open + close)
                .ok_or_else(|| FaultError::parse(line, "unclosed argument list"))?;
            let args = text[open + 1..close]
                .split(',')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .map(|arg| {
                    arg.parse::<f64>()
                        .map_err(|_| FaultError::parse(line, format!("bad argument {arg}")))
                })
                .collect::<Result<Vec<_>>>()?;
            (text[..open].trim(), args, &text[close + 1..])
        }
        None => {
            let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
            (name, Vec::new(), rest)
        }
    };
    let targets = rest
        .split_whitespace()
        .map(|token| parse_target(line, token))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Instruction {
        line,
        name: name.to_ascii_uppercase(),
        args,
        targets,
    }))
}

/// A fault waiting for the next edge of each of its qubits.
struct PendingFault {
    waiting: BTreeMap<usize, Pauli>,
    placed: Vec<(EdgeId, Pauli)>,
    probability: f64,
}

#[derive(Default)]
struct CircuitBuilder {
    diagram: Diagram,
    wires: Vec<Option<NodeId>>,
    column: f64,
    pending: Vec<PendingFault>,
    faults: Vec<(Fault, f64)>,
    measurement_nodes: Vec<NodeId>,
    detectors: Vec<Vec<NodeId>>,
    observables: BTreeMap<usize, Vec<NodeId>>,
}

#[allow(clippy::cast_precision_loss)]
fn row(qubit: usize) -> f64 {
    qubit as f64
}

impl CircuitBuilder {
    fn new() -> CircuitBuilder {
        CircuitBuilder {
            column: 1.0,
            ..CircuitBuilder::default()
        }
    }

    fn add_node_at(&mut self, node_type: NodeType, x: f64, qubit: usize) -> NodeId {
        let node = self.diagram.add_node(node_type);
        self.diagram.set_position(node, x, row(qubit));
        node
    }

    fn wire(&mut self, qubit: usize) -> &mut Option<NodeId> {
        if self.wires.len() <= qubit {
            self.wires.resize(qubit + 1, None);
        }
        &mut self.wires[qubit]
    }

    /// The current node of `qubit`, preparing `|0⟩` first if the qubit is fresh.
    fn current(&mut self, qubit: usize) -> NodeId {
        if let Some(node) = *self.wire(qubit) {
            return node;
        }
        let node = self.add_node_at(NodeType::X, self.column - 1.0, qubit);
        *self.wire(qubit) = Some(node);
        node
    }

    /// Extends the wire of `qubit` by `node` and places the faults waiting on it.
    fn extend_wire(&mut self, qubit: usize, node: NodeId) -> EdgeId {
        let current = self.current(qubit);
        let edge = self.diagram.add_edge(current, node);
        *self.wire(qubit) = Some(node);
        self.flush(qubit, edge);
        edge
    }

    fn flush(&mut self, qubit: usize, edge: EdgeId) {
        let faults = &mut self.faults;
        self.pending.retain_mut(|pending| {
            let Some(pauli) = pending.waiting.remove(&qubit) else {
                return true;
            };
            pending.placed.push((edge, pauli));
            if !pending.waiting.is_empty() {
                return true;
            }
            let edge_flips: PauliString = pending.placed.drain(..).collect();
            faults.push((Fault::from(edge_flips), pending.probability));
            false
        });
    }

    fn queue_fault(&mut self, paulis: impl IntoIterator<Item = (usize, Pauli)>, probability: f64) {
        self.pending.push(PendingFault {
            waiting: paulis.into_iter().collect(),
            placed: Vec::new(),
            probability,
        });
    }

    fn recorded_nodes(&self, instruction: &Instruction) -> Result<Vec<NodeId>> {
        let available = self.measurement_nodes.len();
        instruction
            .lookbacks()?
            .into_iter()
            .map(|lookback| {
                if lookback == 0 || lookback > available {
                    Err(FaultError::MeasurementRecord { lookback, available })
                } else {
                    Ok(self.measurement_nodes[available - lookback])
                }
            })
            .collect()
    }

    fn hadamard(&mut self, instruction: &Instruction) -> Result<()> {
        for qubit in instruction.qubits()? {
            let node = self.add_node_at(NodeType::H, self.column, qubit);
            self.extend_wire(qubit, node);
        }
        self.column += 1.0;
        Ok(())
    }

    fn cnot(&mut self, instruction: &Instruction) -> Result<()> {
        for (control_qubit, target_qubit) in instruction.qubit_pairs()? {
            let control = self.add_node_at(NodeType::Z, self.column, control_qubit);
            let target = self.add_node_at(NodeType::X, self.column, target_qubit);
            self.extend_wire(control_qubit, control);
            self.extend_wire(target_qubit, target);
            self.diagram.add_edge(control, target);
            self.column += 1.0;
        }
        Ok(())
    }

    /// Measures (silently unless `record`) and restarts the wire in `|0⟩`.
    fn measure_and_reset(&mut self, qubit: usize, record: bool) {
        let measurement = self.add_node_at(NodeType::X, self.column, qubit);
        self.extend_wire(qubit, measurement);
        if record {
            self.measurement_nodes.push(measurement);
        }
        let reset = self.add_node_at(NodeType::X, self.column + 1.0, qubit);
        *self.wire(qubit) = Some(reset);
    }

    fn reset(&mut self, instruction: &Instruction) -> Result<()> {
        for qubit in instruction.qubits()? {
            if self.wire(qubit).is_some() {
                self.measure_and_reset(qubit, false);
            } else {
                let reset = self.add_node_at(NodeType::X, self.column + 1.0, qubit);
                *self.wire(qubit) = Some(reset);
            }
        }
        self.column += 2.0;
        Ok(())
    }

    fn measure(&mut self, instruction: &Instruction) -> Result<()> {
        for qubit in instruction.qubits()? {
            self.measure_and_reset(qubit, true);
        }
        self.column += 2.0;
        Ok(())
    }

    fn pauli_error(&mut self, instruction: &Instruction, pauli: Pauli) -> Result<()> {
        let probability = instruction.single_arg()?;
        for qubit in instruction.qubits()? {
            self.queue_fault([(qubit, pauli)], probability);
        }
        Ok(())
    }

    /// Depolarizing noise as independent Pauli channels.
    fn depolarize1(&mut self, instruction: &Instruction) -> Result<()> {
        let probability = 0.5 - 0.5 * (1.0 - 4.0 * instruction.single_arg()? / 3.0).sqrt();
        for qubit in instruction.qubits()? {
            for pauli in Pauli::NON_IDENTITY {
                self.queue_fault([(qubit, pauli)], probability);
            }
        }
        Ok(())
    }

    fn depolarize2(&mut self, instruction: &Instruction) -> Result<()> {
        let probability = 0.5 - 0.5 * (1.0 - 16.0 * instruction.single_arg()? / 15.0).powf(0.125);
        for (first, second) in instruction.qubit_pairs()? {
            for (first_pauli, second_pauli) in iproduct!(Pauli::all(), Pauli::all()) {
                if first_pauli == Pauli::I && second_pauli == Pauli::I {
                    continue;
                }
                self.queue_fault([(first, first_pauli), (second, second_pauli)], probability);
            }
        }
        Ok(())
    }

    fn detector(&mut self, instruction: &Instruction) -> Result<()> {
        let nodes = self.recorded_nodes(instruction)?;
        self.detectors.push(nodes);
        Ok(())
    }

    fn observable(&mut self, instruction: &Instruction) -> Result<()> {
        let index = instruction.single_arg()?;
        if index < 0.0 || index.fract() != 0.0 {
            return Err(FaultError::parse(instruction.line, format!("bad observable index {index}")));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index as usize;
        let nodes = self.recorded_nodes(instruction)?;
        self.observables.entry(index).or_default().extend(nodes);
        Ok(())
    }

    fn apply(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction.name.as_str() {
            "H" => self.hadamard(instruction),
            "CX" | "CNOT" | "ZCX" => self.cnot(instruction),
            "R" | "RZ" => self.reset(instruction),
            "M" | "MZ" | "MR" | "MRZ" => self.measure(instruction),
            "X_ERROR" => self.pauli_error(instruction, Pauli::X),
            "Y_ERROR" => self.pauli_error(instruction, Pauli::Y),
            "Z_ERROR" => self.pauli_error(instruction, Pauli::Z),
            "DEPOLARIZE1" => self.depolarize1(instruction),
            "DEPOLARIZE2" => self.depolarize2(instruction),
            "DETECTOR" => self.detector(instruction),
            "OBSERVABLE_INCLUDE" => self.observable(instruction),
            "TICK" | "QUBIT_COORDS" | "SHIFT_COORDS" => Ok(()),
            "REPEAT" => Err(FaultError::unsupported("REPEAT blocks")),
            name => Err(FaultError::unsupported(format!("instruction {name}"))),
        }
    }

    /// Drops the trailing reset of every wire and closes up the rows of unused qubits.
    fn close(&mut self) -> Result<()> {
        let mut unused = 0;
        for qubit in 0..self.wires.len() {
            let Some(node) = self.wires[qubit] else {
                let threshold = row(qubit - unused);
                let shifted: Vec<NodeId> = self
                    .diagram
                    .node_indices()
                    .filter(|node| self.diagram.y(*node) >= threshold)
                    .collect();
                for node in shifted {
                    let (x, y) = (self.diagram.x(node), self.diagram.y(node));
                    self.diagram.set_position(node, x, y - 1.0);
                }
                unused += 1;
                continue;
            };
            if self.diagram.degree(node) != 0 {
                return Err(FaultError::UnmeasuredQubit(qubit));
            }
            self.diagram.remove_node(node);
        }
        if !self.pending.is_empty() {
            tracing::debug!(dropped = self.pending.len(), "faults after the last operation on their qubits");
        }
        self.diagram.set_io(vec![], vec![], false)?;
        Ok(())
    }

    /// The labels a detecting region carries on the edges of the given measurement spiders, each
    /// spider contributing the Pauli its own firing places there.
    fn measurement_paulis(&self, nodes: &[NodeId]) -> PauliString {
        nodes
            .iter()
            .flat_map(|node| {
                let pauli = match self.diagram.node_type(*node) {
                    NodeType::Z => Pauli::X,
                    _ => Pauli::Z,
                };
                self.diagram
                    .incident_edges(*node)
                    .first()
                    .map(|edge| (*edge, pauli))
            })
            .collect()
    }

    fn finish(mut self) -> Result<StimImport> {
        self.close()?;
        let detectors = self
            .detectors
            .iter()
            .map(|nodes| self.measurement_paulis(nodes))
            .collect();
        let observables = self
            .observables
            .iter()
            .map(|(index, nodes)| (*index, self.measurement_paulis(nodes)))
            .collect();
        let diagram = Arc::new(self.diagram);
        let noise = NoiseModel::from_faults(Arc::clone(&diagram), self.faults);
        Ok(StimImport {
            diagram,
            noise,
            measurement_nodes: self.measurement_nodes,
            observables,
            detectors,
        })
    }
}

/// Reads a stim circuit into a closed diagram with a probability valued noise model.
///
/// # Errors
///
/// Fails with [`FaultError::Unsupported`] on `REPEAT` blocks and on unknown instructions or
/// targets, with [`FaultError::Parse`] on malformed instructions, with
/// [`FaultError::MeasurementRecord`] if a record target reaches before the first measurement and
/// with [`FaultError::UnmeasuredQubit`] if a used qubit does not end in a measurement or reset.
#[tracing::instrument(level = "debug", skip_all)]
pub fn import_stim(text: &str) -> Result<StimImport> {
    let mut builder = CircuitBuilder::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(instruction) = parse_line(index + 1, line)? {
            builder.apply(&instruction)?;
        }
    }
    let imported = builder.finish()?;
    tracing::debug!(
        nodes = imported.diagram.node_count(),
        faults = imported.noise.num_faults(),
        measurements = imported.measurement_nodes.len(),
        detectors = imported.detectors.len(),
        "imported stim circuit"
    );
    Ok(imported)
}
