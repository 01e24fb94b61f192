use crate::pauli::{Pauli, PauliString};

/// The six stabilizers of the 7-qubit Steane code, X-type first.
#[must_use]
pub fn steane_code_stabilisers() -> Vec<PauliString> {
    ["IIIXXXX", "IXXIIXX", "XIXIXIX", "IIIZZZZ", "IZZIIZZ", "ZIZIZIZ"]
        .into_iter()
        .map(|dense| {
            dense
                .chars()
                .enumerate()
                .filter_map(|(qubit, character)| Pauli::try_from(character).ok().map(|pauli| (qubit, pauli)))
                .collect()
        })
        .collect()
}

/// Plaquettes of the `distance x distance` rotated planar surface code.
///
/// Qubit `(x, y)` has index `x + y * distance`. Bulk plaquettes alternate in a checkerboard
/// starting with X at the top left corner, followed by the weight-two boundary plaquettes: Z on the
/// top and bottom rows, X on the left and right columns.
///
/// # Panics
///
/// Panics if `distance` is even or smaller than three.
#[must_use]
pub fn rotated_planar_surface_code_stabilisers(distance: usize) -> Vec<PauliString> {
    assert!(distance >= 3 && distance % 2 == 1, "distance {distance} must be odd and at least 3");
    let qubit = |x: usize, y: usize| x + y * distance;
    let plaquette = |pauli: Pauli, qubits: &[usize]| -> PauliString {
        qubits.iter().map(|index| (*index, pauli)).collect()
    };

    let mut plaquettes = Vec::new();
    for i in 0..distance - 1 {
        for j in 0..distance - 1 {
            let pauli = if (i + j) % 2 == 0 { Pauli::X } else { Pauli::Z };
            plaquettes.push(plaquette(
                pauli,
                &[qubit(i, j), qubit(i + 1, j), qubit(i, j + 1), qubit(i + 1, j + 1)],
            ));
        }
    }
    for i in (0..distance - 1).step_by(2) {
        plaquettes.push(plaquette(Pauli::Z, &[qubit(i, 0), qubit(i + 1, 0)]));
        plaquettes.push(plaquette(Pauli::X, &[qubit(distance - 1, i), qubit(distance - 1, i + 1)]));
    }
    for i in (1..distance).step_by(2) {
        plaquettes.push(plaquette(Pauli::Z, &[qubit(i, distance - 1), qubit(i + 1, distance - 1)]));
        plaquettes.push(plaquette(Pauli::X, &[qubit(0, i), qubit(0, i + 1)]));
    }
    plaquettes
}
