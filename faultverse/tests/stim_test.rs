use faultverse::{export_with_logicals, import_stim, FaultError};
use pauliweb::{NodeType, Pauli, PauliString, PositionedDiagram};

const SINGLE_CHECK: &str = "
    R 0
    X_ERROR(0.1) 0
    Z_ERROR(0.3) 0
    M 0
    DETECTOR rec[-1]
";

#[test]
fn single_measurement_detects_bit_flips() {
    let imported = import_stim(SINGLE_CHECK).unwrap();
    assert_eq!(imported.diagram.node_count(), 2);
    assert_eq!(imported.diagram.edge_count(), 1);
    assert_eq!(imported.noise.num_faults(), 2);

    let dem = imported.detector_error_model().unwrap();
    assert_eq!(dem.to_string(), "error(0.1) D0\n");
}

#[test]
fn logicals_relabel_their_region() {
    let imported = import_stim(SINGLE_CHECK).unwrap();
    let measurement = imported.measurement_nodes[0];
    let edge = imported.diagram.incident_edges(measurement)[0];

    let dem = export_with_logicals(&imported.noise, &[]).unwrap();
    assert_eq!(dem.to_string(), "error(0.1) D0\n");
    let dem = export_with_logicals(&imported.noise, &[PauliString::unary(edge, Pauli::X)]).unwrap();
    assert_eq!(dem.to_string(), "error(0.1) L0\n");
    assert!(matches!(
        export_with_logicals(&imported.noise, &[PauliString::unary(edge, Pauli::Z)]),
        Err(FaultError::Web(_))
    ));
}

#[test]
fn cnot_spreads_bit_flips_onto_detector_and_observable() {
    let imported = import_stim(
        "R 0 1
         TICK
         X_ERROR(0.2) 0
         Z_ERROR(0.3) 1
         CNOT 0 1
         TICK
         M 0 1
         DETECTOR rec[-1]
         OBSERVABLE_INCLUDE(0) rec[-2]",
    )
    .unwrap();
    assert_eq!(imported.measurement_nodes.len(), 2);
    assert_eq!(imported.observables.len(), 1);
    for node in &imported.measurement_nodes {
        assert_eq!(imported.diagram.node_type(*node), NodeType::X);
        assert_eq!(imported.diagram.degree(*node), 1);
    }
    let dem = imported.detector_error_model().unwrap();
    assert_eq!(dem.to_string(), "error(0.2) D0 L0\n");
}

#[test]
fn unused_qubits_close_up_their_rows() {
    let imported = import_stim("M 2\nDETECTOR rec[-1]").unwrap();
    let measurement = imported.measurement_nodes[0];
    assert_eq!(imported.diagram.y(measurement), 0.0);
    assert_eq!(imported.detectors.len(), 1);
}

#[test]
fn depolarizing_noise_splits_into_independent_channels() {
    let imported = import_stim("DEPOLARIZE1(0.3) 0\nM 0").unwrap();
    let expected = 0.5 - 0.5 * (1.0_f64 - 0.4).sqrt();
    let probabilities: Vec<f64> = imported.noise.atomic_weights().map(|(_, probability)| *probability).collect();
    assert_eq!(probabilities.len(), 3);
    assert!(probabilities.iter().all(|probability| (probability - expected).abs() < 1e-12));
}

#[test]
fn malformed_circuits_are_rejected() {
    assert_eq!(import_stim("R 0\nH 0").unwrap_err(), FaultError::UnmeasuredQubit(0));
    assert_eq!(
        import_stim("M 0\nDETECTOR rec[-2]").unwrap_err(),
        FaultError::MeasurementRecord {
            lookback: 2,
            available: 1
        }
    );
    assert!(matches!(import_stim("REPEAT 3 {\nM 0\n}"), Err(FaultError::Unsupported(_))));
    assert!(matches!(import_stim("S 0"), Err(FaultError::Unsupported(_))));
    assert!(matches!(import_stim("CX 0 1 2"), Err(FaultError::Parse { line: 1, .. })));
    assert!(matches!(import_stim("M 0\nX_ERROR 0"), Err(FaultError::Parse { line: 2, .. })));
}
