mod common;

use approx::assert_relative_eq;
use common::{three_stage_line, LineScripts};
use fragrec::particle::{CoherencyCode, ECode, IdCode};
use fragrec::reconstruction::event::reconstruct_event;
use fragrec::reconstruction::ReconParams;
use fragrec::telescope::IdentificationResult;

#[test]
fn test_gamma_overridden_by_sisi_identification() {
    // The scintillator reports a neutral signature, but the silicon pair behind the same
    // line identifies an alpha: the gamma is overridden, the stop corrected to the second
    // silicon, and the particle calibrated on the silicon stages.
    let line = three_stage_line(LineScripts {
        csi: Some(IdentificationResult::gamma(0, 0)),
        sisi: Some(IdentificationResult::success(2, 2, Some(4), 0)),
        ..Default::default()
    });
    let params = ReconParams::default();
    let event = line.event([10.0, 25.0, 3.0]);

    let particles = reconstruct_event(&line.array, &params, &event);
    assert_eq!(particles.len(), 1);

    let p = &particles[0];
    assert_eq!(p.z, Some(2));
    assert_eq!(p.a, Some(4));
    assert_eq!(p.id_code, IdCode::Standard);
    assert_eq!(p.coherency_code, Some(CoherencyCode::GammaOverridden));
    assert_eq!(p.identifying_telescope, Some(line.t_sisi));
    assert_eq!(p.stopping_node, line.n_sib);
    assert_eq!(p.trajectory, line.t_alt);
    assert_eq!(p.parameters["coherency.code"], 1.0);
    // Calibration now walks the corrected two-silicon path.
    assert!(p.is_calibrated());
    assert_relative_eq!(p.energy().unwrap(), 10.0 + 25.0 + p.target_loss, epsilon = 1e-9);
}

#[test]
fn test_sicsi_preferred_over_scintillator() {
    let line = three_stage_line(LineScripts {
        csi: Some(IdentificationResult::success(0, 5, None, 1)),
        sicsi: Some(IdentificationResult::success(1, 6, Some(12), 0)),
        ..Default::default()
    });
    let params = ReconParams::default();
    let event = line.event([10.0, 25.0, 80.0]);

    let particles = reconstruct_event(&line.array, &params, &event);
    assert_eq!(particles.len(), 1);

    let p = &particles[0];
    assert_eq!(p.z, Some(6));
    assert_eq!(p.coherency_code, Some(CoherencyCode::SiCsIPreferred));
    assert_eq!(p.identifying_telescope, Some(line.t_sicsi));
    // The Si-CsI stop is still the scintillator: no trajectory change.
    assert_eq!(p.trajectory, line.t_main);
}

#[test]
fn test_punch_through_corrected() {
    let line = three_stage_line(LineScripts {
        sicsi: Some(IdentificationResult::success(1, 8, Some(16), 0)),
        sisi: Some(IdentificationResult::success(2, 3, Some(7), 0)),
        ..Default::default()
    });
    let params = ReconParams::default();
    let event = line.event([10.0, 25.0, 80.0]);

    let particles = reconstruct_event(&line.array, &params, &event);
    let p = &particles[0];
    assert_eq!(p.z, Some(3));
    assert_eq!(p.coherency_code, Some(CoherencyCode::PunchThroughCorrected));
    assert_eq!(p.stopping_node, line.n_sib);
    assert_eq!(p.trajectory, line.t_alt);
}

#[test]
fn test_override_quality_gate() {
    // Same gamma scenario but the competing Si-Si result carries a poor quality code:
    // the override is refused and the particle stays a gamma, calibrated as a proton
    // substitute on the scintillator.
    let line = three_stage_line(LineScripts {
        csi: Some(IdentificationResult::gamma(0, 0)),
        sisi: Some(IdentificationResult::success(2, 2, Some(4), 5)),
        ..Default::default()
    });
    let params = ReconParams::builder().max_override_quality(1).build().unwrap();
    let event = line.event([10.0, 25.0, 3.0]);

    let particles = reconstruct_event(&line.array, &params, &event);
    let p = &particles[0];
    assert_eq!(p.z, None);
    assert_eq!(p.id_code, IdCode::Gamma);
    assert_eq!(p.coherency_code, None);
    assert_eq!(p.e_code, ECode::SubstituteProton);
    assert_relative_eq!(p.energy().unwrap(), 3.0);
    // Undefined charge: the target correction never applies.
    assert_eq!(p.target_loss, 0.0);
}
