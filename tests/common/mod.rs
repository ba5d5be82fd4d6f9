use fragrec::array::{DetectorArray, DetectorArrayBuilder};
use fragrec::constants::{DetectorId, GroupId, NodeId, TelescopeId, TrajectoryId};
use fragrec::detectors::{Absorber, Detector, DetectorKind, EventData, MaterialKind};
use fragrec::telescope::{IdentificationResult, ParticleIdentifier, TelescopeKind};

/// Telescope replaying a pre-scripted result; `None` scripts a failed attempt.
pub struct ScriptedTelescope {
    pub own_id: TelescopeId,
    pub kind: TelescopeKind,
    pub detectors: Vec<DetectorId>,
    pub independent: bool,
    pub script: Option<IdentificationResult>,
}

impl ParticleIdentifier for ScriptedTelescope {
    fn kind(&self) -> TelescopeKind {
        self.kind
    }
    fn detectors(&self) -> &[DetectorId] {
        &self.detectors
    }
    fn is_independent(&self) -> bool {
        self.independent
    }
    fn is_ready(&self, _event: &EventData) -> bool {
        true
    }
    fn identify(&self, _event: &EventData) -> IdentificationResult {
        self.script
            .clone()
            .unwrap_or_else(|| IdentificationResult::failure(self.own_id, "scripted miss"))
    }
}

/// Scripted results for the three telescopes of [`three_stage_line`], by kind.
#[derive(Default)]
pub struct LineScripts {
    pub csi: Option<IdentificationResult>,
    pub sicsi: Option<IdentificationResult>,
    pub sisi: Option<IdentificationResult>,
    /// Leave the scintillator without a calibration (forces stage inference).
    pub uncalibrated_csi: bool,
}

pub struct LineFixture {
    pub array: DetectorArray,
    pub group: GroupId,
    pub d_sia: DetectorId,
    pub d_sib: DetectorId,
    pub d_csi: DetectorId,
    pub n_csi: NodeId,
    pub n_sib: NodeId,
    pub n_sia: NodeId,
    /// Full line CSI → SI_B → SI_A and the alternative stopping in SI_B.
    pub t_main: TrajectoryId,
    pub t_alt: TrajectoryId,
    pub t_csi: TelescopeId,
    pub t_sicsi: TelescopeId,
    pub t_sisi: TelescopeId,
}

impl LineFixture {
    /// Event with every detector of the line fired at the given raw values
    /// (SI_A, SI_B, CSI order).
    pub fn event(&self, raw: [f64; 3]) -> EventData {
        let mut event = EventData::new(self.array.n_detectors());
        event.set_signal(self.d_sia, raw[0]);
        event.set_signal(self.d_sib, raw[1]);
        event.set_signal(self.d_csi, raw[2]);
        event
    }
}

/// One detection line of a typical forward ring: two silicon stages backed by a long
/// scintillator, covered by one telescope of each kind. Unit gain calibrations, so raw
/// values read directly as MeV.
pub fn three_stage_line(scripts: LineScripts) -> LineFixture {
    let mut b: DetectorArrayBuilder = DetectorArray::builder();

    let d_sia = b.add_detector(
        Detector::new(
            "SI_A",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 300.0),
        )
        .with_calib(1.0, 0.0),
    );
    let d_sib = b.add_detector(
        Detector::new(
            "SI_B",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 500.0),
        )
        .with_calib(1.0, 0.0),
    );
    let csi = Detector::new(
        "CSI_C",
        DetectorKind::Scintillator,
        Absorber::new(MaterialKind::CesiumIodide, 100_000.0),
    );
    let d_csi = b.add_detector(if scripts.uncalibrated_csi {
        csi
    } else {
        csi.with_calib(1.0, 0.0)
    });

    let n_csi = b.add_node(d_csi);
    let n_sib = b.add_node(d_sib);
    let n_sia = b.add_node(d_sia);

    let t_csi = b.add_telescope(Box::new(ScriptedTelescope {
        own_id: 0,
        kind: TelescopeKind::CsI,
        detectors: vec![d_csi],
        independent: true,
        script: scripts.csi,
    }));
    let t_sicsi = b.add_telescope(Box::new(ScriptedTelescope {
        own_id: 1,
        kind: TelescopeKind::SiCsI,
        detectors: vec![d_sib, d_csi],
        independent: true,
        script: scripts.sicsi,
    }));
    let t_sisi = b.add_telescope(Box::new(ScriptedTelescope {
        own_id: 2,
        kind: TelescopeKind::SiSi,
        detectors: vec![d_sia, d_sib],
        independent: true,
        script: scripts.sisi,
    }));

    // Per-node coverage, nearest-target-first.
    b.set_node_telescopes(n_csi, vec![t_sicsi, t_csi]);
    b.set_node_telescopes(n_sib, vec![t_sisi, t_sicsi]);
    b.set_node_telescopes(n_sia, vec![t_sisi]);

    let group = b.add_group();
    let t_main = b.add_trajectory(group, &[n_csi, n_sib, n_sia]);
    let t_alt = b.add_trajectory(group, &[n_sib, n_sia]);

    LineFixture {
        array: b.build().expect("line fixture must build"),
        group,
        d_sia,
        d_sib,
        d_csi,
        n_csi,
        n_sib,
        n_sia,
        t_main,
        t_alt,
        t_csi,
        t_sicsi,
        t_sisi,
    }
}

/// A lone calibrated silicon with no telescope coverage: every stopped particle goes
/// through the minimum-Z policy.
pub fn first_stage_only() -> (DetectorArray, DetectorId) {
    let mut b = DetectorArray::builder();
    let d = b.add_detector(
        Detector::new(
            "SI_LONE",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 300.0),
        )
        .with_calib(1.0, 0.0),
    );
    let n = b.add_node(d);
    let g = b.add_group();
    b.add_trajectory(g, &[n]);
    (b.build().expect("fixture must build"), d)
}
