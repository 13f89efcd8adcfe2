//! Ideal sampling density of the paraboloid mapping.

/// Number of entries in [`COVERAGE`].
pub const COVERAGE_LEN: usize = 100;

/// Density-compensation curve, monotonically increasing from ≈0.2525 to 1.
#[rustfmt::skip]
pub const COVERAGE: [f32; COVERAGE_LEN] = [
    0.2525314589560607, 0.2576326279264187, 0.2628360322702068, 0.2681431353083358,
    0.2735553772432651, 0.2790741715891978, 0.2847009014014726, 0.2904369152983624,
    0.2962835232704883, 0.3022419922728888, 0.308313541593817, 0.31449933799764,
    0.3208004906361242, 0.3272180457262481, 0.3337529809911264, 0.3404061998622743,
    0.3471785254421841, 0.3540706942267695, 0.3610833495887235, 0.3682170350233647,
    0.3754721871601566, 0.3828491285443266, 0.3903480601940126, 0.3979690539407849,
    0.4057120445616824, 0.4135768217143915, 0.42156302168711, 0.4296701189785898,
    0.437897417723999, 0.4462440429868523, 0.4547089319362121, 0.463290824935085,
    0.4719882565643009, 0.4807995466116144, 0.4897227910574863, 0.4987558530912262,
    0.5078963541952966, 0.5171416653374513, 0.5264888983132224, 0.5359348972850012,
    0.5454762305660166, 0.5551091827004417, 0.5648297468943986, 0.5746336178533678,
    0.584516185086649, 0.5944725267394274, 0.6044974040160985, 0.6145852562605928,
    0.6247301967608438, 0.6349260093447057, 0.64516614583707, 0.6554437244475375,
    0.6657515291573695, 0.6760820101752764, 0.6864272855286133, 0.6967791438574159,
    0.7071290484729112, 0.7174681427427703, 0.7277872568587884, 0.7380769160403831,
    0.748327350219802, 0.7585285052521402, 0.7686700556833742, 0.7787414191045477,
    0.7887317721106483, 0.7986300678752298, 0.8084250553400247, 0.8181053000119952,
    0.8276592063450691, 0.8370750416769379, 0.846340961676199, 0.8554450372439244,
    0.8643752828030637, 0.87311968589294, 0.8816662379765975, 0.890002966355447,
    0.8981179670715378, 0.9059994386685738, 0.9136357166693593, 0.9210153086167311,
    0.9281269295161807, 0.9349595375079411, 0.9415023695886816, 0.9477449771968978,
    0.9536772614690937, 0.9592895079717747, 0.9645724207097471, 0.9695171552121149,
    0.9741153504974227, 0.9783591597219075, 0.9822412793198499, 0.9857549764505119,
    0.9888941145749449, 0.991653176994985, 0.9940272881980572, 0.9960122328654299,
    0.9976044724143962, 0.9988011589619574, 0.9996001466136796, 1.0,
];

/// Immutable coverage lookup owned by the error pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTable {
    values: [f32; COVERAGE_LEN],
}

impl CoverageTable {
    pub fn new(values: [f32; COVERAGE_LEN]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32; COVERAGE_LEN] {
        &self.values
    }

    /// Index used for `x`: `floor(99 * x)` with `x` clamped to `[0, 1]`.
    /// NaN maps to the first entry.
    pub fn index(x: f32) -> usize {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        ((99.0 * x).floor() as usize).min(COVERAGE_LEN - 1)
    }

    pub fn lookup(&self, x: f32) -> f32 {
        self.values[Self::index(x)]
    }

    /// The table as 25 `vec4`s, the layout a uniform array needs.
    pub fn packed(&self) -> [[f32; 4]; COVERAGE_LEN / 4] {
        let mut out = [[0.0; 4]; COVERAGE_LEN / 4];
        for (k, v) in self.values.iter().enumerate() {
            out[k / 4][k % 4] = *v;
        }
        out
    }
}

impl Default for CoverageTable {
    fn default() -> Self {
        Self::new(COVERAGE)
    }
}
