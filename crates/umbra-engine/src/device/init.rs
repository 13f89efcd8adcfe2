/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    /// Accept a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Features the device must have; creation fails otherwise.
    pub required_features: wgpu::Features,

    /// Features enabled only when the adapter offers them.
    ///
    /// `POLYGON_MODE_LINE` is requested by default so the shadow wireframe
    /// toggle works where the backend allows it.
    pub optional_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl GpuInit {
    /// Features to request from `adapter`: everything required plus the
    /// optional ones it actually supports.
    pub(crate) fn features_for(&self, adapter_features: wgpu::Features) -> wgpu::Features {
        self.required_features | (self.optional_features & adapter_features)
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::POLYGON_MODE_LINE,
            required_limits: wgpu::Limits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_features_are_masked_by_adapter() {
        let init = GpuInit::default();
        assert_eq!(init.features_for(wgpu::Features::empty()), wgpu::Features::empty());
        assert_eq!(
            init.features_for(wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::DEPTH_CLIP_CONTROL),
            wgpu::Features::POLYGON_MODE_LINE
        );
    }

    #[test]
    fn required_features_always_requested() {
        let init = GpuInit {
            required_features: wgpu::Features::DEPTH_CLIP_CONTROL,
            ..Default::default()
        };
        assert!(init.features_for(wgpu::Features::empty()).contains(wgpu::Features::DEPTH_CLIP_CONTROL));
    }
}
