mod config;
mod export;
mod scene;

use anyhow::{Context, Result};
use umbra_engine::device::{Gpu, GpuInit};
use umbra_engine::logging::{LoggingConfig, init_logging};
use umbra_engine::render::RenderCtx;
use umbra_engine::scene::{GpuScene, ShadowCasters};
use umbra_engine::shadow::{GpuBinder, Hemisphere, Light, ShadowReport, ShadowSystem, WarpOutcome};

use crate::config::StudioConfig;

fn main() -> Result<()> {
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║           UMBRA STUDIO v0.1            ║");
    println!("  ║  warped dual-paraboloid shadow maps    ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    init_logging(LoggingConfig::default());

    let config = StudioConfig::load(std::env::args().skip(1), |k| std::env::var(k).ok())?;
    log::info!("{config:?}");

    let gpu = Gpu::new_blocking(GpuInit::default()).context("GPU initialisation failed")?;
    let info = gpu.adapter_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    let ctx = RenderCtx::from_gpu(&gpu);
    let mesh = scene::build();
    let gpu_scene = GpuScene::upload(&ctx, &mesh);
    let casters: &(dyn ShadowCasters + 'static) = &gpu_scene;

    let mut binder = GpuBinder::new(ctx);
    let mut system = ShadowSystem::new(config.technique.build(), config.shadow_config())?;
    log::info!(
        "technique {} defines: {:?}",
        system.technique().name(),
        system.technique().defines()
    );

    let mut lights = vec![Light::new(0, scene::light_position(0, config.frames), config.resolution)];
    let frame = scene::camera(config.viewport);

    for i in 0..config.frames {
        lights[0].position = scene::light_position(i, config.frames);
        let reports = system.render(&mut binder, &mut lights, casters, &frame);
        for report in &reports {
            log_report(i, report, system.config().warp_strength);
        }
    }

    let Some(entry) = lights[0].entry().cloned() else {
        log::error!("light 0 has no shadow map; nothing to export");
        return Ok(());
    };

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    for hemisphere in Hemisphere::BOTH {
        let depth = binder.read_depth_layer(&entry.depth, hemisphere.layer())?;
        let path = config
            .output_dir
            .join(format!("{}_{}.png", entry.depth, hemisphere.layer()));
        export::write_depth_png(&path, &depth, entry.resolution, entry.resolution)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn log_report(frame: u32, report: &ShadowReport, strength: f32) {
    let shadow = match &report.result {
        Ok(shadow) => shadow,
        Err(e) => {
            log::warn!("frame {frame} light {}: {e}", report.light);
            return;
        }
    };

    // Largest displacement of a 9x9 lattice, in texture units.
    let lattice = 9;
    let max_shift = shadow
        .coefficients
        .warp_grid(lattice, f64::from(strength))
        .iter()
        .enumerate()
        .map(|(k, p)| {
            let u = (k % lattice) as f64 / (lattice - 1) as f64;
            let v = (k / lattice) as f64 / (lattice - 1) as f64;
            (p[0] - u).hypot(p[1] - v)
        })
        .fold(0.0, f64::max);

    match &shadow.outcome {
        WarpOutcome::Unwarped => log::info!("frame {frame} light {}: unwarped", report.light),
        WarpOutcome::Fitted => {
            log::info!("frame {frame} light {}: fitted, max shift {max_shift:.4}", report.light)
        }
        WarpOutcome::Stale(e) => log::warn!(
            "frame {frame} light {}: stale warp (max shift {max_shift:.4}): {e}",
            report.light
        ),
    }
}
