//! Headless spinner demo
//!
//! Spins a turntable with orbiting satellites and publishes motion matrices
//! for each satellite every fixed step. Prints per-object motion at the end.
//!
//! Usage: `spinner_demo [config.toml|config.ron] [seconds]`

use frame_matrices::foundation::logging;
use frame_matrices::foundation::math::Mat4Ext;
use frame_matrices::prelude::*;
use rand::prelude::*;

const SATELLITE_COUNT: usize = 4;
const DEFAULT_SECONDS: f32 = 2.0;

struct Satellite {
    node: NodeId,
    material: SharedMaterial,
    bob_speed: f32,
    bob_phase: f32,
}

struct SpinnerDemoApp {
    turntable: Option<NodeId>,
    satellites: Vec<Satellite>,
    spin_speed: f32,
    elapsed: f32,
    duration: f32,
}

impl SpinnerDemoApp {
    fn new(duration: f32) -> Self {
        Self {
            turntable: None,
            satellites: Vec::new(),
            spin_speed: 1.5,
            elapsed: 0.0,
            duration,
        }
    }

    fn report(&self, engine: &Engine) {
        let keys = &engine.config().motion.parameters;
        for (i, satellite) in self.satellites.iter().enumerate() {
            let Some(published) = engine.motion.published(satellite.node) else {
                log::warn!("Satellite {i} never published");
                continue;
            };
            let displacement = published.current.translation() - published.previous.translation();
            let uniforms = MotionMatrixUniforms::from(published);
            let material = satellite.material.read();
            log::info!(
                "Satellite {i} ({}): last step moved {:.4} units, {} uniform bytes, {} parameter writes",
                material.name(),
                displacement.magnitude(),
                uniforms.as_bytes().len(),
                material.write_count(),
            );
            log::debug!("{}: {}", keys.current_model, published.current);
        }
    }
}

impl Application for SpinnerDemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let mut rng = rand::thread_rng();

        let turntable = engine.scene.spawn(Transform::identity());
        for i in 0..SATELLITE_COUNT {
            let angle = i as f32 / SATELLITE_COUNT as f32 * std::f32::consts::TAU;
            let radius = rng.gen_range(2.0..6.0);
            let local = Transform::from_position(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius))
                .with_uniform_scale(rng.gen_range(0.5..1.5));
            let node = engine
                .scene
                .spawn_child(turntable, local)
                .map_err(|e| AppError::Custom(e.to_string()))?;

            let material = SharedMaterial::new(format!("satellite_{i}"));
            engine
                .motion
                .attach(&engine.scene, node, material.clone())
                .map_err(|e| AppError::Custom(e.to_string()))?;

            self.satellites.push(Satellite {
                node,
                material,
                bob_speed: rng.gen_range(1.0..4.0),
                bob_phase: rng.gen_range(0.0..std::f32::consts::TAU),
            });
        }
        self.turntable = Some(turntable);

        log::info!("Spawned turntable with {} satellites", self.satellites.len());
        Ok(())
    }

    fn fixed_update(&mut self, engine: &mut Engine, step_secs: f32) -> Result<(), AppError> {
        self.elapsed += step_secs;

        if let Some(turntable) = self.turntable {
            let spin = Quat::from_axis_angle(&Vec3::y_axis(), self.spin_speed * self.elapsed);
            engine
                .scene
                .local_mut(turntable)
                .map_err(|e| AppError::Custom(e.to_string()))?
                .rotation = spin;
        }

        for satellite in &self.satellites {
            let local = engine
                .scene
                .local_mut(satellite.node)
                .map_err(|e| AppError::Custom(e.to_string()))?;
            local.position.y = (self.elapsed * satellite.bob_speed + satellite.bob_phase).sin();
        }

        if self.elapsed >= self.duration {
            self.report(engine);
            engine.request_exit();
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!("Ran {} fixed steps", engine.total_steps());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");

    log::info!("Starting spinner demo");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load_or_default(path)?,
        None => EngineConfig::default(),
    };
    let seconds = match args.next() {
        Some(value) => value.parse::<f32>()?,
        None => DEFAULT_SECONDS,
    };

    let mut app = SpinnerDemoApp::new(seconds);
    match Engine::run(config, &mut app) {
        Ok(()) => {
            log::info!("Spinner demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Spinner demo failed: {:?}", e);
            Err(e.into())
        }
    }
}
