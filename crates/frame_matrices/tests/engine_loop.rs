//! Fixed-step engine loop driving motion trackers end to end

use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use frame_matrices::foundation::logging;
use frame_matrices::foundation::math::Mat4Ext;
use frame_matrices::prelude::*;

/// Moves one object at constant velocity and records what its material receives
struct Slider {
    node: Option<NodeId>,
    material: SharedMaterial,
    velocity: Vec3,
    exit_after: Option<u32>,
    updates: u32,
    history: Vec<(Mat4, Mat4, Mat4)>,
}

impl Slider {
    fn new(velocity: Vec3) -> Self {
        Self {
            node: None,
            material: SharedMaterial::new("slider"),
            velocity,
            exit_after: None,
            updates: 0,
            history: Vec::new(),
        }
    }

    fn record(&mut self, keys: &ParameterNames) {
        let read = |key: &str| self.material.matrix(key).unwrap_or_else(Mat4::zeros);
        let entry = (
            read(&keys.previous_model),
            read(&keys.current_inverse_model),
            read(&keys.current_model),
        );
        self.history.push(entry);
    }
}

impl Application for Slider {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let node = engine.scene.spawn(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        engine
            .motion
            .attach(&engine.scene, node, self.material.clone())
            .map_err(|e| AppError::Custom(e.to_string()))?;
        self.node = Some(node);
        Ok(())
    }

    fn fixed_update(&mut self, engine: &mut Engine, step_secs: f32) -> Result<(), AppError> {
        let node = self.node.ok_or_else(|| AppError::Custom("not initialized".to_string()))?;
        engine
            .scene
            .translate(node, self.velocity * step_secs)
            .map_err(|e| AppError::Custom(e.to_string()))?;

        self.updates += 1;
        if self.exit_after.is_some_and(|n| self.updates >= n) {
            engine.request_exit();
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {}
}

fn engine_at(hz: f64) -> Engine {
    logging::try_init_for_tests();
    Engine::new(EngineConfig {
        fixed_timestep_hz: hz,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn published_delta_matches_velocity_per_step() {
    let mut engine = engine_at(50.0);
    let mut app = Slider::new(Vec3::new(2.0, 0.0, -1.0));
    app.initialize(&mut engine).unwrap();
    let keys = engine.motion.config().parameters.clone();

    for _ in 0..5 {
        assert_eq!(engine.step(Duration::from_millis(20), &mut app).unwrap(), 1);
        app.record(&keys);
    }

    let expected_delta = Vec3::new(2.0, 0.0, -1.0) * engine.step_secs();
    for (previous, inverse, current) in &app.history {
        assert_relative_eq!(current.translation() - previous.translation(), expected_delta, epsilon = 1e-5);
        assert_relative_eq!(current * inverse, Mat4::identity(), epsilon = 1e-5);
    }
    for pair in app.history.windows(2) {
        assert_eq!(pair[1].0, pair[0].2);
    }
}

#[test]
fn long_frame_runs_several_steps_and_short_frame_none() {
    let mut engine = engine_at(100.0);
    let mut app = Slider::new(Vec3::new(1.0, 0.0, 0.0));
    app.initialize(&mut engine).unwrap();

    assert_eq!(engine.step(Duration::from_millis(35), &mut app).unwrap(), 3);
    assert_eq!(engine.step(Duration::from_millis(4), &mut app).unwrap(), 0);
    assert_eq!(engine.total_steps(), 3);

    let node = app.node.unwrap();
    let published = engine.motion.published(node).unwrap();
    assert_relative_eq!(
        published.current.translation().x - published.previous.translation().x,
        0.01,
        epsilon = 1e-5
    );
}

#[test]
fn exit_request_stops_remaining_steps() {
    let mut engine = engine_at(100.0);
    let mut app = Slider::new(Vec3::zeros());
    app.exit_after = Some(2);
    app.initialize(&mut engine).unwrap();

    let ran = engine.step(Duration::from_millis(50), &mut app).unwrap();

    assert_eq!(ran, 2);
    assert!(!engine.is_running());
}

#[test]
fn run_returns_after_exit_request() {
    let mut app = Slider::new(Vec3::new(0.0, 0.0, 1.0));
    app.exit_after = Some(1);

    Engine::run(
        EngineConfig {
            fixed_timestep_hz: 200.0,
            ..Default::default()
        },
        &mut app,
    )
    .unwrap();

    assert!(app.node.is_some());
    let current = app.material.matrix(&ParameterNames::default().current_model).unwrap();
    assert!(current.translation().z > 0.0);
}

/// Spends a long time in `initialize`, then runs for a short wall-clock window
struct SlowStarter {
    setup: Duration,
    window: Duration,
    ready_at: Option<Instant>,
    updates: u32,
}

impl Application for SlowStarter {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let node = engine.scene.spawn(Transform::identity());
        engine
            .motion
            .attach(&engine.scene, node, SharedMaterial::new("slow"))
            .map_err(|e| AppError::Custom(e.to_string()))?;
        std::thread::sleep(self.setup);
        self.ready_at = Some(Instant::now());
        Ok(())
    }

    fn fixed_update(&mut self, engine: &mut Engine, _step_secs: f32) -> Result<(), AppError> {
        self.updates += 1;
        if self.ready_at.is_some_and(|ready| ready.elapsed() >= self.window) {
            engine.request_exit();
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {}
}

#[test]
fn slow_initialize_does_not_burst_steps() {
    logging::try_init_for_tests();
    let mut app = SlowStarter {
        setup: Duration::from_millis(300),
        window: Duration::from_millis(30),
        ready_at: None,
        updates: 0,
    };

    Engine::run(
        EngineConfig {
            fixed_timestep_hz: 100.0,
            max_steps_per_frame: 64,
            ..Default::default()
        },
        &mut app,
    )
    .unwrap();

    // Setup time would be worth 30 steps at 100 Hz; only the run window counts.
    assert!(app.updates >= 1);
    assert!(app.updates < 20, "ran {} steps", app.updates);
}

#[test]
fn config_file_roundtrip_drives_engine() {
    let dir = std::env::temp_dir().join(format!("frame_matrices_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut config = EngineConfig::default();
    config.motion.parameters.current_model = "_CurrentFrameModelMatrix".to_string();

    for file in ["engine.toml", "engine.ron"] {
        let path = dir.join(file);
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    let unsupported = EngineConfig::load_from_file(dir.join("engine.yaml"));
    assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));

    let missing = EngineConfig::load_or_default(dir.join("missing.toml")).unwrap();
    assert_eq!(missing, EngineConfig::default());

    let _ = std::fs::remove_dir_all(&dir);
}
