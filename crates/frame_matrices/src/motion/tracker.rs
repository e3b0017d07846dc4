//! Frame matrix tracker
//!
//! Keeps the previous and current model matrix of one object and publishes
//! them, together with the inverse of the current matrix, to a material once
//! per fixed simulation step. A reprojection pass reconstructs per-pixel
//! motion from the pair:
//!
//! ```text
//! p_prev = Previous * CurrentInverse * p_world
//! ```

use super::config::{MotionVectorConfig, SingularInversePolicy};
use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::MaterialParameters;
use crate::scene::WorldTransformSource;

/// Two-frame history of a world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// World transform at the previous tick
    pub previous: Mat4,
    /// World transform at the latest tick
    pub current: Mat4,
}

impl FrameState {
    /// Both frames set to `matrix`: the first frame reports zero motion
    pub fn at_rest(matrix: Mat4) -> Self {
        Self {
            previous: matrix,
            current: matrix,
        }
    }

    /// Shift current into previous and record a new current
    pub fn advance(&mut self, current: Mat4) {
        self.previous = self.current;
        self.current = current;
    }
}

/// The values written to the material in one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedMatrices {
    /// Previous tick's model matrix
    pub previous: Mat4,
    /// This tick's model matrix
    pub current: Mat4,
    /// Inverse of `current` as published (see [`SingularInversePolicy`])
    pub current_inverse: Mat4,
}

/// Publishes an object's previous/current model matrices to a material
#[derive(Debug, Clone)]
pub struct FrameMatrixTracker {
    config: MotionVectorConfig,
    state: Option<FrameState>,
}

impl Default for FrameMatrixTracker {
    fn default() -> Self {
        Self::new(MotionVectorConfig::default())
    }
}

impl FrameMatrixTracker {
    /// Create an uninitialized tracker
    pub fn new(config: MotionVectorConfig) -> Self {
        Self { config, state: None }
    }

    /// Read the object's world transform once and use it for both frames
    pub fn initialize(&mut self, source: &impl WorldTransformSource) {
        let matrix = source.world_matrix();
        self.state = Some(FrameState::at_rest(matrix));
        log::trace!("Frame matrix tracker initialized at {:?}", matrix.translation());
    }

    /// Advance one fixed step and publish the three matrices
    ///
    /// Writes, in order: previous model, current inverse model, current model.
    /// An uninitialized tracker initializes from `source` first, so its first
    /// tick publishes zero motion.
    pub fn tick(
        &mut self,
        source: &impl WorldTransformSource,
        material: &mut impl MaterialParameters,
    ) -> PublishedMatrices {
        let world = source.world_matrix();
        let state = self.state.get_or_insert_with(|| FrameState::at_rest(world));
        state.advance(world);
        let state = *state;

        let current_inverse = self.inverse_of(&state.current);
        let published = PublishedMatrices {
            previous: state.previous,
            current: state.current,
            current_inverse,
        };

        let names = &self.config.parameters;
        material.set_named_matrix(&names.previous_model, &published.previous);
        if current_inverse.is_finite_matrix() || self.config.singular_inverse != SingularInversePolicy::SkipWrite {
            material.set_named_matrix(&names.current_inverse_model, &published.current_inverse);
        }
        material.set_named_matrix(&names.current_model, &published.current);

        if self.config.log_published {
            log::debug!("{}: {}", names.previous_model, published.previous);
        }

        published
    }

    fn inverse_of(&self, current: &Mat4) -> Mat4 {
        let inverse = current.inverse_or_nan();
        if inverse.is_finite_matrix() {
            return inverse;
        }

        match self.config.singular_inverse {
            SingularInversePolicy::Propagate => {
                log::debug!("Current model matrix is singular, publishing a non-finite inverse");
                inverse
            }
            SingularInversePolicy::Identity => {
                log::debug!("Current model matrix is singular, publishing identity as its inverse");
                Mat4::identity()
            }
            SingularInversePolicy::SkipWrite => {
                log::debug!("Current model matrix is singular, leaving the inverse parameter unchanged");
                inverse
            }
        }
    }

    /// Frame state, `None` before the first `initialize` or `tick`
    pub fn state(&self) -> Option<&FrameState> {
        self.state.as_ref()
    }

    /// Whether the tracker has read a transform yet
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Previous tick's model matrix
    pub fn previous(&self) -> Option<Mat4> {
        self.state.map(|s| s.previous)
    }

    /// Latest model matrix
    pub fn current(&self) -> Option<Mat4> {
        self.state.map(|s| s.current)
    }

    /// Active configuration
    pub fn config(&self) -> &MotionVectorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform, Vec3};
    use crate::motion::ParameterNames;
    use crate::render::Material;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn keys() -> ParameterNames {
        ParameterNames::default()
    }

    fn moving_transform() -> Transform {
        Transform::from_position(Vec3::new(2.0, -1.0, 4.0))
            .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), 0.4))
            .with_scale(Vec3::new(1.0, 2.0, 0.5))
    }

    #[test]
    fn test_initialize_sets_both_frames() {
        let transform = moving_transform();
        let mut tracker = FrameMatrixTracker::default();
        assert!(!tracker.is_initialized());

        tracker.initialize(&transform);

        let state = tracker.state().unwrap();
        assert_eq!(state.previous, transform.to_matrix());
        assert_eq!(state.current, transform.to_matrix());
    }

    #[test]
    fn test_tick_without_motion_publishes_identical_frames() {
        crate::foundation::logging::try_init_for_tests();
        let transform = moving_transform();
        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");

        tracker.initialize(&transform);
        let published = tracker.tick(&transform, &mut material);

        assert_eq!(published.previous, published.current);
        assert_eq!(material.matrix(&keys().previous_model), material.matrix(&keys().current_model));
        let analytic = transform.to_matrix().try_inverse().unwrap();
        assert_relative_eq!(published.current_inverse, analytic, epsilon = EPSILON);
        assert_eq!(material.matrix(&keys().current_inverse_model), Some(&published.current_inverse));
        assert_eq!(material.write_count(), 3);
    }

    #[test]
    fn test_translation_shows_up_as_delta() {
        let mut transform = moving_transform();
        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");
        tracker.initialize(&transform);

        let v = Vec3::new(0.25, 1.5, -3.0);
        transform.position += v;
        let published = tracker.tick(&transform, &mut material);

        let previous = material.matrix(&keys().previous_model).unwrap();
        let current = material.matrix(&keys().current_model).unwrap();
        assert_relative_eq!(previous.translation(), Vec3::new(2.0, -1.0, 4.0), epsilon = EPSILON);
        assert_relative_eq!(current.translation() - previous.translation(), v, epsilon = EPSILON);
        assert_eq!(*current, published.current);
    }

    #[test]
    fn test_current_times_inverse_is_identity() {
        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");

        for i in 0..8 {
            let angle = i as f32 * 0.7;
            let transform = Transform::from_position(Vec3::new(angle, -angle, 1.0))
                .with_rotation(Quat::from_euler_angles(angle, angle * 0.5, -angle))
                .with_scale(Vec3::new(0.5 + angle, 1.0, 3.0));
            let published = tracker.tick(&transform, &mut material);

            assert_relative_eq!(published.current * published.current_inverse, Mat4::identity(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_sequence_reproduces_history() {
        let history: Vec<Mat4> = (0..6)
            .map(|i| Transform::from_position(Vec3::new(i as f32, (i * i) as f32, 0.0)).to_matrix())
            .collect();

        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");
        tracker.initialize(&history[0]);

        let published: Vec<PublishedMatrices> = history[1..]
            .iter()
            .map(|m| tracker.tick(m, &mut material))
            .collect();

        for (k, step) in published.iter().enumerate() {
            assert_eq!(step.current, history[k + 1]);
            assert_eq!(step.previous, history[k]);
            if k > 0 {
                assert_eq!(step.previous, published[k - 1].current);
            }
        }
    }

    #[test]
    fn test_tick_before_initialize_reports_zero_motion() {
        let transform = moving_transform();
        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");

        let published = tracker.tick(&transform, &mut material);

        assert!(tracker.is_initialized());
        assert_eq!(published.previous, transform.to_matrix());
        assert_eq!(published.current, transform.to_matrix());
    }

    #[test]
    fn test_zero_scale_inverse_is_not_finite() {
        let degenerate = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(0.0);
        let mut tracker = FrameMatrixTracker::default();
        let mut material = Material::new("m");

        let published = tracker.tick(&degenerate, &mut material);

        assert!(!published.current_inverse.is_finite_matrix());
        let written = material.matrix(&keys().current_inverse_model).unwrap();
        assert!(!written.is_finite_matrix());
    }

    #[test]
    fn test_identity_policy_replaces_singular_inverse() {
        let degenerate = Transform::identity().with_scale(Vec3::new(0.0, 1.0, 1.0));
        let config = MotionVectorConfig::default().with_singular_inverse(SingularInversePolicy::Identity);
        let mut tracker = FrameMatrixTracker::new(config);
        let mut material = Material::new("m");

        let published = tracker.tick(&degenerate, &mut material);

        assert_eq!(published.current_inverse, Mat4::identity());
        assert_eq!(material.matrix(&keys().current_inverse_model), Some(&Mat4::identity()));
    }

    #[test]
    fn test_skip_policy_keeps_last_good_inverse() {
        let config = MotionVectorConfig::default().with_singular_inverse(SingularInversePolicy::SkipWrite);
        let mut tracker = FrameMatrixTracker::new(config);
        let mut material = Material::new("m");

        let healthy = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        let first = tracker.tick(&healthy, &mut material);
        let degenerate = healthy.with_uniform_scale(0.0);
        tracker.tick(&degenerate, &mut material);

        assert_eq!(material.matrix(&keys().current_inverse_model), Some(&first.current_inverse));
        assert_eq!(material.matrix(&keys().current_model), Some(&degenerate.to_matrix()));
        assert_eq!(material.write_count(), 5);
    }

    #[test]
    fn test_custom_parameter_names() {
        let names = ParameterNames {
            previous_model: "_PreviousFrameModelMatrix".to_string(),
            current_inverse_model: "_CurrentFrameInverseModelMatrix".to_string(),
            current_model: "_CurrentFrameModelMatrix".to_string(),
        };
        let mut tracker = FrameMatrixTracker::new(MotionVectorConfig::default().with_parameters(names.clone()));
        let mut material = Material::new("m");

        tracker.tick(&Mat4::identity(), &mut material);

        for key in names.as_array() {
            assert_eq!(material.matrix(key), Some(&Mat4::identity()));
        }
        assert!(material.matrix("CurrentFrameModelMatrix").is_none());
    }
}
