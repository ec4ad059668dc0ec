pub mod state;
pub mod noise;
pub mod params;
pub mod error;
pub mod drift;
pub mod diffusion;
pub mod directors;
pub mod stepper;
pub mod correction;
pub mod path;
pub mod measure;
pub mod bridge;

// Core types
pub type F = f64;
pub use state::Position;
pub use noise::NoiseGenerator;
pub use params::{BridgeParams, StepRuleKind, TerminalMode};
pub use error::{BridgeError, BridgeResult};

/// Distances and norms below this are treated as zero.
pub const EPSILON: F = 1e-10;

// Step rules
pub use drift::{Direction, StepDirector, StepState};
pub use directors::{AnyDirector, BridgeProjection, DriftBlend, MAX_DRIFT_STRENGTH, MAX_REDRAWS};

// Stepping and post-processing
pub use stepper::{FixedMagnitudeStepper, Step};
pub use correction::{CorrectionReport, TerminalCorrector, CORRECTION_WINDOW};

// Trajectory, generation and validation
pub use path::Trajectory;
pub use bridge::{generate_bridge, simulate, BridgeGenerator, BridgeRun};
pub use measure::{validate, validate_exact, StepStatistics, ValidationReport};
