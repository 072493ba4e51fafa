pub mod ease;
pub mod envelope;
pub mod keyframes;
pub mod pattern;
pub mod schedule;
