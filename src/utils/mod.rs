//! Buffer helpers and dip refinement shared by the detectors.
pub mod buffer;
pub mod peak;
