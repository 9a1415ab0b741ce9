//! Script swapping between actors whose paths meet.
//!
//! `predictive` decides swaps once, at run start, from projected end poses.
//! `proximity` decides them every frame from live positions.

pub mod predictive;
pub mod proximity;

pub use predictive::{resolve, SwapPlan};
pub use proximity::{ordered_pair, ProximityTracker};
