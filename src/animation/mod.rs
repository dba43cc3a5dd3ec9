pub mod ease;
pub mod kinematics;
pub mod tween;
