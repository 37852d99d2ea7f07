//! Per-tick passes, run in order by `PhysicsEngine::tick`:
//! grid rebuild, neighbor forces, kinematic + role update.

pub mod forces;
pub mod kinematics;
pub mod rebuild;
