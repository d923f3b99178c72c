//! Camera math, projection and picking shared by the core and the viewer.

pub mod camera;
pub mod mesh;
pub mod picking;
pub mod projection;
