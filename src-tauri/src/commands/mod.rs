pub mod bridge;
pub mod camera;
pub mod location;
