pub mod hit_testing;
pub mod transform;

pub use hit_testing::BrushHitMode;
pub use transform::CanvasTransform;
