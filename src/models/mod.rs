pub mod assignment;
pub mod task;

pub use assignment::*;
pub use task::*;
