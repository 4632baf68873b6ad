//! Load types

mod distributed;
mod point_load;

pub use distributed::DistributedLoad;
pub use point_load::{LoadComponent, PointLoad};
