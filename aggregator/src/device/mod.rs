pub mod model;
pub mod repository;

pub use model::{Device, DeviceSet};
pub use repository::DeviceRepository;
