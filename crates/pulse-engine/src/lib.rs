pub mod engine;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod server;

pub use engine::controller::{RunController, RunState, StartAck, StatusSnapshot};
pub use engine::devices::{load_devices, DeviceIdentity};
pub use parser::link::extract_subject_id;
