pub mod controller;
pub mod devices;
pub mod executor;
