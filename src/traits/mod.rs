//! Core traits for containers and autowiring.

mod autowire;
mod container;

pub use autowire::Autowire;
pub use container::{AnyArc, Container, ContainerCore, SharedContainer};
