pub mod bootstrap;
pub mod domain;
pub mod engine;
pub mod http;
pub mod locks;
pub mod query;
pub mod store;

pub use engine::{Engine, EngineError};
pub use locks::LockRegistry;
pub use store::Store;
