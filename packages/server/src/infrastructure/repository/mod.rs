//! Storage for the live-stream aggregate.

pub mod inmemory;

pub use inmemory::InMemoryStreamStore;
