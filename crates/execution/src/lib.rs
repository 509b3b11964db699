pub mod sim;

pub use sim::ExecutionModel;
