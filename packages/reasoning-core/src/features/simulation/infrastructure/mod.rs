pub mod simulator;

pub use simulator::GraphSimulator;
