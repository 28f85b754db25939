pub mod batch;
pub mod curves;
pub mod decay;
pub mod difficulty;
pub mod opportunity;
