pub mod aggregator;
pub mod simplifier;
