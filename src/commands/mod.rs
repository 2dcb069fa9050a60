// Command implementations for the scaf binary

pub mod resolve;
pub mod sources;
