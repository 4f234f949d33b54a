// Miner rotation analysis over locally stored block dumps
pub mod analysis;
pub mod chain;
pub mod plot;
pub mod runner;
pub mod utils;
