pub mod types;
pub mod error;
pub mod patch;
pub mod board;
pub mod rules;
pub mod check;
pub mod notation;
pub mod execute;
pub mod movegen;
pub mod game;
pub mod perft;
