pub mod error;
pub mod grid;
pub mod patrol;
pub mod regions;
pub mod registry;
pub mod replay;
pub mod trace;
pub mod trails;
pub mod y2023;
pub mod y2024;
