pub mod audit;
pub mod check;
