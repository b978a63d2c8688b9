pub mod clock;
pub mod context;
pub mod data;
pub mod office;
pub mod shifts;
