pub mod compounding;
pub mod portfolio;
