pub mod circuit;
pub mod fixture;
pub mod indices;
pub mod tech;
