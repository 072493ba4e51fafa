pub mod fx;
pub mod pixel;
