pub mod frames;
pub mod process;
