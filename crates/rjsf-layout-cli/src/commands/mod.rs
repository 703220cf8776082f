pub mod render;
pub mod resolve;
pub mod switch;
