pub mod relay;
pub mod window;
