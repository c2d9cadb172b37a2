pub mod components;
pub mod plugins;
pub mod sync;
