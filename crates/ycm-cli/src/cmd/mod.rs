pub mod debounce;
pub mod normalize;
pub mod port;
pub mod python;
pub mod settings;
pub mod which;
