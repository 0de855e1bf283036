pub mod atomic_file;
pub mod container;
pub mod secret;
