pub mod decoder;
pub mod event;
