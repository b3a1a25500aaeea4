pub mod status;
pub mod up;
