pub mod connect;
pub mod path;
