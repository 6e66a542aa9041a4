pub mod bus;
pub mod duty;
pub mod time_format;
pub mod timeline;
