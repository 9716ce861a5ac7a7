pub mod init;
pub mod list;
pub mod show;
pub mod take;
pub mod validate;
