pub mod init;
pub mod list;
pub mod search;
pub mod show;
pub mod tui;
