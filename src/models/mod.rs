pub mod chat;
pub mod maps;
