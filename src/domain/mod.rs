pub mod credential;
pub mod ticket;
pub mod project;
pub mod settings;
