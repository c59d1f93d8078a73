pub mod credentials;
pub mod directory;
pub mod session;
pub mod ticket;
