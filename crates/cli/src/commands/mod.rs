pub mod chat;
pub mod doctor;
pub mod draw;
pub mod edit;
pub mod explain;
mod images;
pub mod onboard;
pub mod setup;
