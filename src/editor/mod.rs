pub mod codec;
pub mod commands;
pub mod controller;
pub mod history;
pub mod messages;
pub mod remote;
pub mod settings;
pub mod stamp;
pub mod types;
