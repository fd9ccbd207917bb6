pub mod entities;
pub mod readers;
pub mod services;
