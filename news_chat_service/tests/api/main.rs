#[path = "../fakes/mod.rs"]
mod fakes;

mod chat;
mod health_check;
mod session;
