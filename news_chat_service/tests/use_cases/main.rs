#[path = "../fakes/mod.rs"]
mod fakes;

mod answer_chat;
mod generative_client;
mod helpers;
