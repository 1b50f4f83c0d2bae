// Moderation Gateway: a thin HTTP relay in front of the OpenAI Moderation API.
//
// This is the library root. The binary in main.rs only parses flags, loads
// configuration, and hands off to `web::run_server`.

pub mod config;
pub mod error;
pub mod moderation;
pub mod web;
