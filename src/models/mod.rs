// src/models/mod.rs

pub mod chatbox;
pub mod conversation;
pub mod profile;
pub mod question;
pub mod quiz_assessment;
pub mod response;
pub mod user_quiz_assessment;
