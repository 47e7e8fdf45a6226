//! Server-rendered pages. Every function here is pure: view state in, HTML out.

pub mod admin;
pub mod auth;
pub mod browse;
pub mod chat;
pub mod dashboard;
pub mod home;
pub mod inbox;
pub mod layout;
pub mod profile;
pub mod requests;
pub mod service;
pub mod upgrade;
