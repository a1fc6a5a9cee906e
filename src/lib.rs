pub mod clipboard;
pub mod config;
pub mod controller;
pub mod proxy;
pub mod theme;
pub mod transcribe;
pub mod ui;
