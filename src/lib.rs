pub mod app;
pub mod config;
pub mod credits;
pub mod error;
pub mod images;
pub mod screens;
pub mod tmdb;
