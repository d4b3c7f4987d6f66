pub mod catalog;
pub mod config;
pub mod format;
pub mod i18n;
pub mod mesh;
pub mod pricing;
pub mod renderer;
pub mod settings;
pub mod texture;
pub mod ui;
pub mod viewer;
