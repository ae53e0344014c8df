pub mod rules;
pub mod settings;
