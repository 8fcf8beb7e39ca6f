pub mod converter;
pub mod dictionary;
pub mod engine;
pub mod selector;
pub mod table;
pub mod types;
