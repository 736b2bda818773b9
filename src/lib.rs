pub mod catalog;
pub mod cli;
pub mod menu;
pub mod nutrition;
pub mod products;
pub mod store;
pub mod text;
