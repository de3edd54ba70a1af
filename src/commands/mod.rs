pub mod find;
pub mod update;
