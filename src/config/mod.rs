/// Database connection and schema management
pub mod database;
