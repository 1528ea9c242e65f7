pub mod directory;
pub mod profile;
