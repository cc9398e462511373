pub mod entry;
pub mod keys;
pub mod protected;
