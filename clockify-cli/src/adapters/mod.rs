pub mod clockify;
#[cfg(test)]
pub mod mock;
pub mod terminal;
