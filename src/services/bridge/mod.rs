pub mod merger;
pub mod parser;
pub mod scheduler;
pub mod status;
pub mod webhook;
pub mod zones;

#[cfg(test)]
pub(crate) mod test_support;
