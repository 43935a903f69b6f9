pub mod ingestion;
pub mod overlap;
pub mod roster;
pub mod scoring;

#[cfg(test)]
pub(crate) mod fixtures;
