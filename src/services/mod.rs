pub mod allocator;
pub mod config_loader;
pub mod eligibility;
pub mod feed_parser;
pub mod format;
pub mod ledger;
pub mod ranker;
pub mod snapshot;

#[cfg(test)]
pub mod test_fixtures;
