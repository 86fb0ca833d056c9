pub mod client;
pub mod clock;
pub mod distributions;
pub mod error;
pub mod events;
pub mod ledger;
pub mod matching;
pub mod pricing;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod spatial;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
