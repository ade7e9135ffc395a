pub mod reports;
pub mod scenarios;
pub mod tester;

pub use scenarios::Scenario;
pub use tester::*;
