pub mod bill;
pub mod ledger;
pub mod money;
pub mod person;
pub mod trip;
