//! Test utilities: seeded synthetic datasets shared by unit tests,
//! integration tests and benches.

pub mod data;
