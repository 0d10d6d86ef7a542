#![warn(missing_docs)]
//! # moodsense-contract-tests
//!
//! Holds no runtime code; the crate exists to validate the frozen JSON
//! contract fixtures under the workspace `contracts/` directory against
//! their schemas. See `tests/contract_validation.rs`.
