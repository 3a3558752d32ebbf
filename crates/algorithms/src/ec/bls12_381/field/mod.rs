//! Base field of BLS12-381

pub mod fp;
