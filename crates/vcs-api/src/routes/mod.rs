//! # API Route Modules

pub mod credentials;
