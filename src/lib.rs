// Library for tests to access modules

pub mod cache;
pub mod collector;
pub mod config;
pub mod external;
pub mod hub;
pub mod models;
pub mod routes;
pub mod sampler;
pub mod store;
pub mod version;
