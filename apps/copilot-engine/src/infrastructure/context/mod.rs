//! Context Provider Adapters

mod http;

pub use http::HttpContextProvider;
