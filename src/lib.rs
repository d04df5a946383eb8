pub mod configure;
pub mod directory;
pub mod errors;
pub mod logger;
pub mod models;
pub mod projection;
pub mod service;
pub mod store;
pub mod validator;
