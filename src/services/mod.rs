pub mod authz;
pub mod token;
