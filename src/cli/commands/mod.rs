pub mod asset;
pub mod login;
pub mod lookup;
pub mod search;
pub mod token;
