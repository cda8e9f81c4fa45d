pub mod authenticate;
pub mod cart;
pub mod credential;
pub mod gate;
pub mod permission;
pub mod settlement;
pub mod token;
pub mod user;
