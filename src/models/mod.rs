pub mod booking;
pub mod event;
pub mod message;
pub mod order;
pub mod outbox;
pub mod product;
pub mod reset_code;
pub mod session;
pub mod user;
pub mod wishlist;
