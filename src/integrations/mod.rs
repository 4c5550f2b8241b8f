pub mod email;
pub mod wallet;
