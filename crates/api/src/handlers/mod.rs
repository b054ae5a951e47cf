pub mod friends;
pub mod items;
