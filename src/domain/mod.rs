pub mod access;
pub mod brand;
pub mod category;
pub mod customer;
pub mod discount;
pub mod errors;
pub mod lenient;
pub mod listing;
pub mod order;
pub mod ports;
pub mod product;
pub mod reference;
pub mod resource;
pub mod role;
pub mod session;
pub mod slug;
pub mod sorting;
pub mod user;
pub mod validation;
