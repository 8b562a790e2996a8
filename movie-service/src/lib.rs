pub mod controller;
pub mod gateway;
pub mod service;
