pub mod controller;
pub mod ingester;
pub mod repository;
pub mod service;
