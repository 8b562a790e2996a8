mod selector;

pub use selector::{select_endpoint, service_connection};
