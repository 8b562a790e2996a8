mod metadata_client;
mod rating_client;

pub use metadata_client::MetadataClient;
pub use rating_client::RatingClient;
