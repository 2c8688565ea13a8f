pub mod content_url;
pub mod data_uri;
pub mod iri;
pub mod lookup;
