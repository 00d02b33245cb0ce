//! Getting a trustworthy edition document off the network.

pub mod index;
pub mod signatures;
pub mod validator;

pub use index::{declared_release_date, edition_links, link_for, EditionLink};
pub use signatures::{classify_content, large_number_count, looks_like_edition, ContentVerdict};
pub use validator::{EditionFetcher, FetchStage, FetchedEdition};
