mod lemmatizer;
mod normalizer;
mod stopwords;

pub use lemmatizer::lemmatize;
pub use normalizer::{TextNormalizer, TokenForm};
pub use stopwords::is_stopword;
