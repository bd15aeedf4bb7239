//! Bag-of-words TF-IDF text similarity.
//!
//! Follows the common scikit-learn defaults: tokens are runs of two or more word
//! characters, idf is smoothed (`ln((1 + n) / (1 + df)) + 1`), rows are L2-normalized,
//! and vocabulary columns are the sorted term list.

mod sparse;
mod vectorizer;

pub use sparse::{cosine_similarity, SparseVector, TfidfMatrix};
pub use vectorizer::TfidfVectorizer;
