use crate::{BoxFuture, EmbeddingProvider, Result};

pub const NULL_MODEL: &str = "null";

/// Produces all-zero vectors. Paired with a disabled backend so nothing it returns is indexed.
pub struct NullEmbedder {
	dimensions: usize,
}
impl NullEmbedder {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions }
	}
}
impl EmbeddingProvider for NullEmbedder {
	fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|_| vec![0.0; self.dimensions]).collect();

		Box::pin(async move { Ok(vectors) })
	}

	fn model(&self) -> &str {
		NULL_MODEL
	}
}
