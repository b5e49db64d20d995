//! Sentence embeddings from a BERT encoder (all-MiniLM-L6-v2 by default).

use candle_core::{Device, Tensor};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationParams};

use crate::nlp::hub::{load_tokenizer, load_weights, read_json, ModelFiles};
use crate::nlp::{ModelError, TextEmbedder};

/// Word pieces seen by the encoder; longer inputs are truncated.
const MAX_EMBEDDING_TOKENS: usize = 256;

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl BertEmbedder {
    pub fn load(model_id: &str, revision: &str) -> Result<Self, ModelError> {
        let files = ModelFiles::fetch(model_id, revision)?;
        let device = Device::Cpu;

        let config: Config = read_json(&files.config)?;
        let mut tokenizer = load_tokenizer(&files.tokenizer)?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length: MAX_EMBEDDING_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let vb = load_weights(&files.weights, &device)?;
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl TextEmbedder for BertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = normalize_l2(&mean_pool(&hidden, &attention_mask)?)?;

        Ok(pooled.squeeze(0)?.to_vec1::<f32>()?)
    }
}

/// Averages token vectors, ignoring padding. `hidden` is (batch, seq, dim).
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = attention_mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?;
    summed.broadcast_div(&counts)
}

fn normalize_l2(v: &Tensor) -> candle_core::Result<Tensor> {
    v.broadcast_div(&v.sqr()?.sum_keepdim(1)?.sqrt()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_masked_tokens() {
        let device = Device::Cpu;
        // One sequence of three tokens, the last one padding.
        let hidden = Tensor::new(&[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]], &device).unwrap();
        let mask = Tensor::new(&[[1u32, 1, 0]], &device).unwrap();

        let pooled = mean_pool(&hidden, &mask).unwrap();
        let values = pooled.squeeze(0).unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_normalize_l2_yields_unit_vector() {
        let device = Device::Cpu;
        let v = Tensor::new(&[[3.0f32, 4.0]], &device).unwrap();
        let values = normalize_l2(&v).unwrap().squeeze(0).unwrap().to_vec1::<f32>().unwrap();
        assert!((values[0] - 0.6).abs() < 1e-6);
        assert!((values[1] - 0.8).abs() < 1e-6);
    }
}
