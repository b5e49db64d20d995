//! Named-entity recognition via BERT token classification (CoNLL-style BIO tags).

use std::collections::HashMap;

use candle_core::{Device, Tensor, D};
use candle_nn::{Linear, Module};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::nlp::hub::{load_tokenizer, load_weights, read_json, ModelFiles};
use crate::nlp::{EntityRecognizer, ModelError};

/// Coarse entity classes. Taggers disagree on label names, so several map to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Product,
    Person,
    Location,
    Other,
}

impl EntityKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ORG" => EntityKind::Organization,
            "PRODUCT" | "MISC" => EntityKind::Product,
            "PER" | "PERSON" => EntityKind::Person,
            "LOC" | "GPE" => EntityKind::Location,
            _ => EntityKind::Other,
        }
    }

    /// Organizations and products are kept as candidate skills (tools, vendors, platforms).
    pub fn is_skill_candidate(self) -> bool {
        matches!(self, EntityKind::Organization | EntityKind::Product)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

/// Recognizer used when the entity fallback is switched off.
pub struct DisabledRecognizer;

impl EntityRecognizer for DisabledRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<Entity>, ModelError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct LabelConfig {
    hidden_size: usize,
    id2label: HashMap<String, String>,
    #[serde(default = "default_max_positions")]
    max_position_embeddings: usize,
}

fn default_max_positions() -> usize {
    512
}

pub struct BertEntityRecognizer {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    cls_id: u32,
    sep_id: u32,
    /// Content tokens per forward pass, excluding [CLS] and [SEP].
    window: usize,
    device: Device,
}

impl BertEntityRecognizer {
    pub fn load(model_id: &str, revision: &str) -> Result<Self, ModelError> {
        let files = ModelFiles::fetch(model_id, revision)?;
        let device = Device::Cpu;

        let config: Config = read_json(&files.config)?;
        let label_config: LabelConfig = read_json(&files.config)?;
        let labels = ordered_labels(&label_config.id2label)?;

        let mut tokenizer = load_tokenizer(&files.tokenizer)?;
        tokenizer
            .with_padding(None)
            .with_truncation(None)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
        let cls_id = special_token_id(&tokenizer, "[CLS]")?;
        let sep_id = special_token_id(&tokenizer, "[SEP]")?;

        let vb = load_weights(&files.weights, &device)?;
        let model = BertModel::load(vb.clone(), &config)?;
        let classifier = candle_nn::linear(
            label_config.hidden_size,
            labels.len(),
            vb.pp("classifier"),
        )?;

        Ok(Self {
            model,
            classifier,
            tokenizer,
            labels,
            cls_id,
            sep_id,
            window: label_config.max_position_embeddings.min(512) - 2,
            device,
        })
    }

    /// Tags one window of content tokens; returns one label index per token.
    fn tag_window(&self, ids: &[u32]) -> Result<Vec<u32>, ModelError> {
        let mut input = Vec::with_capacity(ids.len() + 2);
        input.push(self.cls_id);
        input.extend_from_slice(ids);
        input.push(self.sep_id);

        let input_ids = Tensor::new(input.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        let logits = self.classifier.forward(&hidden)?;
        let predictions = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        Ok(predictions[1..predictions.len() - 1].to_vec())
    }
}

impl EntityRecognizer for BertEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut labels = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.window) {
            for index in self.tag_window(chunk)? {
                let label = self
                    .labels
                    .get(index as usize)
                    .map(String::as_str)
                    .unwrap_or("O");
                labels.push(label);
            }
        }

        Ok(decode_entities(
            text,
            encoding.get_tokens(),
            encoding.get_offsets(),
            &labels,
        ))
    }
}

fn ordered_labels(id2label: &HashMap<String, String>) -> Result<Vec<String>, ModelError> {
    let mut labels = vec![String::new(); id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| ModelError::Config(format!("non-numeric label id '{id}'")))?;
        let slot = labels
            .get_mut(index)
            .ok_or_else(|| ModelError::Config(format!("label id {index} out of range")))?;
        *slot = label.clone();
    }
    Ok(labels)
}

fn special_token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, ModelError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| ModelError::Tokenizer(format!("tokenizer has no {token} token")))
}

/// Groups BIO-tagged word pieces into entity spans over `text`.
///
/// `offsets` are byte offsets into `text`. Continuation pieces (`##...`)
/// follow the label of the word they belong to.
fn decode_entities(
    text: &str,
    tokens: &[String],
    offsets: &[(usize, usize)],
    labels: &[&str],
) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<(EntityKind, usize, usize)> = None;

    let flush = |span: Option<(EntityKind, usize, usize)>, entities: &mut Vec<Entity>| {
        if let Some((kind, start, end)) = span {
            if let Some(slice) = text.get(start..end) {
                let trimmed = slice.trim();
                if !trimmed.is_empty() {
                    entities.push(Entity {
                        text: trimmed.to_string(),
                        kind,
                    });
                }
            }
        }
    };

    for ((token, &(start, end)), &label) in tokens.iter().zip(offsets).zip(labels) {
        if token.starts_with("##") {
            if let Some(span) = current.as_mut() {
                span.2 = end;
            }
            continue;
        }

        let (prefix, tag) = label.split_once('-').unwrap_or((label, ""));
        if label == "O" || tag.is_empty() {
            flush(current.take(), &mut entities);
            continue;
        }

        let kind = EntityKind::from_tag(tag);
        match current {
            Some((open_kind, open_start, _)) if prefix == "I" && open_kind == kind => {
                current = Some((open_kind, open_start, end));
            }
            _ => {
                flush(current.take(), &mut entities);
                current = Some((kind, start, end));
            }
        }
    }
    flush(current, &mut entities);

    entities
}
