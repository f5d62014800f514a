//! BERT sequence classifier running on CPU with candle.
//!
//! Loads a directory saved by `save_pretrained` for a
//! `BertForSequenceClassification` model: `config.json`, `tokenizer.json`
//! and `model.safetensors`.

use super::{Prediction, TextClassifier};
use crate::error::{Error, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{embedding, layer_norm, linear, Activation, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

/// Model directory used when none is given.
pub const DEFAULT_MODEL_DIR: &str = "./trained_model";

/// Subset of the Hugging Face BERT config we need.
#[derive(Debug, Clone, Deserialize)]
struct Config {
    vocab_size: usize,
    hidden_size: usize,
    num_hidden_layers: usize,
    num_attention_heads: usize,
    intermediate_size: usize,
    #[serde(default = "default_hidden_act")]
    hidden_act: String,
    #[serde(default = "default_max_position_embeddings")]
    max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    layer_norm_eps: f64,
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    num_labels: Option<usize>,
}

fn default_hidden_act() -> String {
    "gelu".to_string()
}

fn default_max_position_embeddings() -> usize {
    512
}

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

impl Config {
    fn labels(&self) -> Vec<String> {
        let count = if self.id2label.is_empty() {
            self.num_labels.unwrap_or(2)
        } else {
            self.id2label.len()
        };
        (0..count)
            .map(|i| {
                self.id2label
                    .get(&i.to_string())
                    .cloned()
                    .unwrap_or_else(|| format!("LABEL_{}", i))
            })
            .collect()
    }

    fn activation(&self) -> Activation {
        match self.hidden_act.as_str() {
            "relu" => Activation::Relu,
            "gelu_new" => Activation::NewGelu,
            _ => Activation::Gelu,
        }
    }
}

struct Embeddings {
    word: Embedding,
    position: Embedding,
    token_type: Embedding,
    layer_norm: LayerNorm,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        Ok(Self {
            word: embedding(config.vocab_size, config.hidden_size, vb.pp("word_embeddings"))?,
            position: embedding(
                config.max_position_embeddings,
                config.hidden_size,
                vb.pp("position_embeddings"),
            )?,
            token_type: embedding(
                config.type_vocab_size,
                config.hidden_size,
                vb.pp("token_type_embeddings"),
            )?,
            layer_norm: layer_norm(config.hidden_size, config.layer_norm_eps, vb.pp("LayerNorm"))?,
        })
    }

    fn forward(&self, input_ids: &Tensor, token_type_ids: &Tensor, position_ids: &Tensor) -> Result<Tensor> {
        let words = self.word.forward(input_ids)?;
        let positions = self.position.forward(position_ids)?;
        let token_types = self.token_type.forward(token_type_ids)?;
        let sum = ((words + positions)? + token_types)?;
        Ok(self.layer_norm.forward(&sum)?)
    }
}

struct SelfAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    heads: usize,
    head_size: usize,
}

impl SelfAttention {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let head_size = config.hidden_size / config.num_attention_heads;
        let all = config.num_attention_heads * head_size;
        Ok(Self {
            query: linear(config.hidden_size, all, vb.pp("query"))?,
            key: linear(config.hidden_size, all, vb.pp("key"))?,
            value: linear(config.hidden_size, all, vb.pp("value"))?,
            heads: config.num_attention_heads,
            head_size,
        })
    }

    // (batch, seq, hidden) -> (batch, heads, seq, head_size)
    fn transpose_for_scores(&self, x: &Tensor) -> Result<Tensor> {
        let (batch, seq, _) = x.dims3()?;
        Ok(x.reshape((batch, seq, self.heads, self.head_size))?
            .transpose(1, 2)?
            .contiguous()?)
    }

    fn forward(&self, hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let q = self.transpose_for_scores(&self.query.forward(hidden)?)?;
        let k = self.transpose_for_scores(&self.key.forward(hidden)?)?;
        let v = self.transpose_for_scores(&self.value.forward(hidden)?)?;

        let scores = (q.matmul(&k.t()?)? / (self.head_size as f64).sqrt())?;
        let scores = scores.broadcast_add(mask)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;

        let context = probs.matmul(&v)?.transpose(1, 2)?.contiguous()?;
        let (batch, seq, _, _) = context.dims4()?;
        Ok(context.reshape((batch, seq, self.heads * self.head_size))?)
    }
}

/// Dense projection, residual add and layer norm.
struct ResidualOutput {
    dense: Linear,
    layer_norm: LayerNorm,
}

impl ResidualOutput {
    fn load(vb: VarBuilder, input: usize, config: &Config) -> Result<Self> {
        Ok(Self {
            dense: linear(input, config.hidden_size, vb.pp("dense"))?,
            layer_norm: layer_norm(config.hidden_size, config.layer_norm_eps, vb.pp("LayerNorm"))?,
        })
    }

    fn forward(&self, hidden: &Tensor, residual: &Tensor) -> Result<Tensor> {
        let hidden = self.dense.forward(hidden)?;
        Ok(self.layer_norm.forward(&(hidden + residual)?)?)
    }
}

struct Layer {
    attention: SelfAttention,
    attention_output: ResidualOutput,
    intermediate: Linear,
    activation: Activation,
    output: ResidualOutput,
}

impl Layer {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let attention = vb.pp("attention");
        Ok(Self {
            attention: SelfAttention::load(attention.pp("self"), config)?,
            attention_output: ResidualOutput::load(attention.pp("output"), config.hidden_size, config)?,
            intermediate: linear(
                config.hidden_size,
                config.intermediate_size,
                vb.pp("intermediate").pp("dense"),
            )?,
            activation: config.activation(),
            output: ResidualOutput::load(vb.pp("output"), config.intermediate_size, config)?,
        })
    }

    fn forward(&self, hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let attended = self.attention.forward(hidden, mask)?;
        let attended = self.attention_output.forward(&attended, hidden)?;
        let intermediate = self.activation.forward(&self.intermediate.forward(&attended)?)?;
        self.output.forward(&intermediate, &attended)
    }
}

struct SequenceClassifier {
    embeddings: Embeddings,
    layers: Vec<Layer>,
    pooler: Linear,
    classifier: Linear,
}

impl SequenceClassifier {
    fn load(vb: VarBuilder, config: &Config, num_labels: usize) -> Result<Self> {
        let bert = vb.pp("bert");
        let encoder = bert.pp("encoder").pp("layer");
        let layers = (0..config.num_hidden_layers)
            .map(|i| Layer::load(encoder.pp(i), config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            embeddings: Embeddings::load(bert.pp("embeddings"), config)?,
            layers,
            pooler: linear(config.hidden_size, config.hidden_size, bert.pp("pooler").pp("dense"))?,
            classifier: linear(config.hidden_size, num_labels, vb.pp("classifier"))?,
        })
    }

    /// Class probabilities for one encoded sequence.
    fn forward(&self, ids: &[u32], attention: &[u32], device: &Device) -> Result<Vec<f32>> {
        let seq = ids.len();
        let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::zeros((1, seq), DType::U32, device)?;
        let positions: Vec<u32> = (0..seq as u32).collect();
        let position_ids = Tensor::new(positions.as_slice(), device)?.unsqueeze(0)?;

        // 0 where attended, -10000 where masked
        let mask = Tensor::new(attention, device)?
            .to_dtype(DType::F32)?
            .affine(10000.0, -10000.0)?
            .reshape((1, 1, 1, seq))?;

        let mut hidden = self.embeddings.forward(&input_ids, &token_type_ids, &position_ids)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden, &mask)?;
        }

        let first = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&first)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;
        let probs = candle_nn::ops::softmax_last_dim(&logits)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

/// Fine-tuned BERT paragraph classifier.
pub struct BertClassifier {
    model: SequenceClassifier,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    max_len: usize,
    device: Device,
}

impl BertClassifier {
    /// Load a model directory.
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let dir = model_dir.as_ref();
        let device = Device::Cpu;

        let config_path = require(dir, "config.json")?;
        let json = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&json)
            .map_err(|e| Error::Model(format!("{}: {}", config_path.display(), e)))?;
        let labels = config.labels();

        let tokenizer_path = require(dir, "tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Model(format!("{}: {}", tokenizer_path.display(), e)))?;

        let weights = require(dir, "model.safetensors")?;
        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)? };
        let model = SequenceClassifier::load(vb, &config, labels.len())?;

        log::info!(
            "Loaded classifier from {}: {} layers, labels {:?}",
            dir.display(),
            config.num_hidden_layers,
            labels
        );

        Ok(Self {
            model,
            tokenizer,
            labels,
            max_len: config.max_position_embeddings,
            device,
        })
    }

    /// Labels in class-index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn require(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::Model(format!("{} not found", path.display())))
    }
}

/// Cut a sequence to `max_len` tokens, keeping its final special token.
fn truncate(mut tokens: Vec<u32>, max_len: usize) -> Vec<u32> {
    if tokens.len() > max_len && max_len > 0 {
        let last = tokens[tokens.len() - 1];
        tokens.truncate(max_len - 1);
        tokens.push(last);
    }
    tokens
}

impl TextClassifier for BertClassifier {
    fn predict(&self, text: &str) -> Result<Prediction> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Model(format!("tokenization failed: {}", e)))?;

        let ids = truncate(encoding.get_ids().to_vec(), self.max_len);
        let attention = truncate(encoding.get_attention_mask().to_vec(), self.max_len);
        let probs = self.model.forward(&ids, &attention, &self.device)?;

        let (index, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::Model("model produced no classes".to_string()))?;

        let label = self
            .labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", index));
        Ok(Prediction::new(label, score))
    }
}
