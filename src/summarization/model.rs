// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BART-large-CNN summarizer
//!
//! Runs the encoder once, then beam-searches from `</s> <s>` with the
//! model's published generation settings: 4 beams, length penalty 2.0,
//! early stopping, a minimum length and a no-repeat-trigram constraint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::models::generation::{beam_search, last_token_logits, BeamConfig, GenerationConfig};
use crate::models::{SummaryParams, TextSummarizer};

const ENCODER_MODEL_FILE: &str = "encoder_model.onnx";
const DECODER_MODEL_FILE: &str = "decoder_model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Encoder input window in tokens
pub const MAX_INPUT_TOKENS: usize = 1024;

/// BART-large-CNN generation settings
const NO_REPEAT_NGRAM_SIZE: usize = 3;
const BEAM: BeamConfig = BeamConfig {
    num_beams: 4,
    length_penalty: 2.0,
    early_stopping: true,
};

/// Cut `ids` to `max_len`, keeping the trailing EOS
///
/// Returns whether anything was dropped.
pub fn truncate_input_ids(ids: &mut Vec<u32>, max_len: usize, eos_token_id: u32) -> bool {
    if ids.len() <= max_len || max_len == 0 {
        return false;
    }
    ids.truncate(max_len - 1);
    ids.push(eos_token_id);
    true
}

/// BART encoder-decoder summarizer
#[derive(Clone)]
pub struct BartSummarizer {
    encoder_session: Arc<Mutex<Session>>,
    decoder_session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    /// Token the decoder starts from (`</s>` for BART)
    decoder_start_token_id: u32,
    /// Token forced at the first generated position (`<s>`)
    bos_token_id: u32,
    eos_token_id: u32,
}

impl std::fmt::Debug for BartSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BartSummarizer")
            .field("decoder_start_token_id", &self.decoder_start_token_id)
            .field("bos_token_id", &self.bos_token_id)
            .field("eos_token_id", &self.eos_token_id)
            .finish_non_exhaustive()
    }
}

fn load_session(path: &Path) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(path)
        .with_context(|| format!("Failed to load ONNX model from {}", path.display()))
}

impl BartSummarizer {
    /// Load the summarizer from `model_dir`
    ///
    /// # Errors
    /// Returns error if the encoder, decoder or tokenizer is missing, or if
    /// ONNX Runtime rejects either graph.
    pub async fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let encoder_path = model_dir.join(ENCODER_MODEL_FILE);
        let decoder_path = model_dir.join(DECODER_MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        for path in [&encoder_path, &decoder_path, &tokenizer_path] {
            if !path.exists() {
                anyhow::bail!("Summarization model file not found: {}", path.display());
            }
        }

        info!("Loading summarization model from {}", model_dir.display());

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        info!(
            "Loaded tokenizer with {} tokens",
            tokenizer.get_vocab_size(true)
        );

        let encoder_session = load_session(&encoder_path)?;
        let decoder_session = load_session(&decoder_path)?;

        let input_names: Vec<_> = decoder_session.inputs.iter().map(|i| &i.name).collect();
        debug!("Summarization decoder inputs: {:?}", input_names);

        let bos_token_id = tokenizer.token_to_id("<s>").unwrap_or(0);
        let eos_token_id = tokenizer.token_to_id("</s>").unwrap_or(2);

        Ok(Self {
            encoder_session: Arc::new(Mutex::new(encoder_session)),
            decoder_session: Arc::new(Mutex::new(decoder_session)),
            tokenizer: Arc::new(tokenizer),
            decoder_start_token_id: eos_token_id,
            bos_token_id,
            eos_token_id,
        })
    }

    /// Summarize synchronously
    pub fn summarize_blocking(&self, text: &str, params: &SummaryParams) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Failed to encode text: {}", e))?;
        let mut input_ids = encoding.get_ids().to_vec();

        let original_len = input_ids.len();
        if truncate_input_ids(&mut input_ids, MAX_INPUT_TOKENS, self.eos_token_id) {
            warn!(
                "Input of {} tokens truncated to {}",
                original_len, MAX_INPUT_TOKENS
            );
        }

        let (hidden_states, attention_mask) = self.encode(&input_ids)?;

        // Lengths count the decoder start token, as in generate()
        let config = GenerationConfig {
            eos_token_id: self.eos_token_id,
            min_length: params.min_length,
            max_length: params.max_length.max(2),
            no_repeat_ngram_size: NO_REPEAT_NGRAM_SIZE,
        };

        let prefix = [self.decoder_start_token_id, self.bos_token_id];
        let tokens = beam_search(&prefix, &config, &BEAM, |tokens| {
            self.decode_step(&hidden_states, &attention_mask, tokens)
        })?;

        debug!("Summary generated {} tokens", tokens.len());

        let summary = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))?;
        Ok(summary.trim().to_string())
    }

    /// Run the encoder, returning hidden states and the mask used
    fn encode(&self, input_ids: &[u32]) -> Result<(ArrayD<f32>, Array2<i64>)> {
        let seq_len = input_ids.len();
        let ids = Array2::from_shape_vec(
            (1, seq_len),
            input_ids.iter().map(|&t| t as i64).collect(),
        )?;
        let attention_mask = Array2::<i64>::ones((1, seq_len));

        let ids_value = Value::from_array(ids).context("Failed to create input IDs tensor")?;
        let mask_value = Value::from_array(attention_mask.clone())
            .context("Failed to create attention mask tensor")?;

        let mut session = self
            .encoder_session
            .lock()
            .map_err(|_| anyhow::anyhow!("Summarization encoder session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value
            ])
            .context("Summarization encoder inference failed")?;

        let hidden = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract encoder output")?;
        Ok((hidden.to_owned(), attention_mask))
    }

    fn decode_step(
        &self,
        hidden_states: &ArrayD<f32>,
        encoder_mask: &Array2<i64>,
        tokens: &[u32],
    ) -> Result<Vec<f32>> {
        let ids = Array2::from_shape_vec(
            (1, tokens.len()),
            tokens.iter().map(|&t| t as i64).collect(),
        )?;

        let ids_value = Value::from_array(ids).context("Failed to create input IDs tensor")?;
        let mask_value = Value::from_array(encoder_mask.clone())
            .context("Failed to create encoder attention mask tensor")?;
        let hidden_value = Value::from_array(hidden_states.clone())
            .context("Failed to create encoder hidden states tensor")?;

        let mut session = self
            .decoder_session
            .lock()
            .map_err(|_| anyhow::anyhow!("Summarization decoder session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_value,
                "encoder_attention_mask" => mask_value,
                "encoder_hidden_states" => hidden_value
            ])
            .context("Summarization decoder inference failed")?;

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract decoder logits")?;
        last_token_logits(&logits.view())
    }
}

#[async_trait]
impl TextSummarizer for BartSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String> {
        let summarizer = self.clone();
        let text = text.to_string();
        let params = *params;
        tokio::task::spawn_blocking(move || summarizer.summarize_blocking(&text, &params))
            .await
            .context("Summarization task panicked")?
    }

    fn name(&self) -> &str {
        "bart-large-cnn"
    }
}
