// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP image captioner
//!
//! Vision encoder plus text decoder, decoded greedily from the `[DEC]` token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::{Array2, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::preprocessing::{preprocess_for_caption, CAPTION_INPUT_SIZE};
use crate::models::generation::{last_token_logits, select_next_token, GenerationConfig};
use crate::models::ImageCaptioner;

const VISION_MODEL_FILE: &str = "vision_model.onnx";
const DECODER_MODEL_FILE: &str = "text_decoder_model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Default caption length in tokens, start token included
pub const DEFAULT_MAX_TOKENS: usize = 20;

/// BLIP captioner
#[derive(Clone)]
pub struct BlipCaptioner {
    vision_session: Arc<Mutex<Session>>,
    decoder_session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    /// Whether the decoder export takes an explicit encoder mask
    decoder_takes_encoder_mask: bool,
    bos_token_id: u32,
    eos_token_id: u32,
    max_tokens: usize,
}

impl std::fmt::Debug for BlipCaptioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipCaptioner")
            .field("bos_token_id", &self.bos_token_id)
            .field("eos_token_id", &self.eos_token_id)
            .field("max_tokens", &self.max_tokens)
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

impl BlipCaptioner {
    /// Load the captioner from `model_dir`
    ///
    /// # Errors
    /// Returns error if the vision model, text decoder or tokenizer is
    /// missing, or if ONNX Runtime rejects either graph.
    pub async fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let vision_path = model_dir.join(VISION_MODEL_FILE);
        let decoder_path = model_dir.join(DECODER_MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        for path in [&vision_path, &decoder_path, &tokenizer_path] {
            if !path.exists() {
                anyhow::bail!("Caption model file not found: {}", path.display());
            }
        }

        info!("Loading caption model from {}", model_dir.display());

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vision_session = load_session(&vision_path)?;
        let decoder_session = load_session(&decoder_path)?;

        let input_names: Vec<_> = decoder_session.inputs.iter().map(|i| &i.name).collect();
        debug!("Caption decoder inputs: {:?}", input_names);
        let decoder_takes_encoder_mask = decoder_session
            .inputs
            .iter()
            .any(|i| i.name == "encoder_attention_mask");

        let bos_token_id = tokenizer
            .token_to_id("[DEC]")
            .or_else(|| tokenizer.token_to_id("<s>"))
            .unwrap_or(30522);
        let eos_token_id = tokenizer
            .token_to_id("[SEP]")
            .or_else(|| tokenizer.token_to_id("</s>"))
            .unwrap_or(102);

        debug!(
            "Special tokens - BOS: {}, EOS: {}",
            bos_token_id, eos_token_id
        );

        Ok(Self {
            vision_session: Arc::new(Mutex::new(vision_session)),
            decoder_session: Arc::new(Mutex::new(decoder_session)),
            tokenizer: Arc::new(tokenizer),
            decoder_takes_encoder_mask,
            bos_token_id,
            eos_token_id,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Set the caption length limit
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens.max(2);
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Caption an image synchronously
    pub fn caption_blocking(&self, image: &DynamicImage) -> Result<String> {
        let pixel_values = preprocess_for_caption(image, CAPTION_INPUT_SIZE);
        let hidden_states = self.encode(pixel_values)?;

        let config = GenerationConfig {
            eos_token_id: self.eos_token_id,
            min_length: 0,
            max_length: self.max_tokens,
            no_repeat_ngram_size: 0,
        };

        let mut tokens = vec![self.bos_token_id];
        while tokens.len() < config.max_length {
            let logits = self.decode_step(&hidden_states, &tokens)?;
            let next = select_next_token(logits, &tokens, &config)?;
            if next == self.eos_token_id {
                break;
            }
            tokens.push(next);
        }

        debug!("Caption generated {} tokens", tokens.len());

        let text = self
            .tokenizer
            .decode(&tokens[1..], true)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))?;
        Ok(text.trim().to_string())
    }

    /// Run the vision encoder, returning `[1, patches, hidden]` states
    fn encode(&self, pixel_values: ndarray::Array4<f32>) -> Result<ArrayD<f32>> {
        let mut session = self
            .vision_session
            .lock()
            .map_err(|_| anyhow::anyhow!("Caption vision session lock poisoned"))?;

        let input = Value::from_array(pixel_values).context("Failed to create pixel tensor")?;
        let outputs = session
            .run(ort::inputs!["pixel_values" => input])
            .context("Caption vision inference failed")?;

        let hidden = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract vision output")?;
        if hidden.ndim() != 3 {
            anyhow::bail!("Unexpected vision output shape: {:?}", hidden.shape());
        }
        Ok(hidden.to_owned())
    }

    /// One decoder pass, returning the logits for the next token
    fn decode_step(&self, hidden_states: &ArrayD<f32>, tokens: &[u32]) -> Result<Vec<f32>> {
        let seq_len = tokens.len();
        let input_ids = Array2::from_shape_vec(
            (1, seq_len),
            tokens.iter().map(|&t| t as i64).collect(),
        )?;
        let attention_mask = Array2::<i64>::ones((1, seq_len));

        let ids_value = Value::from_array(input_ids).context("Failed to create input IDs tensor")?;
        let mask_value =
            Value::from_array(attention_mask).context("Failed to create attention mask tensor")?;
        let hidden_value = Value::from_array(hidden_states.clone())
            .context("Failed to create encoder hidden states tensor")?;

        let mut session = self
            .decoder_session
            .lock()
            .map_err(|_| anyhow::anyhow!("Caption decoder session lock poisoned"))?;

        let result = if self.decoder_takes_encoder_mask {
            let encoder_mask = Array2::<i64>::ones((1, hidden_states.shape()[1]));
            let encoder_mask_value = Value::from_array(encoder_mask)
                .context("Failed to create encoder attention mask tensor")?;
            session.run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
                "encoder_hidden_states" => hidden_value,
                "encoder_attention_mask" => encoder_mask_value
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
                "encoder_hidden_states" => hidden_value
            ])
        };
        let outputs = result.context("Caption decoder inference failed")?;

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract decoder logits")?;
        last_token_logits(&logits.view())
    }
}

#[async_trait]
impl ImageCaptioner for BlipCaptioner {
    async fn caption(&self, image: &DynamicImage) -> Result<String> {
        let captioner = self.clone();
        let image = image.clone();
        tokio::task::spawn_blocking(move || captioner.caption_blocking(&image))
            .await
            .context("Caption task panicked")?
    }

    fn name(&self) -> &str {
        "blip-image-captioning-base"
    }
}
