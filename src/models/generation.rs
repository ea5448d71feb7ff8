// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding helpers shared by the captioner and the summarizer
//!
//! The captioner decodes greedily; the summarizer runs beam search. Both
//! apply the same per-step constraints.

use ndarray::{ArrayViewD, IxDyn};
use std::collections::HashSet;

/// Constraints applied to each decoding step
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    /// End-of-sequence token
    pub eos_token_id: u32,
    /// Sequence length (including start tokens) below which EOS is masked
    pub min_length: usize,
    /// Sequence length at which generation stops
    pub max_length: usize,
    /// Size of n-grams that may not repeat; 0 disables the check
    pub no_repeat_ngram_size: usize,
}

/// Logits of the last position of a `[1, seq, vocab]` (or `[seq, vocab]`) output
pub fn last_token_logits(output: &ArrayViewD<f32>) -> anyhow::Result<Vec<f32>> {
    let shape = output.shape();
    match shape.len() {
        3 if shape[1] > 0 => {
            let last = shape[1] - 1;
            Ok((0..shape[2]).map(|v| output[IxDyn(&[0, last, v])]).collect())
        }
        2 if shape[0] > 0 => {
            let last = shape[0] - 1;
            Ok((0..shape[1]).map(|v| output[IxDyn(&[last, v])]).collect())
        }
        _ => anyhow::bail!("Unexpected logits shape: {:?}", shape),
    }
}

/// Index of the largest finite logit
pub fn argmax(logits: &[f32]) -> Option<u32> {
    logits
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i as u32)
}

/// Tokens that would complete an n-gram already present in `tokens`
pub fn banned_ngram_tokens(tokens: &[u32], n: usize) -> HashSet<u32> {
    let mut banned = HashSet::new();
    if n == 0 || tokens.len() < n {
        return banned;
    }

    let prefix = &tokens[tokens.len() - (n - 1)..];
    for window in tokens.windows(n) {
        if &window[..n - 1] == prefix {
            banned.insert(window[n - 1]);
        }
    }
    banned
}

/// Mask tokens the constraints forbid after `sequence`
///
/// EOS is masked below the minimum length and every token that would
/// repeat an n-gram is masked.
pub fn mask_constraints(logits: &mut [f32], sequence: &[u32], config: &GenerationConfig) {
    if sequence.len() < config.min_length {
        if let Some(v) = logits.get_mut(config.eos_token_id as usize) {
            *v = f32::NEG_INFINITY;
        }
    }

    for token in banned_ngram_tokens(sequence, config.no_repeat_ngram_size) {
        if let Some(v) = logits.get_mut(token as usize) {
            *v = f32::NEG_INFINITY;
        }
    }
}

/// Pick the next token for `sequence` given the step's raw logits
pub fn select_next_token(
    mut logits: Vec<f32>,
    sequence: &[u32],
    config: &GenerationConfig,
) -> anyhow::Result<u32> {
    mask_constraints(&mut logits, sequence, config);
    argmax(&logits).ok_or_else(|| anyhow::anyhow!("No selectable token in logits"))
}

/// Log-probabilities from raw logits; NaN is treated as impossible
pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f32::NEG_INFINITY; logits.len()];
    }

    let sum: f32 = logits
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - max).exp())
        .sum();
    let log_sum = max + sum.ln();

    logits
        .iter()
        .map(|&v| if v.is_nan() { f32::NEG_INFINITY } else { v - log_sum })
        .collect()
}

/// Beam search settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamConfig {
    pub num_beams: usize,
    /// Exponent on hypothesis length when ranking finished hypotheses
    pub length_penalty: f32,
    /// Stop as soon as `num_beams` hypotheses have finished
    pub early_stopping: bool,
}

/// Finished hypotheses, best `capacity` kept
struct Hypotheses {
    capacity: usize,
    length_penalty: f32,
    early_stopping: bool,
    entries: Vec<(f32, Vec<u32>)>,
}

impl Hypotheses {
    fn new(beam: &BeamConfig, capacity: usize) -> Self {
        Self {
            capacity,
            length_penalty: beam.length_penalty,
            early_stopping: beam.early_stopping,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    fn normalize(&self, sum_logprobs: f32, length: usize) -> f32 {
        sum_logprobs / (length.max(1) as f32).powf(self.length_penalty)
    }

    fn worst_score(&self) -> f32 {
        self.entries
            .iter()
            .map(|(score, _)| *score)
            .fold(f32::INFINITY, f32::min)
    }

    /// `length` is the hypothesis length before its EOS
    fn add(&mut self, tokens: Vec<u32>, sum_logprobs: f32, length: usize) {
        let score = self.normalize(sum_logprobs, length);
        if self.entries.len() < self.capacity || score > self.worst_score() {
            self.entries.push((score, tokens));
            if self.entries.len() > self.capacity {
                if let Some(worst) = self
                    .entries
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
                    .map(|(i, _)| i)
                {
                    self.entries.remove(worst);
                }
            }
        }
    }

    fn is_done(&self, best_running: f32, cur_len: usize) -> bool {
        if self.entries.len() < self.capacity {
            return false;
        }
        if self.early_stopping {
            return true;
        }
        self.worst_score() >= self.normalize(best_running, cur_len)
    }

    fn best(self) -> Option<Vec<u32>> {
        self.entries
            .into_iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, tokens)| tokens)
    }
}

/// Beam search from `prefix` until every beam ends or `max_length` is reached
///
/// `step` returns the raw next-token logits for one sequence. EOS is forced
/// at the last position, so every finished hypothesis ends with it unless
/// the prefix already fills `max_length`.
pub fn beam_search<F>(
    prefix: &[u32],
    config: &GenerationConfig,
    beam: &BeamConfig,
    mut step: F,
) -> anyhow::Result<Vec<u32>>
where
    F: FnMut(&[u32]) -> anyhow::Result<Vec<f32>>,
{
    let num_beams = beam.num_beams.max(1);
    let eos = config.eos_token_id;
    let mut finished = Hypotheses::new(beam, num_beams);
    let mut beams: Vec<(Vec<u32>, f32)> = vec![(prefix.to_vec(), 0.0)];
    let mut done = false;

    while let Some(cur_len) = beams.first().map(|(tokens, _)| tokens.len()) {
        if cur_len >= config.max_length {
            break;
        }

        let mut candidates: Vec<(f32, usize, u32)> = Vec::new();
        for (index, (tokens, score)) in beams.iter().enumerate() {
            let mut logprobs = log_softmax(&step(tokens)?);
            mask_constraints(&mut logprobs, tokens, config);
            if cur_len + 1 == config.max_length {
                for (token, v) in logprobs.iter_mut().enumerate() {
                    if token != eos as usize {
                        *v = f32::NEG_INFINITY;
                    }
                }
            }

            candidates.extend(
                logprobs
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(token, v)| (score + v, index, token as u32)),
            );
        }

        let keep = 2 * num_beams;
        let by_score = |a: &(f32, usize, u32), b: &(f32, usize, u32)| b.0.total_cmp(&a.0);
        if candidates.len() > keep {
            candidates.select_nth_unstable_by(keep - 1, by_score);
            candidates.truncate(keep);
        }
        candidates.sort_by(by_score);

        let mut next: Vec<(Vec<u32>, f32)> = Vec::with_capacity(num_beams);
        for (rank, (score, index, token)) in candidates.into_iter().enumerate() {
            if token == eos {
                // EOS below the top `num_beams` does not finish a hypothesis
                if rank < num_beams {
                    let mut tokens = beams[index].0.clone();
                    tokens.push(token);
                    finished.add(tokens, score, cur_len);
                }
            } else {
                let mut tokens = beams[index].0.clone();
                tokens.push(token);
                next.push((tokens, score));
            }
            if next.len() == num_beams {
                break;
            }
        }

        beams = next;
        match beams.first() {
            Some((_, best)) if !finished.is_done(*best, cur_len) => {}
            _ => {
                done = finished.entries.len() >= num_beams;
                break;
            }
        }
    }

    if !done {
        for (tokens, score) in beams {
            let length = tokens.len();
            finished.add(tokens, score, length);
        }
    }

    finished
        .best()
        .ok_or_else(|| anyhow::anyhow!("Beam search produced no hypotheses"))
}
