use tokenizers::Tokenizer;

use crate::{conversation::get_conv_template, error::OcrError};

pub const DEFAULT_IMAGE_TOKEN: &str = "<image>";
pub const DEFAULT_IMAGE_PATCH_TOKEN: &str = "<imgpad>";
pub const DEFAULT_IM_START_TOKEN: &str = "<img>";
pub const DEFAULT_IM_END_TOKEN: &str = "</img>";

/// Number of `<imgpad>` placeholders reserved for one image's visual tokens.
/// Constant across every request in a deployment.
pub const IMAGE_TOKEN_LEN: usize = 256;

/// Recognition flavour requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrMode {
    Format,
    Plain,
}

impl OcrMode {
    /// Maps the HTTP `type` parameter; anything other than `format` (the
    /// default being `ocr`) selects plain recognition.
    pub fn from_request_type(value: &str) -> Self {
        if value.eq_ignore_ascii_case("format") {
            OcrMode::Format
        } else {
            OcrMode::Plain
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            OcrMode::Format => "OCR with format: ",
            OcrMode::Plain => "OCR: ",
        }
    }
}

/// Rendered prompt for one batch, shared verbatim by every image in it.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub mode: OcrMode,
    pub template: String,
    pub image_token_len: usize,
    pub text: String,
    pub stop_str: String,
}

/// Wraps the mode instruction with the image-marker span and renders it
/// through the configured conversation template (user turn filled, assistant
/// turn left open).
pub fn build_prompt(mode: OcrMode, template_name: &str) -> Result<PromptSpec, OcrError> {
    let mut template = get_conv_template(template_name)
        .ok_or_else(|| OcrError::Template(template_name.to_owned()))?;

    let query = format!(
        "{DEFAULT_IM_START_TOKEN}{}{DEFAULT_IM_END_TOKEN}\n{}",
        DEFAULT_IMAGE_PATCH_TOKEN.repeat(IMAGE_TOKEN_LEN),
        mode.instruction(),
    );

    let (user, assistant) = template.roles.clone();
    template.reset_messages();
    template.append_message(user, Some(query));
    template.append_message(assistant, None);

    let text = template.get_prompt();
    let stop_str = template.stop_str().to_owned();
    Ok(PromptSpec {
        mode,
        template: template_name.to_owned(),
        image_token_len: IMAGE_TOKEN_LEN,
        text,
        stop_str,
    })
}

/// Leading token id of the encoded stop string. Exactly one id, shared by the
/// whole batch.
pub fn stop_token_ids(tokenizer: &Tokenizer, spec: &PromptSpec) -> Result<Vec<i64>, OcrError> {
    let encoding = tokenizer
        .encode(spec.stop_str.as_str(), false)
        .map_err(|err| OcrError::Tokenize(err.to_string()))?;
    let first = encoding.get_ids().first().copied().ok_or_else(|| {
        OcrError::Tokenize(format!(
            "stop string `{}` produced no tokens",
            spec.stop_str
        ))
    })?;
    Ok(vec![i64::from(first)])
}

/// The tokenizer's pad id stands in for end-of-sequence when padding is
/// configured.
pub fn eos_override(tokenizer: &Tokenizer) -> Option<i64> {
    tokenizer
        .get_padding()
        .map(|params| i64::from(params.pad_id))
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;
    use tokenizers::{PaddingParams, models::wordlevel::WordLevel};

    use super::*;

    fn word_level_tokenizer() -> Tokenizer {
        let mut vocab = AHashMap::new();
        vocab.insert("<unk>".to_string(), 0);
        vocab.insert("<|im_end|>".to_string(), 1);
        vocab.insert("</s>".to_string(), 2);
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("<unk>".into())
            .build()
            .expect("word-level vocab");
        Tokenizer::new(model)
    }

    #[test]
    fn build_is_deterministic_per_mode() {
        let first = build_prompt(OcrMode::Format, "mpt").expect("build");
        let second = build_prompt(OcrMode::Format, "mpt").expect("build");
        assert_eq!(first.text, second.text);
        assert_eq!(first.stop_str, second.stop_str);
    }

    #[test]
    fn format_and_plain_differ_only_in_instruction() {
        let format = build_prompt(OcrMode::Format, "mpt").expect("build");
        let plain = build_prompt(OcrMode::Plain, "mpt").expect("build");
        assert!(format.text.contains("OCR with format: "));
        assert!(plain.text.contains("OCR: "));
        assert!(!plain.text.contains("OCR with format: "));
    }

    #[test]
    fn placeholder_span_is_marker_wrapped_and_fixed_length() {
        let spec = build_prompt(OcrMode::Plain, "mpt").expect("build");
        assert_eq!(spec.image_token_len, IMAGE_TOKEN_LEN);
        assert_eq!(
            spec.text.matches(DEFAULT_IMAGE_PATCH_TOKEN).count(),
            IMAGE_TOKEN_LEN
        );
        let span = format!(
            "{DEFAULT_IM_START_TOKEN}{}{DEFAULT_IM_END_TOKEN}\n",
            DEFAULT_IMAGE_PATCH_TOKEN.repeat(IMAGE_TOKEN_LEN)
        );
        assert!(spec.text.contains(&span));
        assert!(!spec.text.contains(DEFAULT_IMAGE_TOKEN));
    }

    #[test]
    fn unknown_template_fails() {
        let err = build_prompt(OcrMode::Plain, "missing").unwrap_err();
        assert!(matches!(err, OcrError::Template(name) if name == "missing"));
    }

    #[test]
    fn stop_ids_take_the_leading_token() {
        let tokenizer = word_level_tokenizer();
        let mpt = build_prompt(OcrMode::Plain, "mpt").expect("build");
        assert_eq!(stop_token_ids(&tokenizer, &mpt).expect("stop ids"), vec![1]);

        let vicuna = build_prompt(OcrMode::Plain, "vicuna_v1").expect("build");
        assert_eq!(
            stop_token_ids(&tokenizer, &vicuna).expect("stop ids"),
            vec![2]
        );
    }

    #[test]
    fn pad_id_substitutes_for_eos() {
        let mut tokenizer = word_level_tokenizer();
        assert_eq!(eos_override(&tokenizer), None);

        tokenizer.with_padding(Some(PaddingParams {
            pad_id: 7,
            pad_token: "<pad>".into(),
            ..PaddingParams::default()
        }));
        assert_eq!(eos_override(&tokenizer), Some(7));
    }

    #[test]
    fn request_type_mapping_defaults_to_plain() {
        assert_eq!(OcrMode::from_request_type("format"), OcrMode::Format);
        assert_eq!(OcrMode::from_request_type("ocr"), OcrMode::Plain);
        assert_eq!(OcrMode::from_request_type("anything"), OcrMode::Plain);
    }
}
