use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Separator convention a template renders with. `Two` alternates between a
/// primary and a secondary separator; the secondary one doubles as the stop
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStyle {
    Single,
    Two,
    Mpt,
}

#[derive(Debug, Clone)]
pub struct ConversationTemplate {
    pub name: String,
    pub system: String,
    pub roles: (String, String),
    pub messages: Vec<(String, Option<String>)>,
    pub sep_style: SeparatorStyle,
    pub sep: String,
    pub sep2: Option<String>,
}

impl ConversationTemplate {
    pub fn append_message<S>(&mut self, role: S, message: Option<String>)
    where
        S: Into<String>,
    {
        self.messages.push((role.into(), message));
    }

    pub fn reset_messages(&mut self) {
        self.messages.clear();
    }

    /// The string whose emission terminates generation for this template.
    pub fn stop_str(&self) -> &str {
        match self.sep_style {
            SeparatorStyle::Two => self.sep2.as_deref().unwrap_or(&self.sep),
            _ => &self.sep,
        }
    }

    pub fn get_prompt(&self) -> String {
        match self.sep_style {
            SeparatorStyle::Single => self.render_single(),
            SeparatorStyle::Two => self.render_two(),
            SeparatorStyle::Mpt => self.render_mpt(),
        }
    }

    fn render_single(&self) -> String {
        let mut buffer = String::new();
        buffer.push_str(&self.system);
        buffer.push_str(&self.sep);
        for (role, message) in &self.messages {
            match message {
                Some(content) => {
                    buffer.push_str(role);
                    buffer.push_str(": ");
                    buffer.push_str(content);
                    buffer.push_str(&self.sep);
                }
                None => {
                    buffer.push_str(role);
                    buffer.push(':');
                }
            }
        }
        buffer
    }

    fn render_two(&self) -> String {
        let seps = [self.sep.as_str(), self.sep2.as_deref().unwrap_or_default()];
        let mut buffer = String::new();
        buffer.push_str(&self.system);
        buffer.push_str(seps[0]);
        for (idx, (role, message)) in self.messages.iter().enumerate() {
            match message {
                Some(content) => {
                    buffer.push_str(role);
                    buffer.push_str(": ");
                    buffer.push_str(content);
                    buffer.push_str(seps[idx % 2]);
                }
                None => {
                    buffer.push_str(role);
                    buffer.push(':');
                }
            }
        }
        buffer
    }

    fn render_mpt(&self) -> String {
        let mut buffer = String::new();
        buffer.push_str(&self.system);
        buffer.push_str(&self.sep);
        for (role, message) in &self.messages {
            match message {
                Some(content) => {
                    buffer.push_str(role);
                    buffer.push_str(content);
                    buffer.push_str(&self.sep);
                }
                None => buffer.push_str(role),
            }
        }
        buffer
    }
}

/// Immutable template registry, built once at startup. Unknown names surface
/// as `None`; callers decide how to report that.
static CONVERSATION_TEMPLATES: Lazy<BTreeMap<&'static str, ConversationTemplate>> =
    Lazy::new(|| {
        BTreeMap::from([
            ("mpt", mpt_template()),
            ("vicuna_v1", vicuna_v1_template()),
            ("plain", plain_template()),
        ])
    });

pub fn get_conv_template(name: &str) -> Option<ConversationTemplate> {
    CONVERSATION_TEMPLATES.get(name).cloned()
}

fn mpt_template() -> ConversationTemplate {
    ConversationTemplate {
        name: "mpt".into(),
        system: "<|im_start|>system\nYou should follow the instructions carefully and explain your answers in detail.".into(),
        roles: ("<|im_start|>user\n".into(), "<|im_start|>assistant\n".into()),
        messages: Vec::new(),
        sep_style: SeparatorStyle::Mpt,
        sep: "<|im_end|>".into(),
        sep2: None,
    }
}

fn vicuna_v1_template() -> ConversationTemplate {
    ConversationTemplate {
        name: "vicuna_v1".into(),
        system: "A chat between a curious user and an artificial intelligence assistant. The assistant gives helpful, detailed, and polite answers to the user's questions.".into(),
        roles: ("USER".into(), "ASSISTANT".into()),
        messages: Vec::new(),
        sep_style: SeparatorStyle::Two,
        sep: " ".into(),
        sep2: Some("</s>".into()),
    }
}

fn plain_template() -> ConversationTemplate {
    ConversationTemplate {
        name: "plain".into(),
        system: String::new(),
        roles: (String::new(), String::new()),
        messages: Vec::new(),
        sep_style: SeparatorStyle::Single,
        sep: "\n".into(),
        sep2: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpt_renders_roles_without_colons() {
        let mut template = get_conv_template("mpt").expect("mpt registered");
        let (user, assistant) = template.roles.clone();
        template.append_message(user, Some("hello".into()));
        template.append_message(assistant, None);

        let prompt = template.get_prompt();
        assert!(prompt.starts_with("<|im_start|>system\n"));
        assert!(prompt.contains("<|im_start|>user\nhello<|im_end|>"));
        assert!(prompt.ends_with("<|im_start|>assistant\n"));
    }

    #[test]
    fn two_style_alternates_separators() {
        let mut template = get_conv_template("vicuna_v1").expect("vicuna registered");
        template.append_message("USER", Some("question".into()));
        template.append_message("ASSISTANT", Some("answer".into()));

        let prompt = template.get_prompt();
        assert!(prompt.contains("USER: question "));
        assert!(prompt.ends_with("ASSISTANT: answer</s>"));
    }

    #[test]
    fn stop_str_uses_secondary_separator_only_for_two_style() {
        assert_eq!(
            get_conv_template("mpt").expect("mpt").stop_str(),
            "<|im_end|>"
        );
        assert_eq!(
            get_conv_template("vicuna_v1").expect("vicuna").stop_str(),
            "</s>"
        );
        assert_eq!(get_conv_template("plain").expect("plain").stop_str(), "\n");
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(get_conv_template("nonexistent").is_none());
    }
}
