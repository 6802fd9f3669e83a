use got_ocr_core::conversation::get_conv_template;

#[test]
fn conversation_mpt_prompt_contains_expected_markers() {
    let mut conv = get_conv_template("mpt").expect("template registered");
    conv.append_message(conv.roles.0.clone(), Some("Hello!".to_string()));
    conv.append_message(conv.roles.1.clone(), Some("Hi! How can I help?".to_string()));
    conv.append_message(conv.roles.0.clone(), Some("Read this page for me.".to_string()));
    conv.append_message(conv.roles.1.clone(), None);
    let prompt = conv.get_prompt();
    assert!(prompt.contains("Hello!"));
    assert!(prompt.contains("<|im_end|>"));
    assert!(prompt.ends_with("<|im_start|>assistant\n"));
}
