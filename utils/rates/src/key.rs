use std::fmt::Write;

/// Renders a key as `name{label="value",...}`, or just `name` without labels.
pub(crate) fn render(key: &metrics::Key) -> String {
    let mut rendered = key.name().to_string();
    let mut labels = key.labels().peekable();

    if labels.peek().is_none() {
        return rendered;
    }

    rendered.push('{');
    for (index, label) in labels.enumerate() {
        if index > 0 {
            rendered.push(',');
        }
        let _ = write!(rendered, r#"{}="{}""#, label.key(), label.value());
    }
    rendered.push('}');

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{Key, Label};

    #[test]
    fn test_render_plain_name() {
        assert_eq!(render(&Key::from_name("blocks")), "blocks");
    }

    #[test]
    fn test_render_labels_in_order() {
        let key = Key::from_parts(
            "blocks",
            vec![Label::new("chain", "main"), Label::new("stage", "head")],
        );

        assert_eq!(render(&key), r#"blocks{chain="main",stage="head"}"#);
    }
}
